// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tools contract: every operation user code and listener callbacks may perform.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Vec2};
use stay_event::store::Store;
use stay_scene::{
    AppendChild, Child, ChildId, ChildRegistry, Completion, Frame, History, PointQuery,
    RenderScheduler, SELECT_ALL, ShapeKey, ShapeUpdate, SortBy, Surface, UpdateChild,
};

use crate::action::SyntheticAction;
use crate::config::StayConfig;
use crate::error::StayError;
use crate::states::StateSet;

/// Scene, history, states and stores, behind one mutation surface.
///
/// Every mutating call records the ids it touched, so the next [`log`](Self::log) picks
/// them up without any implicit change tracking.
#[derive(Debug)]
pub struct Tools {
    registry: ChildRegistry,
    history: History,
    states: StateSet,
    store: Store,
    state_store: Store,
    scheduler: RenderScheduler,
    root_class: String,
    move_origin: Option<Vec2>,
    queued: Vec<SyntheticAction>,
}

impl Tools {
    /// Tools over a fresh registry built from `config`.
    pub fn new(config: &StayConfig) -> Self {
        let registry = ChildRegistry::new(
            config.root_id.as_str(),
            config.root_class.as_str(),
            config.extent(),
            config.layers,
        );
        let history = History::new(&registry);
        Self {
            registry,
            history,
            states: StateSet::new(),
            store: Store::new(),
            state_store: Store::new(),
            scheduler: RenderScheduler::new(),
            root_class: config.root_class.clone(),
            move_origin: None,
            queued: Vec::new(),
        }
    }

    // --- nodes ---

    /// Append a node; returns its id.
    pub fn append_child(&mut self, args: AppendChild) -> Result<ChildId, StayError> {
        Ok(self.registry.append(args)?)
    }

    /// Update a node in place.
    pub fn update_child(&mut self, id: &ChildId, args: UpdateChild) -> Result<&Child, StayError> {
        Ok(self.registry.update(id, args)?)
    }

    /// Apply a partial update to one shape of a node.
    pub fn update_shape(
        &mut self,
        id: &ChildId,
        key: impl Into<ShapeKey>,
        update: &ShapeUpdate,
    ) -> Result<&Child, StayError> {
        Ok(self.registry.update_shape(id, &key.into(), update)?)
    }

    /// Remove a node. The returned signal completes once the removal has been drawn.
    pub fn remove_child(&mut self, id: &ChildId) -> Result<Completion, StayError> {
        self.registry.remove(id)?;
        Ok(self.scheduler.request())
    }

    /// The node with `id`.
    pub fn child(&self, id: &ChildId) -> Option<&Child> {
        self.registry.get(id)
    }

    /// Whether a node with `id` exists.
    pub fn has_child(&self, id: &ChildId) -> bool {
        self.registry.contains(id)
    }

    /// Id of the root node.
    pub fn root_id(&self) -> &ChildId {
        self.registry.root_id()
    }

    /// Selector matching the root node's class.
    pub fn root_selector(&self) -> String {
        format!(".{}", self.root_class)
    }

    /// Read access to the registry.
    pub fn registry(&self) -> &ChildRegistry {
        &self.registry
    }

    // --- queries ---

    /// Nodes matching `selector`, topmost first unless `sort_by` is given.
    pub fn children_by_selector(
        &self,
        selector: &str,
        sort_by: Option<&SortBy>,
    ) -> Result<Vec<&Child>, StayError> {
        Ok(self.registry.select(selector, sort_by)?)
    }

    /// Pickable nodes under a point.
    pub fn contain_point_children(&self, query: &PointQuery<'_>) -> Result<Vec<&Child>, StayError> {
        Ok(self.registry.contain_point(query)?)
    }

    /// Nodes whose shape centroids all lie in `area`.
    pub fn children_in_area(&self, area: Rect, selector: &str) -> Result<Vec<&Child>, StayError> {
        Ok(self.registry.children_in_area(area, selector)?)
    }

    // --- states ---

    /// Known states matching the state expression `expr`.
    pub fn available_states(&self, expr: &str) -> Result<Vec<String>, StayError> {
        Ok(self.states.resolve(expr)?)
    }

    /// Make `name` the current state, registering it if new, and clear the state store.
    pub fn switch_state(&mut self, name: &str) -> Result<(), StayError> {
        self.states.switch(name)?;
        self.state_store.clear();
        tracing::debug!(state = name, "switch state");
        Ok(())
    }

    /// The current state.
    pub fn current_state(&self) -> &str {
        self.states.current()
    }

    /// The state set.
    pub fn states(&self) -> &StateSet {
        &self.states
    }

    // --- camera ---

    /// Open a move session: following [`move_by`](Self::move_by) offsets are measured
    /// from the positions at this call.
    pub fn move_start(&mut self) {
        self.move_origin = Some(Vec2::ZERO);
    }

    /// Close the move session.
    pub fn move_end(&mut self) {
        self.move_origin = None;
    }

    /// Translate nodes matching `selector` (every node when `None`).
    ///
    /// Inside a move session `offset` is the total offset since [`move_start`](Self::move_start);
    /// otherwise it is applied as is. The root node never moves.
    pub fn move_by(
        &mut self,
        offset: Vec2,
        selector: Option<&str>,
    ) -> Result<Completion, StayError> {
        let delta = self.move_origin.map_or(offset, |applied| offset - applied);
        self.registry
            .translate(selector.unwrap_or(SELECT_ALL), delta)?;
        if let Some(applied) = self.move_origin.as_mut() {
            *applied = offset;
        }
        Ok(self.scheduler.request())
    }

    /// Scale nodes matching `selector` (every node when `None`) around `origin`.
    pub fn zoom(
        &mut self,
        scale: f64,
        origin: Point,
        selector: Option<&str>,
    ) -> Result<Completion, StayError> {
        self.registry
            .scale_about(selector.unwrap_or(SELECT_ALL), scale, origin)?;
        Ok(self.scheduler.request())
    }

    // --- history ---

    /// Record the changes since the last log as one undoable batch.
    ///
    /// Returns the number of recorded steps; nothing is pushed when it is zero.
    pub fn log(&mut self) -> Result<usize, StayError> {
        Ok(self.history.log(&mut self.registry, self.states.current())?)
    }

    /// Revert the last batch and restore its state. Returns the restored state, or
    /// `None` when there was nothing to undo.
    pub fn undo(&mut self) -> Option<String> {
        let state = self.history.undo(&mut self.registry)?;
        self.restore_state(&state);
        Some(state)
    }

    /// Replay the next batch and restore its state. Returns the restored state, or
    /// `None` when there was nothing to redo.
    pub fn redo(&mut self) -> Option<String> {
        let state = self.history.redo(&mut self.registry)?;
        self.restore_state(&state);
        Some(state)
    }

    /// Whether [`undo`](Self::undo) would do anything.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether [`redo`](Self::redo) would do anything.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The history stack.
    pub fn history(&self) -> &History {
        &self.history
    }

    // --- rendering ---

    /// Mark every layer for repaint, for example once an image a shape waits on has
    /// loaded.
    pub fn force_redraw(&mut self) -> Completion {
        self.registry.mark_all_dirty();
        self.scheduler.request()
    }

    /// Repaint dirty layers onto `surface` and fulfil outstanding signals.
    pub fn render(&mut self, surface: &mut dyn Surface) -> Frame {
        self.scheduler.render(&mut self.registry, surface)
    }

    // --- dispatch ---

    /// Queue a synthetic dispatch. It runs after the current dispatch finishes, within
    /// the same tick.
    pub fn trigger_action(&mut self, action: SyntheticAction) {
        self.queued.push(action);
    }

    pub(crate) fn take_queued(&mut self) -> Vec<SyntheticAction> {
        core::mem::take(&mut self.queued)
    }

    // --- stores ---

    /// Store persisting across ticks and states.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Mutable access to the persistent store.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Store cleared on every state switch.
    pub fn state_store(&self) -> &Store {
        &self.state_store
    }

    /// Mutable access to the per-state store.
    pub fn state_store_mut(&mut self) -> &mut Store {
        &mut self.state_store
    }

    pub(crate) fn stores_mut(&mut self) -> (&mut Store, &mut Store) {
        (&mut self.store, &mut self.state_store)
    }

    fn restore_state(&mut self, state: &str) {
        if state != self.states.current() {
            self.states.enter(state);
            self.state_store.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::DEFAULT_STATE;
    use stay_scene::{Shape, ShapeBehavior};

    fn tools() -> Tools {
        Tools::new(&StayConfig::default().with_size(200.0, 200.0))
    }

    fn square(x: f64) -> Shape {
        Shape::rect(Rect::new(x, 0.0, x + 10.0, 10.0))
    }

    fn x_of(tools: &Tools, id: &ChildId) -> f64 {
        tools.child(id).unwrap().bound().unwrap().x0
    }

    #[test]
    fn switch_state_clears_state_store_only() {
        let mut t = tools();
        t.store_mut().insert("keep", true);
        t.state_store_mut().insert("drop", true);
        t.switch_state("drawing").unwrap();
        assert!(t.store().flag("keep"));
        assert!(!t.state_store().contains_key("drop"));
        assert_eq!(t.current_state(), "drawing");
    }

    #[test]
    fn remove_completes_after_render() {
        let mut t = tools();
        let id = t.append_child(AppendChild::new("box", square(0.0))).unwrap();
        let done = t.remove_child(&id).unwrap();
        assert!(!done.is_complete());
        assert!(t.children_by_selector(".box", None).unwrap().is_empty());

        struct Null;
        impl Surface for Null {
            fn clear_layer(&mut self, _layer: usize) {}
            fn draw_path(&mut self, _: usize, _: &kurbo::BezPath, _: &stay_scene::Paint) {}
        }
        t.render(&mut Null);
        assert!(done.is_complete());
    }

    #[test]
    fn root_removal_fails() {
        let mut t = tools();
        let root = t.root_id().clone();
        assert!(matches!(
            t.remove_child(&root),
            Err(StayError::Scene(stay_scene::SceneError::RootRemoval(_)))
        ));
    }

    #[test]
    fn move_session_offsets_are_absolute() {
        let mut t = tools();
        let id = t.append_child(AppendChild::new("box", square(0.0))).unwrap();
        t.move_start();
        t.move_by(Vec2::new(5.0, 0.0), None).unwrap();
        t.move_by(Vec2::new(8.0, 0.0), None).unwrap();
        assert_eq!(x_of(&t, &id), 8.0);
        t.move_end();
        t.move_by(Vec2::new(1.0, 0.0), None).unwrap();
        assert_eq!(x_of(&t, &id), 9.0);
    }

    #[test]
    fn failed_move_keeps_session_origin() {
        let mut t = tools();
        let id = t
            .append_child(AppendChild::new("box", square(0.0)).with_id("a"))
            .unwrap();
        t.move_start();
        t.move_by(Vec2::new(5.0, 0.0), Some("#a")).unwrap();
        assert!(matches!(
            t.move_by(Vec2::new(9.0, 0.0), Some("(#a")),
            Err(StayError::Selector(_))
        ));
        assert_eq!(x_of(&t, &id), 5.0);
        t.move_by(Vec2::new(10.0, 0.0), Some("#a")).unwrap();
        assert_eq!(x_of(&t, &id), 10.0);
    }

    #[test]
    fn zoom_respects_selector() {
        let mut t = tools();
        let a = t
            .append_child(AppendChild::new("box", square(10.0)).with_id("a"))
            .unwrap();
        let b = t
            .append_child(AppendChild::new("ink", square(10.0)).with_id("b"))
            .unwrap();
        t.zoom(2.0, Point::ZERO, Some(".box")).unwrap();
        assert_eq!(x_of(&t, &a), 20.0);
        assert_eq!(x_of(&t, &b), 10.0);
    }

    #[test]
    fn undo_restores_logged_state_label() {
        let mut t = tools();
        t.switch_state("drawing").unwrap();
        t.append_child(AppendChild::new("box", square(0.0))).unwrap();
        t.log().unwrap();
        t.switch_state(DEFAULT_STATE).unwrap();
        t.state_store_mut().insert("scratch", 1_u8);

        assert_eq!(t.undo().as_deref(), Some("drawing"));
        assert_eq!(t.current_state(), "drawing");
        assert!(t.state_store().is_empty());
        assert_eq!(t.undo(), None);
        assert_eq!(t.redo().as_deref(), Some("drawing"));
        assert!(!t.can_redo());
    }

    #[test]
    fn update_shape_through_tools() {
        let mut t = tools();
        let id = t.append_child(AppendChild::new("box", square(0.0))).unwrap();
        t.update_shape(&id, 0_usize, &ShapeUpdate::position((30.0, 0.0)))
            .unwrap();
        assert_eq!(
            t.child(&id).unwrap().first_shape().unwrap().bound().x0,
            30.0
        );
    }

    #[test]
    fn root_selector_uses_root_class() {
        let t = tools();
        let hits = t.children_by_selector(&t.root_selector(), None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id(), t.root_id());
    }
}
