// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear undo/redo over batches of structural diffs.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::child::{Child, Step, diff};
use crate::error::SceneError;
use crate::registry::ChildRegistry;
use crate::types::ChildId;

/// One log's worth of steps: the atomic unit of undo and redo.
#[derive(Clone, Debug)]
pub struct Batch {
    state: String,
    steps: Vec<Step>,
}

impl Batch {
    /// Interaction state that was current when the batch was logged.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Steps in capture order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// Undo/redo stack.
///
/// Batches before the cursor are done; batches at or after it can be redone. Logging a
/// new batch discards everything from the cursor on. The stack is unbounded.
#[derive(Clone, Debug)]
pub struct History {
    batches: Vec<Batch>,
    cursor: usize,
    snapshot: HashMap<ChildId, Child>,
}

impl History {
    /// A history whose baseline is the current content of `registry`.
    pub fn new(registry: &ChildRegistry) -> Self {
        Self {
            batches: Vec::new(),
            cursor: 0,
            snapshot: registry.snapshot(),
        }
    }

    /// Number of batches, redoable ones included.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// Whether nothing was ever logged.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Number of batches currently done.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether [`undo`](Self::undo) would do anything.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether [`redo`](Self::redo) would do anything.
    pub fn can_redo(&self) -> bool {
        self.cursor < self.batches.len()
    }

    /// The batches, oldest first.
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Record every change to the ids touched since the last snapshot.
    ///
    /// Returns the number of steps recorded. Ids whose diff is empty are dropped, and a
    /// batch with no steps is not pushed; the snapshot is refreshed either way.
    pub fn log(&mut self, registry: &mut ChildRegistry, state: &str) -> Result<usize, SceneError> {
        let mut steps = Vec::new();
        for id in registry.unlogged() {
            if let Some(step) = diff(self.snapshot.get(id), registry.get(id))? {
                steps.push(step);
            }
        }
        let count = steps.len();
        if count > 0 {
            self.batches.truncate(self.cursor);
            self.batches.push(Batch {
                state: state.into(),
                steps,
            });
            self.cursor += 1;
        }
        tracing::debug!(steps = count, cursor = self.cursor, state, "log");
        self.resnapshot(registry);
        Ok(count)
    }

    /// Revert the last done batch.
    ///
    /// Returns the batch's state label, or `None` (with a warning) when there is nothing
    /// to undo. Every layer is marked for repaint.
    pub fn undo(&mut self, registry: &mut ChildRegistry) -> Option<String> {
        if self.cursor == 0 {
            tracing::warn!("undo: nothing to undo");
            return None;
        }
        self.cursor -= 1;
        let batch = &self.batches[self.cursor];
        registry.mark_all_dirty();
        for step in &batch.steps {
            match step {
                Step::Append { now } => {
                    if let Err(err) = registry.take(&now.id) {
                        tracing::warn!(error = %err, "undo: appended node already gone");
                    }
                }
                Step::Remove { before } | Step::Update { before, .. } => {
                    registry.put(before.clone());
                }
            }
        }
        let state = batch.state.clone();
        tracing::debug!(cursor = self.cursor, state = %state, "undo");
        self.resnapshot(registry);
        Some(state)
    }

    /// Replay the next undone batch.
    ///
    /// Returns the batch's state label, or `None` (with a warning) when there is nothing
    /// to redo.
    pub fn redo(&mut self, registry: &mut ChildRegistry) -> Option<String> {
        let Some(batch) = self.batches.get(self.cursor) else {
            tracing::warn!("redo: nothing to redo");
            return None;
        };
        registry.mark_all_dirty();
        for step in &batch.steps {
            match step {
                Step::Remove { before } => {
                    if let Err(err) = registry.take(&before.id) {
                        tracing::warn!(error = %err, "redo: removed node already gone");
                    }
                }
                Step::Append { now } | Step::Update { now, .. } => {
                    registry.put(now.clone());
                }
            }
        }
        let state = batch.state.clone();
        self.cursor += 1;
        tracing::debug!(cursor = self.cursor, state = %state, "redo");
        self.resnapshot(registry);
        Some(state)
    }

    fn resnapshot(&mut self, registry: &mut ChildRegistry) {
        self.snapshot = registry.snapshot();
        registry.clear_unlogged();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AppendChild, UpdateChild};
    use crate::shape::{Shape, ShapeBehavior};
    use kurbo::Rect;

    fn setup() -> (ChildRegistry, History) {
        let reg = ChildRegistry::new("root", "stage", Rect::new(0.0, 0.0, 100.0, 100.0), 2);
        let history = History::new(&reg);
        (reg, history)
    }

    fn x_of(reg: &ChildRegistry, id: &ChildId) -> f64 {
        reg.get(id).unwrap().first_shape().unwrap().bound().x0
    }

    #[test]
    fn undo_restores_previous_log_then_removes() {
        let (mut reg, mut history) = setup();
        let id = reg
            .append(AppendChild::new("box", Shape::rect(Rect::new(0.0, 0.0, 10.0, 10.0))))
            .unwrap();
        assert_eq!(history.log(&mut reg, "default-state"), Ok(1));

        reg.update(
            &id,
            UpdateChild::new().shapes(Shape::rect(Rect::new(50.0, 0.0, 60.0, 10.0))),
        )
        .unwrap();
        assert_eq!(history.log(&mut reg, "default-state"), Ok(1));

        assert_eq!(history.undo(&mut reg).as_deref(), Some("default-state"));
        assert_eq!(x_of(&reg, &id), 0.0);
        history.undo(&mut reg);
        assert!(!reg.contains(&id));
        assert!(!history.can_undo());
    }

    #[test]
    fn undo_tolerates_node_missing_from_registry() {
        let (mut reg, mut history) = setup();
        let id = reg
            .append(AppendChild::new("box", Shape::rect(Rect::new(0.0, 0.0, 10.0, 10.0))))
            .unwrap();
        assert_eq!(history.log(&mut reg, "drawing"), Ok(1));

        // Drop the node behind the log's back.
        reg.take(&id).unwrap();
        assert_eq!(history.undo(&mut reg).as_deref(), Some("drawing"));
        assert!(!reg.contains(&id));
        assert!(history.can_redo());

        assert_eq!(history.redo(&mut reg).as_deref(), Some("drawing"));
        assert!(reg.contains(&id));
    }

    #[test]
    fn redo_replays_forward() {
        let (mut reg, mut history) = setup();
        let id = reg
            .append(AppendChild::new("box", Shape::rect(Rect::new(0.0, 0.0, 10.0, 10.0))))
            .unwrap();
        history.log(&mut reg, "a").unwrap();
        reg.remove(&id).unwrap();
        history.log(&mut reg, "b").unwrap();

        history.undo(&mut reg);
        assert!(reg.contains(&id));
        assert_eq!(history.redo(&mut reg).as_deref(), Some("b"));
        assert!(!reg.contains(&id));
        assert!(!history.can_redo());
        assert_eq!(history.redo(&mut reg), None);
    }

    #[test]
    fn undo_at_bottom_is_noop() {
        let (mut reg, mut history) = setup();
        assert_eq!(history.undo(&mut reg), None);
        assert_eq!(history.cursor(), 0);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn new_log_discards_redo_tail() {
        let (mut reg, mut history) = setup();
        for name in ["a", "b"] {
            reg.append(AppendChild::new("box", Shape::rect(Rect::ZERO)).with_id(name))
                .unwrap();
            history.log(&mut reg, "s").unwrap();
        }
        history.undo(&mut reg);
        assert!(history.can_redo());
        reg.append(AppendChild::new("box", Shape::rect(Rect::ZERO)).with_id("c"))
            .unwrap();
        history.log(&mut reg, "s").unwrap();
        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.redo(&mut reg), None);
        assert!(!reg.contains(&ChildId::from("b")));
    }

    #[test]
    fn no_op_changes_are_not_logged() {
        let (mut reg, mut history) = setup();
        let id = reg.append(AppendChild::new("box", Shape::rect(Rect::ZERO))).unwrap();
        history.log(&mut reg, "s").unwrap();
        reg.update(&id, UpdateChild::new().class_name("box")).unwrap();
        assert_eq!(history.log(&mut reg, "s"), Ok(0));
        assert_eq!(history.len(), 1);
        assert!(reg.unlogged().is_empty());
    }

    #[test]
    fn append_then_remove_before_log_leaves_nothing() {
        let (mut reg, mut history) = setup();
        let id = reg.append(AppendChild::new("box", Shape::rect(Rect::ZERO))).unwrap();
        reg.remove(&id).unwrap();
        assert_eq!(history.log(&mut reg, "s"), Ok(0));
        assert!(history.is_empty());
    }

    #[test]
    fn undo_keeps_insertion_position_for_updates() {
        let (mut reg, mut history) = setup();
        for name in ["a", "b"] {
            reg.append(AppendChild::new("box", Shape::rect(Rect::ZERO)).with_id(name))
                .unwrap();
        }
        history.log(&mut reg, "s").unwrap();
        reg.update(&ChildId::from("a"), UpdateChild::new().z_index(3))
            .unwrap();
        history.log(&mut reg, "s").unwrap();
        history.undo(&mut reg);
        let order: Vec<&str> = reg.iter().map(|c| c.id().as_str()).collect();
        assert_eq!(order, ["root", "a", "b"]);
        assert_eq!(reg.get(&ChildId::from("a")).unwrap().z_index(), 0);
    }
}
