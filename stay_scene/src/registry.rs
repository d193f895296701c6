// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The child registry: an ordered map from id to scene node.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use hashbrown::{HashMap, HashSet};
use kurbo::{Point, Rect, Vec2};

use crate::child::{Child, ShapeSet};
use crate::error::SceneError;
use crate::shape::{Paint, Shape, ShapeBehavior, ShapeUpdate};
use crate::types::{ChildFlags, ChildId, DrawAction, LayerHint, ShapeKey};

/// Comparator used to order selector results.
pub type SortBy = dyn Fn(&Child, &Child) -> Ordering;

/// Selector matching every node.
pub const SELECT_ALL: &str = "*";

/// Arguments for [`ChildRegistry::append`].
#[derive(Clone, Debug)]
pub struct AppendChild {
    /// Explicit id; one is generated when `None`.
    pub id: Option<ChildId>,
    /// Class name, optionally with a `:` sub-state suffix.
    pub class_name: String,
    /// Shapes in any accepted form.
    pub shapes: ShapeSet,
    /// Requested paint layer.
    pub layer: LayerHint,
    /// Paint order within the layer.
    pub z_index: i32,
    /// Visibility and picking flags.
    pub flags: ChildFlags,
}

impl AppendChild {
    /// A node of `class_name` carrying `shapes`, on the bottom layer.
    pub fn new(class_name: impl Into<String>, shapes: impl Into<ShapeSet>) -> Self {
        Self {
            id: None,
            class_name: class_name.into(),
            shapes: shapes.into(),
            layer: LayerHint::default(),
            z_index: 0,
            flags: ChildFlags::default(),
        }
    }

    /// Use an explicit id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ChildId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Request a paint layer.
    #[must_use]
    pub fn with_layer(mut self, layer: LayerHint) -> Self {
        self.layer = layer;
        self
    }

    /// Set the paint order.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Set the flags.
    #[must_use]
    pub fn with_flags(mut self, flags: ChildFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Arguments for [`ChildRegistry::update`]. Unset fields are left alone.
#[derive(Clone, Debug, Default)]
pub struct UpdateChild {
    /// New class name.
    pub class_name: Option<String>,
    /// Replacement shapes.
    pub shapes: Option<ShapeSet>,
    /// New paint layer.
    pub layer: Option<LayerHint>,
    /// New paint order.
    pub z_index: Option<i32>,
    /// New flags.
    pub flags: Option<ChildFlags>,
}

impl UpdateChild {
    /// An empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the class name.
    #[must_use]
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Replace the shapes.
    #[must_use]
    pub fn shapes(mut self, shapes: impl Into<ShapeSet>) -> Self {
        self.shapes = Some(shapes.into());
        self
    }

    /// Move to another layer.
    #[must_use]
    pub fn layer(mut self, layer: LayerHint) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Change the paint order.
    #[must_use]
    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    /// Change the flags.
    #[must_use]
    pub fn flags(mut self, flags: ChildFlags) -> Self {
        self.flags = Some(flags);
        self
    }
}

/// A point hit-test request for [`ChildRegistry::contain_point`].
#[derive(Clone, Copy)]
pub struct PointQuery<'a> {
    /// Surface-space point.
    pub point: Point,
    /// Node selector restricting the candidates.
    pub selector: &'a str,
    /// Candidate order; topmost first when `None`.
    pub sort_by: Option<&'a SortBy>,
    /// Stop at the first hit.
    pub return_first: bool,
    /// Let the root node count as a hit.
    pub with_root: bool,
}

impl fmt::Debug for PointQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointQuery")
            .field("point", &self.point)
            .field("selector", &self.selector)
            .field("sort_by", &self.sort_by.map(|_| "custom"))
            .field("return_first", &self.return_first)
            .field("with_root", &self.with_root)
            .finish()
    }
}

impl<'a> PointQuery<'a> {
    /// Every non-root node under `point`, topmost first.
    pub fn new(point: impl Into<Point>) -> Self {
        Self {
            point: point.into(),
            selector: SELECT_ALL,
            sort_by: None,
            return_first: false,
            with_root: false,
        }
    }

    /// Restrict candidates to `selector`.
    #[must_use]
    pub fn selector(mut self, selector: &'a str) -> Self {
        self.selector = selector;
        self
    }

    /// Order candidates with `sort_by`.
    #[must_use]
    pub fn sort_by(mut self, sort_by: &'a SortBy) -> Self {
        self.sort_by = Some(sort_by);
        self
    }

    /// Stop at the first hit.
    #[must_use]
    pub fn first(mut self) -> Self {
        self.return_first = true;
        self
    }

    /// Let the root node count.
    #[must_use]
    pub fn with_root(mut self) -> Self {
        self.with_root = true;
        self
    }
}

/// Ordered map from id to [`Child`], plus the bookkeeping the history and the render pass
/// read: the ids touched since the last log and the layers needing a repaint.
///
/// Insertion order is the paint order fallback when z-indices tie. The registry always
/// holds a root node spanning the surface extent; it sits below everything and can never
/// be removed.
pub struct ChildRegistry {
    entries: Vec<Child>,
    slots: HashMap<ChildId, usize>,
    layer_count: usize,
    root: ChildId,
    unlogged: Vec<ChildId>,
    unlogged_set: HashSet<ChildId>,
    dirty: Vec<bool>,
    next_auto_id: u64,
}

impl fmt::Debug for ChildRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildRegistry")
            .field("root", &self.root)
            .field("children", &self.entries.len())
            .field("layer_count", &self.layer_count)
            .field("unlogged", &self.unlogged.len())
            .finish_non_exhaustive()
    }
}

impl ChildRegistry {
    /// A registry holding only the root node.
    ///
    /// The root gets `root_id`, `root_class` and an unpainted rectangle spanning
    /// `extent`. At least one layer always exists.
    pub fn new(
        root_id: impl Into<ChildId>,
        root_class: impl Into<String>,
        extent: Rect,
        layers: usize,
    ) -> Self {
        let layer_count = layers.max(1);
        let root_id = root_id.into();
        let surface = Shape::rect(extent).with_paint(Paint {
            fill: None,
            stroke: None,
            ..Paint::default()
        });
        let mut root = Child::new(root_id.clone(), root_class.into(), surface.into(), 0, layer_count);
        root.z_index = i32::MIN;
        let mut slots = HashMap::new();
        slots.insert(root_id.clone(), 0);
        Self {
            entries: alloc::vec![root],
            slots,
            layer_count,
            root: root_id,
            unlogged: Vec::new(),
            unlogged_set: HashSet::new(),
            dirty: alloc::vec![true; layer_count],
            next_auto_id: 0,
        }
    }

    /// Id of the root node.
    pub fn root_id(&self) -> &ChildId {
        &self.root
    }

    /// Number of paint layers.
    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    /// Number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the root is always present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The node with `id`.
    pub fn get(&self, id: &ChildId) -> Option<&Child> {
        self.slots.get(id).map(|&slot| &self.entries[slot])
    }

    /// Whether a node with `id` exists.
    pub fn contains(&self, id: &ChildId) -> bool {
        self.slots.contains_key(id)
    }

    /// All nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Child> + '_ {
        self.entries.iter()
    }

    /// Insert a new node and mark it unlogged.
    pub fn append(&mut self, args: AppendChild) -> Result<ChildId, SceneError> {
        let id = match args.id {
            Some(id) if self.contains(&id) => return Err(SceneError::DuplicateId(id)),
            Some(id) => id,
            None => self.auto_id(),
        };
        let layer = args.layer.resolve(self.layer_count)?;
        let mut child = Child::new(id.clone(), args.class_name, args.shapes, layer, self.layer_count);
        child.z_index = args.z_index;
        child.flags = args.flags;
        tracing::trace!(id = %id, class = %child.class_name, layer, "append child");
        self.slots.insert(id.clone(), self.entries.len());
        self.entries.push(child);
        self.dirty[layer] = true;
        self.touch(&id);
        Ok(id)
    }

    /// Apply `args` to an existing node and mark it unlogged.
    pub fn update(&mut self, id: &ChildId, args: UpdateChild) -> Result<&Child, SceneError> {
        let slot = self.slot(id)?;
        let layer = match args.layer {
            Some(hint) => Some(hint.resolve(self.layer_count)?),
            None => None,
        };
        let layer_count = self.layer_count;
        let child = &mut self.entries[slot];
        let old_layer = child.layer;
        if let Some(class_name) = args.class_name {
            child.class_name = class_name;
        }
        if let Some(shapes) = args.shapes {
            child.shapes = shapes.into_map();
        }
        if let Some(layer) = layer {
            child.set_layer(layer, layer_count);
        }
        if let Some(z_index) = args.z_index {
            child.z_index = z_index;
        }
        if let Some(flags) = args.flags {
            child.flags = flags;
        }
        child.rebind();
        child.mark_pending(DrawAction::Update);
        let new_layer = child.layer;
        self.dirty[old_layer] = true;
        self.dirty[new_layer] = true;
        self.touch(id);
        Ok(&self.entries[slot])
    }

    /// Apply a partial update to one shape of a node and mark the node unlogged.
    pub fn update_shape(
        &mut self,
        id: &ChildId,
        key: &ShapeKey,
        update: &ShapeUpdate,
    ) -> Result<&Child, SceneError> {
        let slot = self.slot(id)?;
        let child = &mut self.entries[slot];
        let shape = child.shape_mut(key).ok_or_else(|| SceneError::UnknownShape {
            id: id.clone(),
            key: key.clone(),
        })?;
        shape.update(update);
        child.mark_pending(DrawAction::Update);
        self.dirty[child.layer] = true;
        self.touch(id);
        Ok(&self.entries[slot])
    }

    /// Remove a node and mark its id unlogged. The root cannot be removed.
    pub fn remove(&mut self, id: &ChildId) -> Result<Child, SceneError> {
        if *id == self.root {
            return Err(SceneError::RootRemoval(id.clone()));
        }
        let child = self.take(id)?;
        tracing::trace!(id = %id, "remove child");
        self.touch(id);
        Ok(child)
    }

    /// Insert `child` as is, replacing any node with the same id in place.
    ///
    /// Used to restore snapshots; the id is not marked unlogged.
    pub(crate) fn put(&mut self, mut child: Child) {
        if child.layer >= self.layer_count {
            child.set_layer(self.layer_count - 1, self.layer_count);
        }
        child.rebind();
        self.dirty[child.layer] = true;
        if let Some(&slot) = self.slots.get(&child.id) {
            let old_layer = self.entries[slot].layer;
            self.dirty[old_layer] = true;
            child.pending = Some(DrawAction::Update);
            self.entries[slot] = child;
        } else {
            child.pending = Some(DrawAction::Append);
            self.slots.insert(child.id.clone(), self.entries.len());
            self.entries.push(child);
        }
    }

    /// Remove a node without the root check or unlogged bookkeeping.
    pub(crate) fn take(&mut self, id: &ChildId) -> Result<Child, SceneError> {
        let slot = self
            .slots
            .remove(id)
            .ok_or_else(|| SceneError::UnknownChild(id.clone()))?;
        let child = self.entries.remove(slot);
        for later in &self.entries[slot..] {
            if let Some(s) = self.slots.get_mut(&later.id) {
                *s -= 1;
            }
        }
        self.dirty[child.layer] = true;
        Ok(child)
    }

    /// Deep copy of every node, keyed by id.
    pub fn snapshot(&self) -> HashMap<ChildId, Child> {
        self.entries
            .iter()
            .map(|c| (c.id.clone(), c.clone()))
            .collect()
    }

    /// Ids touched since the unlogged set was last cleared, in first-touch order.
    pub fn unlogged(&self) -> &[ChildId] {
        &self.unlogged
    }

    pub(crate) fn clear_unlogged(&mut self) {
        self.unlogged.clear();
        self.unlogged_set.clear();
    }

    /// Resolve a node selector, topmost first unless `sort_by` is given.
    ///
    /// Operands are `.class` (matching the class name with or without a `:` suffix),
    /// `#id`, `*` for every node, or a bare class name. Unknown operands match nothing.
    /// A custom comparator is applied as a stable sort over insertion order.
    pub fn select(&self, selector: &str, sort_by: Option<&SortBy>) -> Result<Vec<&Child>, SceneError> {
        let universe: Vec<usize> = (0..self.entries.len()).collect();
        let mut slots = stay_selector::evaluate(selector, &universe, |token| self.match_token(token))?;
        self.order(&mut slots, sort_by);
        Ok(slots.into_iter().map(|slot| &self.entries[slot]).collect())
    }

    /// Nodes under `query.point`, skipping nodes that are not pickable.
    pub fn contain_point(&self, query: &PointQuery<'_>) -> Result<Vec<&Child>, SceneError> {
        let mut hits = Vec::new();
        for child in self.select(query.selector, query.sort_by)? {
            if !query.with_root && child.id == self.root {
                continue;
            }
            if !child.flags.contains(ChildFlags::PICKABLE) || !child.contains_point(query.point) {
                continue;
            }
            hits.push(child);
            if query.return_first {
                break;
            }
        }
        Ok(hits)
    }

    /// Non-root nodes matching `selector` whose shape centroids all lie inside `area`.
    pub fn children_in_area(&self, area: Rect, selector: &str) -> Result<Vec<&Child>, SceneError> {
        Ok(self
            .select(selector, None)?
            .into_iter()
            .filter(|c| c.id != self.root && c.in_area(area))
            .collect())
    }

    /// Visible nodes on `layer` in paint order: z-index ascending, then insertion order.
    pub fn paint_order(&self, layer: usize) -> Vec<&Child> {
        let mut nodes: Vec<&Child> = self
            .entries
            .iter()
            .filter(|c| c.layer == layer && c.flags.contains(ChildFlags::VISIBLE))
            .collect();
        nodes.sort_by_key(|c| c.z_index);
        nodes
    }

    /// Translate every non-root node matching `selector` and mark each unlogged.
    pub fn translate(&mut self, selector: &str, delta: Vec2) -> Result<Vec<ChildId>, SceneError> {
        self.transform(selector, |c| c.translate(delta))
    }

    /// Scale every non-root node matching `selector` around `origin` and mark each
    /// unlogged.
    pub fn scale_about(
        &mut self,
        selector: &str,
        scale: f64,
        origin: Point,
    ) -> Result<Vec<ChildId>, SceneError> {
        self.transform(selector, |c| c.scale_about(scale, origin))
    }

    /// Mark `layer` for repaint. Out-of-range layers are ignored.
    pub fn mark_layer_dirty(&mut self, layer: usize) {
        if let Some(d) = self.dirty.get_mut(layer) {
            *d = true;
        }
    }

    /// Mark every layer for repaint.
    pub fn mark_all_dirty(&mut self) {
        self.dirty.fill(true);
    }

    /// Whether `layer` awaits a repaint.
    pub fn is_dirty(&self, layer: usize) -> bool {
        self.dirty.get(layer).copied().unwrap_or(false)
    }

    /// Dirty layer indices, clearing the marks.
    pub(crate) fn take_dirty(&mut self) -> Vec<usize> {
        let layers = self
            .dirty
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.then_some(i))
            .collect();
        self.dirty.fill(false);
        layers
    }

    /// Forget pending draw actions and partition migrations after a render pass.
    pub(crate) fn finish_draw(&mut self) {
        for child in &mut self.entries {
            child.pending = None;
            child.before_parent_layer = None;
        }
    }

    fn transform(
        &mut self,
        selector: &str,
        mut f: impl FnMut(&mut Child),
    ) -> Result<Vec<ChildId>, SceneError> {
        let universe: Vec<usize> = (0..self.entries.len()).collect();
        let slots = stay_selector::evaluate(selector, &universe, |token| self.match_token(token))?;
        let mut touched = Vec::with_capacity(slots.len());
        for slot in slots {
            let child = &mut self.entries[slot];
            if child.id == self.root {
                continue;
            }
            f(child);
            child.mark_pending(DrawAction::Update);
            self.dirty[child.layer] = true;
            touched.push(child.id.clone());
        }
        for id in &touched {
            self.touch(id);
        }
        Ok(touched)
    }

    fn match_token(&self, token: &str) -> Vec<usize> {
        let matches = |c: &Child| match token {
            SELECT_ALL => true,
            _ => {
                if let Some(id) = token.strip_prefix('#') {
                    c.id.as_str() == id
                } else {
                    let class = token.strip_prefix('.').unwrap_or(token);
                    c.class_name == class || c.base_class() == class
                }
            }
        };
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(slot, c)| matches(c).then_some(slot))
            .collect()
    }

    fn order(&self, slots: &mut [usize], sort_by: Option<&SortBy>) {
        match sort_by {
            Some(cmp) => slots.sort_by(|a, b| cmp(&self.entries[*a], &self.entries[*b])),
            None => slots.sort_by(|a, b| {
                self.entries[*b]
                    .z_index
                    .cmp(&self.entries[*a].z_index)
                    .then(b.cmp(a))
            }),
        }
    }

    fn slot(&self, id: &ChildId) -> Result<usize, SceneError> {
        self.slots
            .get(id)
            .copied()
            .ok_or_else(|| SceneError::UnknownChild(id.clone()))
    }

    fn touch(&mut self, id: &ChildId) {
        if self.unlogged_set.insert(id.clone()) {
            self.unlogged.push(id.clone());
        }
    }

    fn auto_id(&mut self) -> ChildId {
        loop {
            self.next_auto_id += 1;
            let id = ChildId::new(format!("stay-{}", self.next_auto_id));
            if !self.contains(&id) {
                return id;
            }
        }
    }
}
