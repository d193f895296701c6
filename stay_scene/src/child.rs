// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene nodes and their structural diff.

use alloc::string::String;
use alloc::vec::Vec;
use kurbo::{Point, Rect, Vec2};
use smallvec::SmallVec;

use crate::error::SceneError;
use crate::shape::{Shape, ShapeBehavior, Surface};
use crate::types::{ChildFlags, ChildId, DrawAction, ParentLayer, ShapeKey};

/// Keyed shapes of one node, in insertion order.
pub(crate) type ShapeMap = SmallVec<[(ShapeKey, Shape); 1]>;

/// Shapes handed to a node, in any of the accepted forms.
///
/// All forms are normalized to a keyed map: single shapes and lists are keyed by position,
/// named maps keep their names.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeSet {
    /// One shape, keyed `0`.
    Single(Shape),
    /// Positional shapes, keyed `0..n`.
    List(Vec<Shape>),
    /// Named shapes, in the given order.
    Named(Vec<(String, Shape)>),
}

impl ShapeSet {
    /// Build a named set.
    pub fn named<K: Into<String>>(shapes: impl IntoIterator<Item = (K, Shape)>) -> Self {
        Self::Named(shapes.into_iter().map(|(k, s)| (k.into(), s)).collect())
    }

    pub(crate) fn into_map(self) -> ShapeMap {
        match self {
            Self::Single(shape) => smallvec::smallvec![(ShapeKey::Index(0), shape)],
            Self::List(shapes) => shapes
                .into_iter()
                .enumerate()
                .map(|(i, s)| (ShapeKey::Index(i), s))
                .collect(),
            Self::Named(shapes) => {
                let mut map = ShapeMap::new();
                for (name, shape) in shapes {
                    let key = ShapeKey::Name(name);
                    // Later entries win, as in a map literal.
                    if let Some(slot) = map.iter_mut().find(|(k, _)| *k == key) {
                        slot.1 = shape;
                    } else {
                        map.push((key, shape));
                    }
                }
                map
            }
        }
    }
}

impl From<Shape> for ShapeSet {
    fn from(shape: Shape) -> Self {
        Self::Single(shape)
    }
}

impl From<Vec<Shape>> for ShapeSet {
    fn from(shapes: Vec<Shape>) -> Self {
        Self::List(shapes)
    }
}

impl<const N: usize> From<[Shape; N]> for ShapeSet {
    fn from(shapes: [Shape; N]) -> Self {
        Self::List(shapes.into())
    }
}

/// An addressable scene node wrapping one or more shapes under one identity.
#[derive(Clone, Debug)]
pub struct Child {
    pub(crate) id: ChildId,
    pub(crate) class_name: String,
    pub(crate) layer: usize,
    pub(crate) parent_layer: ParentLayer,
    pub(crate) before_parent_layer: Option<ParentLayer>,
    pub(crate) z_index: i32,
    pub(crate) flags: ChildFlags,
    pub(crate) shapes: ShapeMap,
    pub(crate) pending: Option<DrawAction>,
}

impl Child {
    pub(crate) fn new(
        id: ChildId,
        class_name: String,
        shapes: ShapeSet,
        layer: usize,
        layer_count: usize,
    ) -> Self {
        let mut child = Self {
            id,
            class_name,
            layer,
            parent_layer: ParentLayer::of(layer, layer_count),
            before_parent_layer: None,
            z_index: 0,
            flags: ChildFlags::default(),
            shapes: shapes.into_map(),
            pending: Some(DrawAction::Append),
        };
        child.rebind();
        child
    }

    /// Stable identity.
    pub fn id(&self) -> &ChildId {
        &self.id
    }

    /// Full class name, sub-state suffix included.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Class name without the `:`-separated sub-state suffix.
    ///
    /// ```
    /// # use stay_scene::{ChildRegistry, AppendChild, Shape};
    /// # use kurbo::Rect;
    /// let mut reg = ChildRegistry::new("root", "root", Rect::new(0.0, 0.0, 10.0, 10.0), 2);
    /// let id = reg
    ///     .append(AppendChild::new("annotation:selected", Shape::rect(Rect::ZERO)))
    ///     .unwrap();
    /// let child = reg.get(&id).unwrap();
    /// assert_eq!(child.base_class(), "annotation");
    /// assert_eq!(child.sub_state(), Some("selected"));
    /// ```
    pub fn base_class(&self) -> &str {
        self.class_name
            .split_once(':')
            .map_or(self.class_name.as_str(), |(base, _)| base)
    }

    /// The `:`-separated sub-state suffix of the class name, if any.
    pub fn sub_state(&self) -> Option<&str> {
        self.class_name.split_once(':').map(|(_, sub)| sub)
    }

    /// Resolved paint layer shared by all shapes of this node.
    pub fn layer(&self) -> usize {
        self.layer
    }

    /// Redraw partition that owns this node.
    pub fn parent_layer(&self) -> ParentLayer {
        self.parent_layer
    }

    /// Partition this node left since the last render pass, if it migrated.
    pub fn before_parent_layer(&self) -> Option<ParentLayer> {
        self.before_parent_layer
    }

    /// Paint order within the layer; larger paints later.
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Visibility and picking flags.
    pub fn flags(&self) -> ChildFlags {
        self.flags
    }

    /// Draw work pending until the next render pass.
    pub fn pending_draw(&self) -> Option<DrawAction> {
        self.pending
    }

    /// Shapes with their keys, in insertion order.
    pub fn shapes(&self) -> impl Iterator<Item = (&ShapeKey, &Shape)> + '_ {
        self.shapes.iter().map(|(k, s)| (k, s))
    }

    /// The shape stored under `key`.
    pub fn shape(&self, key: &ShapeKey) -> Option<&Shape> {
        self.shapes.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    /// The first shape, which is the only one for single-shape nodes.
    pub fn first_shape(&self) -> Option<&Shape> {
        self.shapes.first().map(|(_, s)| s)
    }

    pub(crate) fn shape_mut(&mut self, key: &ShapeKey) -> Option<&mut Shape> {
        self.shapes
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, s)| s)
    }

    /// Union of all shape bounds, or `None` for a node without shapes.
    pub fn bound(&self) -> Option<Rect> {
        self.shapes
            .iter()
            .map(|(_, s)| s.bound())
            .reduce(|acc, b| acc.union(b))
    }

    /// Whether any shape contains `pt`.
    pub fn contains_point(&self, pt: Point) -> bool {
        self.shapes.iter().any(|(_, s)| s.contains(pt))
    }

    /// Whether every shape's centroid lies inside `area`, edges included.
    ///
    /// Membership uses centroids rather than full bounds, so a large shape that pokes out
    /// of the area still counts when its center is inside. Nodes without shapes are never
    /// in any area.
    pub fn in_area(&self, area: Rect) -> bool {
        let area = area.abs();
        let inside = |p: Point| {
            (area.x0..=area.x1).contains(&p.x) && (area.y0..=area.y1).contains(&p.y)
        };
        !self.shapes.is_empty() && self.shapes.iter().all(|(_, s)| inside(s.center()))
    }

    /// Whether `other` carries the same observable content.
    ///
    /// Pending draw bookkeeping is ignored.
    pub fn same_content(&self, other: &Self) -> bool {
        self.id == other.id
            && self.class_name == other.class_name
            && self.layer == other.layer
            && self.z_index == other.z_index
            && self.flags == other.flags
            && self.shapes == other.shapes
    }

    pub(crate) fn set_layer(&mut self, layer: usize, layer_count: usize) {
        let parent = ParentLayer::of(layer, layer_count);
        if parent != self.parent_layer {
            self.before_parent_layer = Some(self.parent_layer);
            self.parent_layer = parent;
        }
        self.layer = layer;
    }

    /// Reassign the owner back-reference and resolved layer of every shape.
    pub(crate) fn rebind(&mut self) {
        for (_, shape) in &mut self.shapes {
            shape.attach(&self.id, self.layer);
        }
    }

    pub(crate) fn translate(&mut self, delta: Vec2) {
        for (_, shape) in &mut self.shapes {
            shape.translate(delta);
        }
    }

    pub(crate) fn scale_about(&mut self, scale: f64, origin: Point) {
        for (_, shape) in &mut self.shapes {
            shape.scale_about(scale, origin);
        }
    }

    pub(crate) fn draw(&self, surface: &mut dyn Surface) {
        if !self.flags.contains(ChildFlags::VISIBLE) {
            return;
        }
        for (_, shape) in &self.shapes {
            shape.draw(surface);
        }
    }

    pub(crate) fn mark_pending(&mut self, action: DrawAction) {
        // An append not yet drawn stays an append.
        if self.pending != Some(DrawAction::Append) {
            self.pending = Some(action);
        }
    }
}

/// One structural delta for a node id.
#[derive(Clone, Debug)]
pub enum Step {
    /// The node did not exist at the last snapshot.
    Append {
        /// The node as it is now.
        now: Child,
    },
    /// The node existed at the last snapshot and is gone now.
    Remove {
        /// The node as it was.
        before: Child,
    },
    /// The node changed since the last snapshot.
    Update {
        /// The node as it was.
        before: Child,
        /// The node as it is now.
        now: Child,
    },
}

impl Step {
    /// Id of the node this step concerns.
    pub fn id(&self) -> &ChildId {
        match self {
            Self::Append { now } | Self::Update { now, .. } => &now.id,
            Self::Remove { before } => &before.id,
        }
    }
}

/// Structural diff between the last snapshot of a node and its live state.
///
/// Returns `Ok(None)` when neither side exists or nothing observable changed. Pairing
/// two different ids is a fault.
pub fn diff(history: Option<&Child>, now: Option<&Child>) -> Result<Option<Step>, SceneError> {
    Ok(match (history, now) {
        (None, None) => None,
        (None, Some(now)) => Some(Step::Append { now: now.clone() }),
        (Some(before), None) => Some(Step::Remove {
            before: before.clone(),
        }),
        (Some(before), Some(now)) => {
            if before.id != now.id {
                return Err(SceneError::DiffMismatch {
                    history: before.id.clone(),
                    now: now.id.clone(),
                });
            }
            if before.same_content(now) {
                None
            } else {
                Some(Step::Update {
                    before: before.clone(),
                    now: now.clone(),
                })
            }
        }
    })
}
