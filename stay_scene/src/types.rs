// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: identities, flags, layers, and shape keys.

use alloc::string::String;
use core::fmt;

use crate::error::SceneError;

/// Stable identity of a scene node.
///
/// Ids are unique across the registry, the root node included, and stay stable for the
/// node's whole lifetime. Removing a node and restoring it through undo brings back the
/// same id.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ChildId(String);

impl ChildId {
    /// Wrap an owned string as an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChildId {
    fn from(id: &str) -> Self {
        Self(id.into())
    }
}

impl From<String> for ChildId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&ChildId> for ChildId {
    fn from(id: &ChildId) -> Self {
        id.clone()
    }
}

bitflags::bitflags! {
    /// Node flags controlling drawing and picking.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ChildFlags: u8 {
        /// Node is drawn by the render pass.
        const VISIBLE  = 0b0000_0001;
        /// Node participates in point hit testing.
        const PICKABLE = 0b0000_0010;
    }
}

impl Default for ChildFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

/// Requested paint layer for a node's shapes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum LayerHint {
    /// The bottom layer, index `0`.
    #[default]
    Bottom,
    /// A concrete layer index counted from the bottom.
    Index(usize),
    /// The topmost layer, which forms the [`ParentLayer::Draw`] partition.
    Top,
}

impl LayerHint {
    /// Resolve the hint to a concrete layer index for a surface with `count` layers.
    pub fn resolve(self, count: usize) -> Result<usize, SceneError> {
        match self {
            Self::Bottom => Ok(0),
            Self::Index(layer) if layer < count => Ok(layer),
            Self::Index(layer) => Err(SceneError::LayerOutOfRange { layer, count }),
            Self::Top => Ok(count.saturating_sub(1)),
        }
    }
}

/// Redraw partition owning a node.
///
/// The topmost layer of a multi-layer surface is the draw partition, used for content
/// that changes every frame (for example a shape being drawn). Everything below is the
/// main partition.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ParentLayer {
    /// Layers below the top layer.
    Main,
    /// The top layer.
    Draw,
}

impl ParentLayer {
    /// The partition that a resolved `layer` belongs to, out of `count` layers.
    pub fn of(layer: usize, count: usize) -> Self {
        if count > 1 && layer + 1 == count {
            Self::Draw
        } else {
            Self::Main
        }
    }
}

/// Draw work pending for a node until the next render pass.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DrawAction {
    /// The node was appended (or restored) since the last render pass.
    Append,
    /// The node was updated since the last render pass.
    Update,
}

/// Key of one shape inside a node.
///
/// Shapes given as a single value or a list are keyed by position; shapes given as a named
/// map keep their names.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ShapeKey {
    /// Positional key.
    Index(usize),
    /// Explicit name.
    Name(String),
}

impl fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "#{i}"),
            Self::Name(name) => write!(f, "`{name}`"),
        }
    }
}

impl From<usize> for ShapeKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for ShapeKey {
    fn from(name: &str) -> Self {
        Self::Name(name.into())
    }
}
