// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene faults.
//!
//! Every variant is a programmer-misuse fault: the call that produced it should not have
//! been issued. Nothing here is retried or recovered internally.

use core::fmt;

use stay_selector::SelectorError;

use crate::types::{ChildId, ShapeKey};

/// Errors raised by registry, diff and history operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SceneError {
    /// The root node can never be removed.
    RootRemoval(ChildId),
    /// A node with this id already exists.
    DuplicateId(ChildId),
    /// No node with this id exists.
    UnknownChild(ChildId),
    /// The node has no shape under this key.
    UnknownShape {
        /// Owning node.
        id: ChildId,
        /// Requested key.
        key: ShapeKey,
    },
    /// A diff paired a snapshot and a live node with different ids.
    DiffMismatch {
        /// Id recorded in the history snapshot.
        history: ChildId,
        /// Id of the live node.
        now: ChildId,
    },
    /// A layer index beyond the surface's layer count.
    LayerOutOfRange {
        /// Requested layer.
        layer: usize,
        /// Number of layers on the surface.
        count: usize,
    },
    /// A node selector failed to parse.
    Selector(SelectorError),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootRemoval(id) => write!(f, "the root node `{id}` cannot be removed"),
            Self::DuplicateId(id) => write!(f, "a node with id `{id}` already exists"),
            Self::UnknownChild(id) => write!(f, "no node with id `{id}`"),
            Self::UnknownShape { id, key } => write!(f, "node `{id}` has no shape {key}"),
            Self::DiffMismatch { history, now } => write!(
                f,
                "diff id mismatch: history has `{history}` but the live node is `{now}`"
            ),
            Self::LayerOutOfRange { layer, count } => {
                write!(f, "layer {layer} out of range ({count} layers)")
            }
            Self::Selector(err) => err.fmt(f),
        }
    }
}

impl core::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Selector(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SelectorError> for SceneError {
    fn from(err: SelectorError) -> Self {
        Self::Selector(err)
    }
}
