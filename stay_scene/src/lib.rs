// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stay Scene: a Kurbo-native retained scene of addressable, styled shapes.
//!
//! The scene is a flat, ordered registry of nodes. Each node wraps one or more shapes
//! under a stable id, a class name and a z-index, and lives on one of a fixed number of
//! paint layers. On top of the registry sit a structural diff and a linear undo/redo
//! history.
//!
//! - [`ChildRegistry`]: the ordered id → [`Child`] map, with selector, point and area
//!   queries and per-layer dirty tracking.
//! - [`Shape`] and [`ShapeBehavior`]: the closed set of drawable variants and the
//!   capabilities the scene uses (draw, translate, scale, update, contains, bound).
//! - [`diff`] and [`Step`]: the structural delta between a node's last logged state and
//!   its live state.
//! - [`History`]: batches of steps with a cursor for undo and redo.
//! - [`RenderScheduler`] and [`Completion`]: the render pass over dirty layers and the
//!   single-shot signals it fulfils.
//!
//! ## Mutation tracking
//!
//! There is no implicit change interception. Every mutating registry call records the
//! touched id in the unlogged set itself, and [`History::log`] diffs exactly those ids
//! against the last snapshot.
//!
//! ## Layers
//!
//! Layers are numbered from the bottom. On a surface with more than one layer the top
//! layer is the draw partition ([`ParentLayer::Draw`]), meant for content that changes
//! every frame; the rest form the main partition.
//!
//! ## Example
//!
//! ```
//! use kurbo::Rect;
//! use stay_scene::{AppendChild, ChildRegistry, History, Shape, ShapeBehavior, UpdateChild};
//!
//! let mut registry = ChildRegistry::new("root", "stage", Rect::new(0.0, 0.0, 640.0, 480.0), 2);
//! let mut history = History::new(&registry);
//!
//! let id = registry
//!     .append(AppendChild::new("box", Shape::rect(Rect::new(0.0, 0.0, 10.0, 10.0))))
//!     .unwrap();
//! history.log(&mut registry, "default-state").unwrap();
//!
//! registry
//!     .update(&id, UpdateChild::new().shapes(Shape::rect(Rect::new(50.0, 0.0, 60.0, 10.0))))
//!     .unwrap();
//! history.log(&mut registry, "default-state").unwrap();
//!
//! history.undo(&mut registry);
//! let x = registry.get(&id).unwrap().first_shape().unwrap().bound().x0;
//! assert_eq!(x, 0.0);
//!
//! history.undo(&mut registry);
//! assert!(registry.get(&id).is_none());
//! ```

#![no_std]

extern crate alloc;

mod child;
mod error;
mod history;
mod registry;
mod schedule;
mod shape;
mod types;

pub use child::{Child, ShapeSet, Step, diff};
pub use error::SceneError;
pub use history::{Batch, History};
pub use registry::{AppendChild, ChildRegistry, PointQuery, SELECT_ALL, SortBy, UpdateChild};
pub use schedule::{Completion, Frame, RenderScheduler};
pub use shape::{
    CircleShape, LineShape, MIN_HIT_RADIUS, PATH_TOLERANCE, Paint, PathShape, PolylineShape,
    RectShape, Rgba8, Shape, ShapeBase, ShapeBehavior, ShapeUpdate, Surface,
};
pub use types::{ChildFlags, ChildId, DrawAction, LayerHint, ParentLayer, ShapeKey};
