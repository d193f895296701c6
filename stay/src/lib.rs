// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stay: an interactive scene-graph and event-dispatch engine for 2D drawing surfaces.
//!
//! ## Overview
//!
//! [`Stay`] owns a retained scene of addressable shapes, an undo/redo history, a set of
//! named interaction states and an event pipeline. Native input goes in through
//! [`Stay::handle`]; user code reacts through listeners that receive the [`Tools`]
//! contract.
//!
//! One tick runs these steps in order:
//!
//! 1) The input normalizer maps the native event to a trigger and a surface-relative
//!    snapshot.
//! 2) The event machine fires every armed event bound to that trigger whose guard passes.
//!    Success hooks may arm and disarm further events, for example the drag chain.
//! 3) The dispatcher hands each fired event to the listeners subscribed to it, gated by
//!    the current state and, for pointer events, by a hit test over the listener's
//!    selector.
//! 4) Synthetic actions queued by callbacks are dispatched the same way.
//!
//! Rendering is separate: [`Stay::render`] repaints the layers touched since the last frame
//! and fulfils the [`Completion`] signals handed out by removals and camera moves.
//!
//! ## States
//!
//! Listeners carry a state expression in the selector algebra (`&`, `|`, `!`, parentheses)
//! over state names, for example `default-state|annotationSelected`. A listener is eligible
//! when the current state is in the set the expression resolves to. See [`states`].
//!
//! ## History
//!
//! Mutations are not recorded on their own: a call to [`Tools::log`], or a listener with
//! [`log`](ListenerDefinition::log) set, turns the changes since the previous log into one
//! undoable batch labelled with the current state.
//!
//! ## Example
//!
//! ```
//! use kurbo::Rect;
//! use stay::{AppendChild, Compose, ListenerDefinition, Shape, Stay, StayConfig};
//! use stay::defaults::{DRAG, DRAG_END, DRAG_START};
//! use stay::input::{PointerKind, RawEvent};
//!
//! let mut stay = Stay::new(StayConfig::default().with_size(200.0, 200.0));
//! stay.tools_mut()
//!     .append_child(AppendChild::new("box", Shape::rect(Rect::new(0.0, 0.0, 20.0, 20.0))).with_id("box"))
//!     .unwrap();
//! stay.tools_mut().log().unwrap();
//!
//! // Drag boxes along with the pointer; one undo step per gesture.
//! stay.add_event_listener(
//!     ListenerDefinition::new("pan", |cx| {
//!         let point = cx.event.input.point;
//!         match cx.event.name.as_str() {
//!             DRAG_START => {
//!                 cx.tools.move_start();
//!                 return Ok(Compose::none().on(DRAG_START, move |_| {
//!                     stay::store::Store::new().with("origin", point)
//!                 }));
//!             }
//!             DRAG => {
//!                 if let Some(origin) = cx.compose.get::<kurbo::Point>("origin") {
//!                     cx.tools.move_by(point - *origin, Some(".box"))?;
//!                 }
//!             }
//!             _ => {
//!                 cx.tools.move_end();
//!                 cx.tools.log()?;
//!             }
//!         }
//!         Ok(Compose::none())
//!     })
//!     .events([DRAG_START, DRAG, DRAG_END]),
//! )
//! .unwrap();
//!
//! stay.handle(&RawEvent::pointer(PointerKind::Down, (5.0, 5.0))).unwrap();
//! stay.handle(&RawEvent::pointer(PointerKind::Move, (15.0, 5.0))).unwrap();
//! stay.handle(&RawEvent::pointer(PointerKind::Move, (35.0, 5.0))).unwrap();
//! stay.handle(&RawEvent::pointer(PointerKind::Up, (35.0, 5.0))).unwrap();
//!
//! let bound = |stay: &Stay| stay.tools().child(&"box".into()).unwrap().bound().unwrap();
//! assert_eq!(bound(&stay).origin().x, 30.0);
//! stay.tools_mut().undo();
//! assert_eq!(bound(&stay).origin().x, 0.0);
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards to Kurbo and the member crates.
//! - `libm`: `no_std` float math for Kurbo.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod action;
mod config;
mod controller;
mod error;
pub mod states;
mod tools;

pub use action::{
    ActionContext, Compose, Dispatcher, EventSnapshot, Invocation, ListenerDefinition,
    SyntheticAction,
};
pub use config::StayConfig;
pub use controller::{MAX_SYNTHETIC_ROUNDS, Stay, Tick};
pub use error::StayError;
pub use tools::Tools;

pub use stay_event::{defaults, input, machine, store};
pub use stay_scene::{
    AppendChild, Batch, Child, ChildFlags, ChildId, Completion, Frame, History, LayerHint, Paint,
    ParentLayer, PointQuery, Rgba8, SceneError, Shape, ShapeBehavior, ShapeKey, ShapeSet,
    ShapeUpdate, SortBy, Step, Surface, UpdateChild,
};
pub use stay_selector::SelectorError;
