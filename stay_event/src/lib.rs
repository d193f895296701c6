// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stay Event: input normalization and a chainable event state machine.
//!
//! ## Overview
//!
//! This crate turns native input into named events. It does not hit test and it does not
//! know about listeners; a higher-level dispatcher takes the fired events from here and
//! decides who gets called.
//!
//! ## Pipeline
//!
//! 1) Normalize: [`InputNormalizer`](crate::input::InputNormalizer) maps a
//!    [`RawEvent`](crate::input::RawEvent) to a [`Trigger`](crate::input::Trigger) and an
//!    [`InputSnapshot`](crate::input::InputSnapshot) with surface-relative coordinates and
//!    the pressed-key set.
//! 2) Fire: [`EventMachine`](crate::machine::EventMachine) evaluates every armed
//!    [`EventDefinition`](crate::machine::EventDefinition) bound to that trigger. Guards
//!    read the input plus two [`Store`](crate::store::Store)s; success hooks may arm and
//!    disarm further definitions to build gestures.
//! 3) Dispatch: the caller receives the [`FiredEvent`](crate::machine::FiredEvent)s in
//!    firing order.
//!
//! [`defaults`] holds the stock catalog, drag chain included.
//!
//! ```
//! use stay_event::defaults::default_events;
//! use stay_event::input::{InputNormalizer, PointerKind, RawEvent};
//! use stay_event::machine::EventMachine;
//! use stay_event::store::Store;
//!
//! let mut machine = EventMachine::new();
//! for event in default_events() {
//!     machine.register(event);
//! }
//! let mut normalizer = InputNormalizer::default();
//! let (mut store, mut state_store) = (Store::new(), Store::new());
//!
//! let down = normalizer.normalize(&RawEvent::pointer(PointerKind::Down, (5.0, 5.0)));
//! machine.fire(&down, &mut store, &mut state_store);
//!
//! let drag = normalizer.normalize(&RawEvent::pointer(PointerKind::Move, (20.0, 5.0)));
//! let fired: Vec<_> = machine
//!     .fire(&drag, &mut store, &mut state_store)
//!     .into_iter()
//!     .map(|f| f.name)
//!     .collect();
//! assert_eq!(fired, ["mousemove", "drag"]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod defaults;
pub mod input;
pub mod machine;
pub mod store;
