// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The default event catalog.
//!
//! One always-firing event per trigger, named after the trigger (`mousedown`, `wheel`,
//! `keyup`, ...), plus:
//!
//! - `zoomin` / `zoomout`: wheel with a negative / positive vertical delta.
//! - `dragstart`: primary button down. Sets the [`DRAGGING`] flag and arms `drag`
//!   (pointer move while dragging) and `dragend` (button up).
//! - `dragend` clears the flag and disarms `drag` and itself.

use alloc::vec::Vec;

use crate::input::{PointerButton, Trigger};
use crate::machine::{Chain, EventDefinition};

/// Store key of the flag set between `dragstart` and `dragend`.
pub const DRAGGING: &str = "dragging";

/// Name of the drag-start event.
pub const DRAG_START: &str = "dragstart";
/// Name of the drag event.
pub const DRAG: &str = "drag";
/// Name of the drag-end event.
pub const DRAG_END: &str = "dragend";
/// Name of the wheel-up event.
pub const ZOOM_IN: &str = "zoomin";
/// Name of the wheel-down event.
pub const ZOOM_OUT: &str = "zoomout";

/// The full default catalog, in registration order.
pub fn default_events() -> Vec<EventDefinition> {
    let mut events: Vec<EventDefinition> = Trigger::ALL
        .into_iter()
        .map(|t| EventDefinition::new(t.name(), t))
        .collect();
    events.push(
        EventDefinition::new(ZOOM_IN, Trigger::Wheel)
            .guard(|cx| cx.input.wheel.is_some_and(|d| d.y < 0.0)),
    );
    events.push(
        EventDefinition::new(ZOOM_OUT, Trigger::Wheel)
            .guard(|cx| cx.input.wheel.is_some_and(|d| d.y > 0.0)),
    );
    events.push(drag_start());
    events
}

/// `dragstart`: arms the rest of the drag chain.
pub fn drag_start() -> EventDefinition {
    EventDefinition::new(DRAG_START, Trigger::MouseDown)
        .guard(|cx| cx.input.button == Some(PointerButton::Primary))
        .on_success(|cx| {
            cx.store.insert(DRAGGING, true);
            Chain::new().arm(drag()).arm(drag_end())
        })
}

/// `drag`: pointer moves while the drag flag is set.
pub fn drag() -> EventDefinition {
    EventDefinition::new(DRAG, Trigger::MouseMove).guard(|cx| cx.store.flag(DRAGGING))
}

/// `dragend`: button up; tears the chain down.
pub fn drag_end() -> EventDefinition {
    EventDefinition::new(DRAG_END, Trigger::MouseUp).on_success(|cx| {
        cx.store.remove(DRAGGING);
        Chain::new().disarm(DRAG).disarm(DRAG_END)
    })
}
