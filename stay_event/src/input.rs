// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw input and its normalized form.
//!
//! ## Overview
//!
//! Native pointer, wheel and keyboard events arrive as [`RawEvent`] values in client
//! coordinates. The [`InputNormalizer`] maps each one to a [`Trigger`] and produces an
//! [`InputSnapshot`]: the point relative to the drawing surface, the set of pressed keys,
//! the pointer button, and the wheel delta when there is one.
//!
//! The normalizer is stateful. It tracks pressed keys between key-down and key-up, and
//! remembers the last pointer position so key events carry one too.

use alloc::collections::BTreeSet;
use alloc::string::String;
use core::fmt;

use kurbo::{Point, Vec2};

/// Pointer button.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum PointerButton {
    /// Primary (usually left) button.
    #[default]
    Primary,
    /// Middle button or wheel press.
    Auxiliary,
    /// Secondary (usually right) button.
    Secondary,
}

/// Kind of a native pointer event.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PointerKind {
    /// Button pressed.
    Down,
    /// Button released.
    Up,
    /// Pointer moved.
    Move,
    /// Press and release on the same spot.
    Click,
    /// Two clicks in quick succession.
    DoubleClick,
    /// Context menu request.
    ContextMenu,
}

/// Kind of a native key event.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum KeyKind {
    /// Key pressed.
    Down,
    /// Key released.
    Up,
}

/// A native input event in client coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum RawEvent {
    /// Pointer event.
    Pointer {
        /// What happened.
        kind: PointerKind,
        /// Client position.
        position: Point,
        /// Button involved.
        button: PointerButton,
    },
    /// Wheel event.
    Wheel {
        /// Client position.
        position: Point,
        /// Scroll delta; negative `y` scrolls up.
        delta: Vec2,
    },
    /// Keyboard event.
    Key {
        /// What happened.
        kind: KeyKind,
        /// Key name, for example `"Shift"` or `"a"`.
        key: String,
    },
}

impl RawEvent {
    /// A primary-button pointer event.
    pub fn pointer(kind: PointerKind, position: impl Into<Point>) -> Self {
        Self::Pointer {
            kind,
            position: position.into(),
            button: PointerButton::Primary,
        }
    }

    /// A wheel event.
    pub fn wheel(position: impl Into<Point>, delta: impl Into<Vec2>) -> Self {
        Self::Wheel {
            position: position.into(),
            delta: delta.into(),
        }
    }

    /// A key event.
    pub fn key(kind: KeyKind, key: impl Into<String>) -> Self {
        Self::Key {
            kind,
            key: key.into(),
        }
    }

    /// The trigger this event maps to.
    pub fn trigger(&self) -> Trigger {
        match self {
            Self::Pointer { kind, .. } => match kind {
                PointerKind::Down => Trigger::MouseDown,
                PointerKind::Up => Trigger::MouseUp,
                PointerKind::Move => Trigger::MouseMove,
                PointerKind::Click => Trigger::Click,
                PointerKind::DoubleClick => Trigger::DoubleClick,
                PointerKind::ContextMenu => Trigger::ContextMenu,
            },
            Self::Wheel { .. } => Trigger::Wheel,
            Self::Key { kind: KeyKind::Down, .. } => Trigger::KeyDown,
            Self::Key { kind: KeyKind::Up, .. } => Trigger::KeyUp,
        }
    }
}

/// Uniform trigger names that event definitions bind to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Trigger {
    /// `mousedown`
    MouseDown,
    /// `mouseup`
    MouseUp,
    /// `mousemove`
    MouseMove,
    /// `wheel`
    Wheel,
    /// `click`
    Click,
    /// `dblclick`
    DoubleClick,
    /// `contextmenu`
    ContextMenu,
    /// `keydown`
    KeyDown,
    /// `keyup`
    KeyUp,
}

impl Trigger {
    /// Every trigger, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::MouseDown,
        Self::MouseUp,
        Self::MouseMove,
        Self::Wheel,
        Self::Click,
        Self::DoubleClick,
        Self::ContextMenu,
        Self::KeyDown,
        Self::KeyUp,
    ];

    /// The trigger's name.
    pub fn name(self) -> &'static str {
        match self {
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::MouseMove => "mousemove",
            Self::Wheel => "wheel",
            Self::Click => "click",
            Self::DoubleClick => "dblclick",
            Self::ContextMenu => "contextmenu",
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
        }
    }

    /// Look a trigger up by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Whether the trigger originates from a pointing device.
    ///
    /// Pointer-origin events get a hit-tested target during dispatch.
    pub fn is_pointer(self) -> bool {
        !matches!(self, Self::KeyDown | Self::KeyUp)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalized view of one input event.
#[derive(Clone, Debug, PartialEq)]
pub struct InputSnapshot {
    /// The event's trigger.
    pub trigger: Trigger,
    /// Pointer position relative to the surface. Key events carry the last known one.
    pub point: Point,
    /// Keys held down when the event happened, the event's own key included for key-down.
    pub keys: BTreeSet<String>,
    /// Pointer button, for pointer events.
    pub button: Option<PointerButton>,
    /// Wheel delta, for wheel events.
    pub wheel: Option<Vec2>,
    /// Key name, for key events.
    pub key: Option<String>,
}

impl InputSnapshot {
    /// A bare snapshot at `point`, with nothing pressed.
    pub fn new(trigger: Trigger, point: impl Into<Point>) -> Self {
        Self {
            trigger,
            point: point.into(),
            keys: BTreeSet::new(),
            button: None,
            wheel: None,
            key: None,
        }
    }

    /// Whether `key` is held.
    pub fn is_pressed(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

/// Stateful mapping from [`RawEvent`] to [`InputSnapshot`].
#[derive(Clone, Debug, Default)]
pub struct InputNormalizer {
    origin: Point,
    pressed: BTreeSet<String>,
    last_point: Point,
}

impl InputNormalizer {
    /// A normalizer for a surface whose top-left corner sits at `origin` in client space.
    pub fn new(origin: impl Into<Point>) -> Self {
        Self {
            origin: origin.into(),
            ..Self::default()
        }
    }

    /// Move the surface origin, for example after a layout change.
    pub fn set_origin(&mut self, origin: impl Into<Point>) {
        self.origin = origin.into();
    }

    /// Surface origin in client space.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Keys currently held.
    pub fn pressed(&self) -> &BTreeSet<String> {
        &self.pressed
    }

    /// Forget held keys, for example when the surface loses focus.
    pub fn reset(&mut self) {
        self.pressed.clear();
    }

    /// Normalize `event`, updating the pressed-key set and last pointer position.
    pub fn normalize(&mut self, event: &RawEvent) -> InputSnapshot {
        let trigger = event.trigger();
        let mut snapshot = InputSnapshot::new(trigger, self.last_point);
        match event {
            RawEvent::Pointer {
                position, button, ..
            } => {
                self.last_point = *position - self.origin.to_vec2();
                snapshot.point = self.last_point;
                snapshot.button = Some(*button);
            }
            RawEvent::Wheel { position, delta } => {
                self.last_point = *position - self.origin.to_vec2();
                snapshot.point = self.last_point;
                snapshot.wheel = Some(*delta);
            }
            RawEvent::Key { kind, key } => {
                match kind {
                    KeyKind::Down => {
                        self.pressed.insert(key.clone());
                    }
                    KeyKind::Up => {
                        self.pressed.remove(key);
                    }
                }
                snapshot.key = Some(key.clone());
            }
        }
        snapshot.keys = self.pressed.clone();
        snapshot
    }
}
