// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The event state machine.
//!
//! ## Overview
//!
//! Each [`EventDefinition`] is either armed (registered in the [`EventMachine`]) or
//! inactive. When a normalized input arrives, every armed definition bound to its trigger
//! is evaluated in registration order: if the guard passes, the definition fires and its
//! success hook runs.
//!
//! ## Chains
//!
//! A success hook returns a [`Chain`]: definitions to arm and names to disarm. This is how
//! multi-step gestures are built, for example `dragstart` arming `drag` and `dragend`,
//! and `dragend` disarming both.
//!
//! - Disarms apply immediately. A definition disarmed earlier in the tick is not evaluated.
//! - Arms are deferred to the end of the tick. A definition armed during this tick is first
//!   evaluated on the next input.
//! - Definitions never expire on their own.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::input::{InputSnapshot, Trigger};
use crate::store::Store;

/// Read-only view handed to guards.
#[derive(Debug)]
pub struct GuardContext<'a> {
    /// The normalized input.
    pub input: &'a InputSnapshot,
    /// Store persisting across ticks and states.
    pub store: &'a Store,
    /// Store cleared on every state switch.
    pub state_store: &'a Store,
}

/// Mutable view handed to success hooks.
#[derive(Debug)]
pub struct SuccessContext<'a> {
    /// The normalized input.
    pub input: &'a InputSnapshot,
    /// Store persisting across ticks and states.
    pub store: &'a mut Store,
    /// Store cleared on every state switch.
    pub state_store: &'a mut Store,
}

type Guard = Box<dyn Fn(&GuardContext<'_>) -> bool>;
type OnSuccess = Box<dyn FnMut(&mut SuccessContext<'_>) -> Chain>;

/// A named, guarded, chainable event.
pub struct EventDefinition {
    name: String,
    trigger: Trigger,
    guard: Guard,
    on_success: Option<OnSuccess>,
}

impl fmt::Debug for EventDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDefinition")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .field("chains", &self.on_success.is_some())
            .finish_non_exhaustive()
    }
}

impl EventDefinition {
    /// An event named `name` that fires on every `trigger`.
    pub fn new(name: impl Into<String>, trigger: Trigger) -> Self {
        Self {
            name: name.into(),
            trigger,
            guard: Box::new(|_| true),
            on_success: None,
        }
    }

    /// Only fire when `guard` passes.
    #[must_use]
    pub fn guard(mut self, guard: impl Fn(&GuardContext<'_>) -> bool + 'static) -> Self {
        self.guard = Box::new(guard);
        self
    }

    /// Run `hook` after firing; its [`Chain`] arms and disarms definitions.
    #[must_use]
    pub fn on_success(mut self, hook: impl FnMut(&mut SuccessContext<'_>) -> Chain + 'static) -> Self {
        self.on_success = Some(Box::new(hook));
        self
    }

    /// Unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trigger the event is bound to.
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }
}

/// Arm/disarm instructions returned by a success hook.
#[derive(Debug, Default)]
pub struct Chain {
    /// Definitions to arm at the end of the tick.
    pub arm: Vec<EventDefinition>,
    /// Names to disarm immediately.
    pub disarm: Vec<String>,
}

impl Chain {
    /// No follow-up.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `definition` at the end of the tick.
    #[must_use]
    pub fn arm(mut self, definition: EventDefinition) -> Self {
        self.arm.push(definition);
        self
    }

    /// Disarm `name` now.
    #[must_use]
    pub fn disarm(mut self, name: impl Into<String>) -> Self {
        self.disarm.push(name.into());
        self
    }
}

/// An event that fired during a tick, with the input it fired on.
#[derive(Clone, Debug, PartialEq)]
pub struct FiredEvent {
    /// Name of the definition.
    pub name: String,
    /// Normalized input.
    pub input: InputSnapshot,
}

/// Registry of armed event definitions.
#[derive(Debug, Default)]
pub struct EventMachine {
    events: Vec<EventDefinition>,
}

impl EventMachine {
    /// A machine with nothing armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `definition`. A definition with the same name is replaced in place and
    /// returned.
    pub fn register(&mut self, definition: EventDefinition) -> Option<EventDefinition> {
        tracing::trace!(name = %definition.name, trigger = %definition.trigger, "arm event");
        match self.events.iter().position(|e| e.name == definition.name) {
            Some(pos) => Some(core::mem::replace(&mut self.events[pos], definition)),
            None => {
                self.events.push(definition);
                None
            }
        }
    }

    /// Disarm the definition named `name`, returning it.
    pub fn delete(&mut self, name: &str) -> Option<EventDefinition> {
        let pos = self.events.iter().position(|e| e.name == name)?;
        tracing::trace!(name, "disarm event");
        Some(self.events.remove(pos))
    }

    /// Whether a definition named `name` is armed.
    pub fn is_armed(&self, name: &str) -> bool {
        self.events.iter().any(|e| e.name == name)
    }

    /// Names of armed definitions, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.events.iter().map(|e| e.name.as_str())
    }

    /// Number of armed definitions.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing is armed.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Evaluate every armed definition bound to `input.trigger`, in registration order.
    ///
    /// Returns the events that fired, in firing order.
    pub fn fire(
        &mut self,
        input: &InputSnapshot,
        store: &mut Store,
        state_store: &mut Store,
    ) -> Vec<FiredEvent> {
        let mut fired = Vec::new();
        let mut deferred: Vec<EventDefinition> = Vec::new();
        let mut i = 0;
        while i < self.events.len() {
            let def = &mut self.events[i];
            if def.trigger != input.trigger {
                i += 1;
                continue;
            }
            let passes = (def.guard)(&GuardContext {
                input,
                store,
                state_store,
            });
            if !passes {
                i += 1;
                continue;
            }
            fired.push(FiredEvent {
                name: def.name.clone(),
                input: input.clone(),
            });
            let chain = match def.on_success.as_mut() {
                Some(hook) => hook(&mut SuccessContext {
                    input,
                    store,
                    state_store,
                }),
                None => Chain::default(),
            };
            deferred.extend(chain.arm);

            let mut shifted = 0;
            for name in chain.disarm {
                deferred.retain(|d| d.name != name);
                if let Some(pos) = self.events.iter().position(|e| e.name == name) {
                    tracing::trace!(name = %name, "disarm event");
                    self.events.remove(pos);
                    if pos <= i {
                        shifted += 1;
                    }
                }
            }
            i = i + 1 - shifted;
        }
        for definition in deferred {
            self.register(definition);
        }
        if !fired.is_empty() {
            tracing::trace!(
                trigger = %input.trigger,
                fired = fired.len(),
                "events fired"
            );
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(fired: &[FiredEvent]) -> Vec<&str> {
        fired.iter().map(|f| f.name.as_str()).collect()
    }

    fn tick(m: &mut EventMachine, trigger: Trigger) -> Vec<FiredEvent> {
        let mut store = Store::new();
        let mut state_store = Store::new();
        m.fire(&InputSnapshot::new(trigger, (0.0, 0.0)), &mut store, &mut state_store)
    }

    #[test]
    fn fires_matching_triggers_in_registration_order() {
        let mut m = EventMachine::new();
        m.register(EventDefinition::new("b", Trigger::MouseDown));
        m.register(EventDefinition::new("a", Trigger::MouseDown));
        m.register(EventDefinition::new("up", Trigger::MouseUp));
        let fired = tick(&mut m, Trigger::MouseDown);
        assert_eq!(names(&fired), ["b", "a"]);
    }

    #[test]
    fn guard_reads_stores() {
        let mut m = EventMachine::new();
        m.register(
            EventDefinition::new("guarded", Trigger::MouseMove)
                .guard(|cx| cx.store.flag("on") && !cx.state_store.flag("off")),
        );
        let input = InputSnapshot::new(Trigger::MouseMove, (0.0, 0.0));
        let mut store = Store::new();
        let mut state_store = Store::new();
        assert!(m.fire(&input, &mut store, &mut state_store).is_empty());
        store.insert("on", true);
        assert_eq!(m.fire(&input, &mut store, &mut state_store).len(), 1);
        state_store.insert("off", true);
        assert!(m.fire(&input, &mut store, &mut state_store).is_empty());
    }

    #[test]
    fn register_replaces_in_place() {
        let mut m = EventMachine::new();
        m.register(EventDefinition::new("a", Trigger::Click));
        m.register(EventDefinition::new("b", Trigger::Click));
        let old = m.register(EventDefinition::new("a", Trigger::KeyUp));
        assert_eq!(old.map(|d| d.trigger()), Some(Trigger::Click));
        assert_eq!(m.names().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(names(&tick(&mut m, Trigger::Click)), ["b"]);
    }

    #[test]
    fn arms_are_deferred_to_next_tick() {
        let mut m = EventMachine::new();
        m.register(
            EventDefinition::new("first", Trigger::MouseDown)
                .on_success(|_| Chain::new().arm(EventDefinition::new("second", Trigger::MouseDown))),
        );
        assert_eq!(names(&tick(&mut m, Trigger::MouseDown)), ["first"]);
        assert!(m.is_armed("second"));
        assert_eq!(names(&tick(&mut m, Trigger::MouseDown)), ["first", "second"]);
    }

    #[test]
    fn disarms_apply_within_the_tick() {
        let mut m = EventMachine::new();
        m.register(
            EventDefinition::new("killer", Trigger::KeyDown)
                .on_success(|_| Chain::new().disarm("victim").disarm("killer")),
        );
        m.register(EventDefinition::new("victim", Trigger::KeyDown));
        m.register(EventDefinition::new("survivor", Trigger::KeyDown));
        assert_eq!(names(&tick(&mut m, Trigger::KeyDown)), ["killer", "survivor"]);
        assert_eq!(m.names().collect::<Vec<_>>(), ["survivor"]);
    }

    #[test]
    fn success_hook_mutates_stores() {
        let mut m = EventMachine::new();
        m.register(EventDefinition::new("set", Trigger::Click).on_success(|cx| {
            cx.store.insert("clicked", true);
            cx.state_store.insert("point", cx.input.point);
            Chain::new()
        }));
        let mut store = Store::new();
        let mut state_store = Store::new();
        m.fire(
            &InputSnapshot::new(Trigger::Click, (3.0, 4.0)),
            &mut store,
            &mut state_store,
        );
        assert!(store.flag("clicked"));
        assert_eq!(
            state_store.get::<kurbo::Point>("point"),
            Some(&kurbo::Point::new(3.0, 4.0))
        );
    }

    #[test]
    fn delete_disarms() {
        let mut m = EventMachine::new();
        m.register(EventDefinition::new("a", Trigger::Click));
        assert!(m.delete("a").is_some());
        assert!(m.delete("a").is_none());
        assert!(m.is_empty());
        assert!(tick(&mut m, Trigger::Click).is_empty());
    }
}
