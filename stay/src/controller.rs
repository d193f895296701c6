// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;

use stay_event::defaults::default_events;
use stay_event::input::{InputNormalizer, RawEvent};
use stay_event::machine::{EventDefinition, EventMachine, FiredEvent};
use stay_scene::{Frame, Surface};

use crate::action::{Dispatcher, Invocation, ListenerDefinition, SyntheticAction};
use crate::config::StayConfig;
use crate::error::StayError;
use crate::tools::Tools;

/// Upper bound on synthetic dispatch rounds per tick.
///
/// A listener that keeps queueing actions from its own synthetic dispatch would otherwise
/// never settle; whatever is still queued after this many rounds is dropped.
pub const MAX_SYNTHETIC_ROUNDS: usize = 16;

/// What one tick did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tick {
    /// Names of the dispatched events, native ones first, then synthetic ones.
    pub fired: Vec<String>,
    /// Listener invocations in call order.
    pub invocations: Vec<Invocation>,
}

impl Tick {
    /// Whether `event` was dispatched.
    pub fn fired(&self, event: &str) -> bool {
        self.fired.iter().any(|e| e == event)
    }

    /// Number of times the listener named `listener` was invoked.
    pub fn invoked(&self, listener: &str) -> usize {
        self.invocations
            .iter()
            .filter(|i| i.listener == listener)
            .count()
    }
}

/// The controller: normalizer, event machine, dispatcher and tools.
///
/// ```
/// use stay::{AppendChild, Compose, ListenerDefinition, Shape, Stay, StayConfig};
/// use stay::input::{PointerKind, RawEvent};
///
/// let mut stay = Stay::new(StayConfig::default());
/// stay.add_event_listener(
///     ListenerDefinition::new("add-dot", |cx| {
///         let p = cx.event.input.point;
///         cx.tools
///             .append_child(AppendChild::new("dot", Shape::circle(p, 3.0)))?;
///         Ok(Compose::none())
///     })
///     .event("click")
///     .log(true),
/// )
/// .unwrap();
///
/// let tick = stay.handle(&RawEvent::pointer(PointerKind::Click, (40.0, 40.0))).unwrap();
/// assert_eq!(tick.invoked("add-dot"), 1);
/// assert_eq!(stay.tools().children_by_selector(".dot", None).unwrap().len(), 1);
///
/// stay.tools_mut().undo();
/// assert!(stay.tools().children_by_selector(".dot", None).unwrap().is_empty());
/// ```
#[derive(Debug)]
pub struct Stay {
    tools: Tools,
    machine: EventMachine,
    normalizer: InputNormalizer,
    dispatcher: Dispatcher,
    config: StayConfig,
}

impl Stay {
    /// A controller over a fresh scene built from `config`.
    pub fn new(config: StayConfig) -> Self {
        let mut machine = EventMachine::new();
        if config.default_events {
            for event in default_events() {
                machine.register(event);
            }
        }
        Self {
            tools: Tools::new(&config),
            machine,
            normalizer: InputNormalizer::new(config.surface_origin),
            dispatcher: Dispatcher::new(),
            config,
        }
    }

    /// The configuration this controller was built from.
    pub fn config(&self) -> &StayConfig {
        &self.config
    }

    /// The tools contract.
    pub fn tools(&self) -> &Tools {
        &self.tools
    }

    /// Mutable access to the tools contract.
    pub fn tools_mut(&mut self) -> &mut Tools {
        &mut self.tools
    }

    // --- events ---

    /// Arm `definition`, replacing an armed one with the same name.
    ///
    /// Returns the replaced definition.
    pub fn register_event(
        &mut self,
        definition: EventDefinition,
    ) -> Result<Option<EventDefinition>, StayError> {
        let name = definition.name();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(StayError::InvalidEvent {
                name: name.into(),
                reason: "names must be non-empty and free of whitespace",
            });
        }
        Ok(self.machine.register(definition))
    }

    /// Disarm the event named `name`.
    pub fn delete_event(&mut self, name: &str) -> Option<EventDefinition> {
        self.machine.delete(name)
    }

    /// Whether an event named `name` is armed.
    pub fn is_event_armed(&self, name: &str) -> bool {
        self.machine.is_armed(name)
    }

    /// The event machine.
    pub fn events(&self) -> &EventMachine {
        &self.machine
    }

    // --- listeners ---

    /// Install `listener`, replacing one with the same name.
    pub fn add_event_listener(&mut self, listener: ListenerDefinition) -> Result<(), StayError> {
        self.dispatcher.add(listener)
    }

    /// Remove the listener named `name` together with its compose store.
    pub fn delete_listener(&mut self, name: &str) -> bool {
        self.dispatcher.remove(name)
    }

    /// The dispatcher.
    pub fn listeners(&self) -> &Dispatcher {
        &self.dispatcher
    }

    // --- input ---

    /// Run one tick for `event`: normalize, fire, dispatch, then drain synthetic actions.
    ///
    /// A listener error aborts the tick and discards every synthetic action still queued.
    /// Changes made before it stay in place, unlogged.
    pub fn handle(&mut self, event: &RawEvent) -> Result<Tick, StayError> {
        let input = self.normalizer.normalize(event);
        let (store, state_store) = self.tools.stores_mut();
        let fired = self.machine.fire(&input, store, state_store);

        let mut tick = Tick {
            fired: fired.iter().map(|f| f.name.clone()).collect(),
            invocations: Vec::new(),
        };
        self.settle(Some(event), &fired, &mut tick)?;
        Ok(tick)
    }

    /// Dispatch `action` directly, bypassing the event machine.
    ///
    /// Errors are handled as in [`handle`](Self::handle).
    pub fn trigger_action(&mut self, action: SyntheticAction) -> Result<Tick, StayError> {
        self.tools.trigger_action(action);
        let mut tick = Tick::default();
        self.settle(None, &[], &mut tick)?;
        Ok(tick)
    }

    /// Move the surface origin used to map client coordinates.
    pub fn set_surface_origin(&mut self, origin: impl Into<kurbo::Point>) {
        self.normalizer.set_origin(origin);
    }

    /// Forget held keys, for example when the surface loses focus.
    pub fn reset_input(&mut self) {
        self.normalizer.reset();
    }

    // --- rendering ---

    /// Repaint dirty layers onto `surface`.
    pub fn render(&mut self, surface: &mut impl Surface) -> Frame {
        self.tools.render(surface)
    }

    /// Dispatch `fired`, then drain synthetic actions. On error the queue is emptied.
    fn settle(
        &mut self,
        native: Option<&RawEvent>,
        fired: &[FiredEvent],
        tick: &mut Tick,
    ) -> Result<(), StayError> {
        let result = self.dispatch_fired(native, fired, tick);
        if result.is_err() {
            let dropped = self.tools.take_queued().len();
            if dropped > 0 {
                tracing::debug!(dropped, "tick failed, discarding queued synthetic actions");
            }
        }
        result
    }

    fn dispatch_fired(
        &mut self,
        native: Option<&RawEvent>,
        fired: &[FiredEvent],
        tick: &mut Tick,
    ) -> Result<(), StayError> {
        if !fired.is_empty() {
            let invocations = self
                .dispatcher
                .dispatch(&mut self.tools, native, fired, None)?;
            tick.invocations.extend(invocations);
        }
        self.drain(tick)
    }

    fn drain(&mut self, tick: &mut Tick) -> Result<(), StayError> {
        for _ in 0..MAX_SYNTHETIC_ROUNDS {
            let queued = self.tools.take_queued();
            if queued.is_empty() {
                return Ok(());
            }
            for action in queued {
                tick.fired.extend(action.events.iter().map(|f| f.name.clone()));
                let invocations = self.dispatcher.dispatch(
                    &mut self.tools,
                    action.native.as_ref(),
                    &action.events,
                    action.payload.as_deref(),
                )?;
                tick.invocations.extend(invocations);
            }
        }
        let dropped = self.tools.take_queued().len();
        if dropped > 0 {
            tracing::warn!(
                dropped,
                rounds = MAX_SYNTHETIC_ROUNDS,
                "synthetic actions did not settle, dropping the rest"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Compose;
    use stay_event::input::{InputSnapshot, KeyKind, PointerKind, Trigger};

    fn stay() -> Stay {
        Stay::new(StayConfig::default().with_size(100.0, 100.0))
    }

    #[test]
    fn default_catalog_is_armed() {
        let s = stay();
        for name in ["mousedown", "keyup", "zoomin", "dragstart"] {
            assert!(s.is_event_armed(name), "{name} should be armed");
        }
        assert!(!s.is_event_armed("drag"));

        let bare = Stay::new(StayConfig::default().with_default_events(false));
        assert!(bare.events().is_empty());
    }

    #[test]
    fn event_names_are_validated() {
        let mut s = stay();
        assert!(matches!(
            s.register_event(EventDefinition::new("two words", Trigger::Click)),
            Err(StayError::InvalidEvent { .. })
        ));
        assert!(s
            .register_event(EventDefinition::new("tap", Trigger::Click))
            .unwrap()
            .is_none());
        assert!(s.delete_event("tap").is_some());
    }

    #[test]
    fn surface_origin_offsets_points() {
        let mut s = Stay::new(StayConfig::default().with_surface_origin((10.0, 20.0)));
        s.add_event_listener(
            ListenerDefinition::new("where", |cx| {
                cx.tools.store_mut().insert("at", cx.event.input.point);
                Ok(Compose::none())
            })
            .event("mousedown"),
        )
        .unwrap();
        s.handle(&RawEvent::pointer(PointerKind::Down, (15.0, 25.0)))
            .unwrap();
        assert_eq!(
            s.tools().store().get::<kurbo::Point>("at"),
            Some(&kurbo::Point::new(5.0, 5.0))
        );
    }

    #[test]
    fn synthetic_actions_run_in_the_same_tick() {
        let mut s = stay();
        s.add_event_listener(
            ListenerDefinition::new("relay", |cx| {
                let input = cx.event.input.clone();
                cx.tools
                    .trigger_action(SyntheticAction::new("relayed", input).with_payload(3_u8));
                Ok(Compose::none())
            })
            .event("keydown"),
        )
        .unwrap();
        s.add_event_listener(
            ListenerDefinition::new("sink", |cx| {
                let n = cx.payload::<u8>().copied().unwrap_or(0);
                cx.tools.store_mut().insert("n", n);
                Ok(Compose::none())
            })
            .event("relayed"),
        )
        .unwrap();
        let tick = s.handle(&RawEvent::key(KeyKind::Down, "r")).unwrap();
        assert!(tick.fired("keydown"));
        assert!(tick.fired("relayed"));
        assert_eq!(tick.invoked("sink"), 1);
        assert_eq!(s.tools().store().get::<u8>("n"), Some(&3));
    }

    #[test]
    fn runaway_synthetic_actions_are_bounded() {
        let mut s = stay();
        s.add_event_listener(
            ListenerDefinition::new("echo", |cx| {
                let input = cx.event.input.clone();
                cx.tools.trigger_action(SyntheticAction::new("echo", input));
                Ok(Compose::none())
            })
            .event("echo"),
        )
        .unwrap();
        let tick = s
            .trigger_action(SyntheticAction::new(
                "echo",
                InputSnapshot::new(Trigger::KeyUp, (0.0, 0.0)),
            ))
            .unwrap();
        assert_eq!(tick.invoked("echo"), MAX_SYNTHETIC_ROUNDS);
        assert!(s.tools_mut().take_queued().is_empty());
    }

    #[test]
    fn listener_errors_surface_from_handle() {
        let mut s = stay();
        s.add_event_listener(
            ListenerDefinition::new("boom", |cx| {
                cx.tools.switch_state("all-states")?;
                Ok(Compose::none())
            })
            .event("keyup"),
        )
        .unwrap();
        let err = s.handle(&RawEvent::key(KeyKind::Up, "x")).unwrap_err();
        assert_eq!(err, StayError::ReservedStateName("all-states".into()));
    }

    #[test]
    fn deleted_listeners_stop_firing() {
        let mut s = stay();
        s.add_event_listener(
            ListenerDefinition::new("l", |_| Ok(Compose::none())).event("keyup"),
        )
        .unwrap();
        assert!(s.delete_listener("l"));
        assert!(!s.delete_listener("l"));
        let tick = s.handle(&RawEvent::key(KeyKind::Up, "x")).unwrap();
        assert!(tick.invocations.is_empty());
    }
}
