// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listeners and the action dispatcher.
//!
//! ## Overview
//!
//! A listener subscribes to one or more event names and is gated by a state expression.
//! For every fired event it subscribes to, the dispatcher:
//!
//! 1) checks that the current state is in the set the listener's state expression
//!    resolves to;
//! 2) for pointer-origin events, resolves a target among the nodes matching the
//!    listener's selector, using its custom condition if any and point containment
//!    otherwise, and skips the listener when nothing qualifies;
//! 3) invokes the callback with the tools, the listener's compose store and the payload;
//! 4) merges the callback's [`Compose`] update into the compose store, and logs history
//!    when the listener asks for it.
//!
//! Listeners run one at a time, in registration order. A callback sees every change made
//! by the callbacks before it in the same tick.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use hashbrown::HashMap;
use stay_event::input::{InputSnapshot, RawEvent};
use stay_event::machine::FiredEvent;
use stay_event::store::Store;
use stay_scene::{Child, ChildFlags, ChildId, SortBy};

use crate::error::StayError;
use crate::states::DEFAULT_STATE;
use crate::tools::Tools;

/// An event as handed to a listener, with its resolved target.
#[derive(Clone, Debug, PartialEq)]
pub struct EventSnapshot {
    /// Name of the fired event.
    pub name: String,
    /// Normalized input.
    pub input: InputSnapshot,
    /// Node the event was resolved to, for pointer-origin events.
    pub target: Option<ChildId>,
}

/// Everything a listener callback receives.
pub struct ActionContext<'a> {
    /// The native event, absent for synthetic dispatches without one.
    pub native: Option<&'a RawEvent>,
    /// The event being dispatched.
    pub event: &'a EventSnapshot,
    /// The tools contract.
    pub tools: &'a mut Tools,
    /// This listener's compose store.
    pub compose: &'a Store,
    /// Payload of a synthetic dispatch.
    pub payload: Option<&'a dyn Any>,
}

impl fmt::Debug for ActionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("native", &self.native)
            .field("event", &self.event)
            .field("compose", &self.compose)
            .field("payload", &self.payload.is_some())
            .finish_non_exhaustive()
    }
}

impl ActionContext<'_> {
    /// The resolved target node, if any.
    pub fn target(&self) -> Option<&Child> {
        self.event.target.as_ref().and_then(|id| self.tools.child(id))
    }

    /// The payload downcast to `T`.
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.and_then(|p| p.downcast_ref())
    }
}

type ComposeThunk = Box<dyn FnOnce(&Store) -> Store>;

/// Compose-store update returned by a callback.
///
/// Thunks are keyed by event name; only the one for the event being dispatched runs, and
/// its result is merged into the listener's compose store.
#[derive(Default)]
pub struct Compose {
    updates: Vec<(String, ComposeThunk)>,
    reset: bool,
}

impl fmt::Debug for Compose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compose")
            .field(
                "events",
                &self.updates.iter().map(|(e, _)| e.as_str()).collect::<Vec<_>>(),
            )
            .field("reset", &self.reset)
            .finish()
    }
}

impl Compose {
    /// No update.
    pub fn none() -> Self {
        Self::default()
    }

    /// When dispatching `event`, merge `update(&current)` into the compose store.
    #[must_use]
    pub fn on(
        mut self,
        event: impl Into<String>,
        update: impl FnOnce(&Store) -> Store + 'static,
    ) -> Self {
        self.updates.push((event.into(), Box::new(update)));
        self
    }

    /// Clear the compose store before merging.
    #[must_use]
    pub fn reset(mut self) -> Self {
        self.reset = true;
        self
    }

    fn apply(self, event: &str, store: &mut Store) {
        if self.reset {
            store.clear();
        }
        for (name, update) in self.updates {
            if name == event {
                let partial = update(store);
                store.merge(partial);
            }
        }
    }
}

type Callback = Box<dyn FnMut(&mut ActionContext<'_>) -> Result<Compose, StayError>>;
type TargetCondition = Box<dyn Fn(&Child, &EventSnapshot) -> bool>;

/// A state-gated, selector-scoped callback bound to event names.
pub struct ListenerDefinition {
    pub(crate) name: String,
    pub(crate) events: Vec<String>,
    pub(crate) state: String,
    pub(crate) selector: Option<String>,
    pub(crate) sort_by: Option<Box<SortBy>>,
    pub(crate) condition: Option<TargetCondition>,
    pub(crate) callback: Callback,
    pub(crate) log: bool,
}

impl fmt::Debug for ListenerDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerDefinition")
            .field("name", &self.name)
            .field("events", &self.events)
            .field("state", &self.state)
            .field("selector", &self.selector)
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

impl ListenerDefinition {
    /// A listener named `name` running `callback`.
    ///
    /// Defaults: no events (add at least one), gated on [`DEFAULT_STATE`], scoped to the
    /// root node, topmost-first order, no logging.
    pub fn new(
        name: impl Into<String>,
        callback: impl FnMut(&mut ActionContext<'_>) -> Result<Compose, StayError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            events: Vec::new(),
            state: DEFAULT_STATE.into(),
            selector: None,
            sort_by: None,
            condition: None,
            callback: Box::new(callback),
            log: false,
        }
    }

    /// Subscribe to `event`.
    #[must_use]
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.events.push(event.into());
        self
    }

    /// Subscribe to several events.
    #[must_use]
    pub fn events<S: Into<String>>(mut self, events: impl IntoIterator<Item = S>) -> Self {
        self.events.extend(events.into_iter().map(Into::into));
        self
    }

    /// Gate on a state expression.
    #[must_use]
    pub fn state(mut self, expr: impl Into<String>) -> Self {
        self.state = expr.into();
        self
    }

    /// Scope targets to nodes matching `selector`.
    #[must_use]
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Order candidate targets.
    #[must_use]
    pub fn sort_by(
        mut self,
        sort_by: impl Fn(&Child, &Child) -> core::cmp::Ordering + 'static,
    ) -> Self {
        self.sort_by = Some(Box::new(sort_by));
        self
    }

    /// Pick the first candidate satisfying `condition` instead of hit testing.
    #[must_use]
    pub fn target(mut self, condition: impl Fn(&Child, &EventSnapshot) -> bool + 'static) -> Self {
        self.condition = Some(Box::new(condition));
        self
    }

    /// Log history after every invocation.
    #[must_use]
    pub fn log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    /// Listener name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn validate(&self) -> Result<(), StayError> {
        let invalid = |reason| StayError::InvalidListener {
            name: self.name.clone(),
            reason,
        };
        if self.name.trim().is_empty() {
            return Err(invalid("the name is empty"));
        }
        if self.events.is_empty() {
            return Err(invalid("no events to listen to"));
        }
        if self.events.iter().any(|e| e.trim().is_empty()) {
            return Err(invalid("an event name is empty"));
        }
        stay_selector::validate(&self.state)?;
        if let Some(selector) = &self.selector {
            stay_selector::validate(selector)?;
        }
        Ok(())
    }
}

/// A dispatch requested from inside a callback, or from outside the input pipeline.
pub struct SyntheticAction {
    /// Native event to hand to callbacks, if any.
    pub native: Option<RawEvent>,
    /// Events to dispatch, in order.
    pub events: Vec<FiredEvent>,
    /// Arbitrary payload for the callbacks.
    pub payload: Option<Box<dyn Any>>,
}

impl fmt::Debug for SyntheticAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntheticAction")
            .field("native", &self.native)
            .field("events", &self.events)
            .field("payload", &self.payload.is_some())
            .finish()
    }
}

impl SyntheticAction {
    /// Dispatch one custom event named `name` with `input`.
    pub fn new(name: impl Into<String>, input: InputSnapshot) -> Self {
        Self {
            native: None,
            events: alloc::vec![FiredEvent {
                name: name.into(),
                input,
            }],
            payload: None,
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_payload<T: Any>(mut self, payload: T) -> Self {
        self.payload = Some(Box::new(payload));
        self
    }

    /// Attach a native event.
    #[must_use]
    pub fn with_native(mut self, native: RawEvent) -> Self {
        self.native = Some(native);
        self
    }
}

/// One callback invocation during a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// Listener name.
    pub listener: String,
    /// Event name it was invoked for.
    pub event: String,
    /// Resolved target.
    pub target: Option<ChildId>,
}

/// Registered listeners and their compose stores.
#[derive(Debug, Default)]
pub struct Dispatcher {
    listeners: Vec<ListenerDefinition>,
    compose: HashMap<String, Store>,
}

impl Dispatcher {
    /// No listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `listener`, replacing one with the same name in place.
    pub fn add(&mut self, listener: ListenerDefinition) -> Result<(), StayError> {
        listener.validate()?;
        match self.listeners.iter().position(|l| l.name == listener.name) {
            Some(pos) => self.listeners[pos] = listener,
            None => self.listeners.push(listener),
        }
        Ok(())
    }

    /// Remove the listener named `name` and its compose store.
    pub fn remove(&mut self, name: &str) -> bool {
        self.compose.remove(name);
        let before = self.listeners.len();
        self.listeners.retain(|l| l.name != name);
        self.listeners.len() != before
    }

    /// Whether a listener named `name` is installed.
    pub fn contains(&self, name: &str) -> bool {
        self.listeners.iter().any(|l| l.name == name)
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is installed.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// The compose store of the listener named `name`, once it has been invoked.
    pub fn compose_store(&self, name: &str) -> Option<&Store> {
        self.compose.get(name)
    }

    /// Dispatch `fired` to every eligible listener.
    ///
    /// A callback error aborts the dispatch and is returned as is.
    pub fn dispatch(
        &mut self,
        tools: &mut Tools,
        native: Option<&RawEvent>,
        fired: &[FiredEvent],
        payload: Option<&dyn Any>,
    ) -> Result<Vec<Invocation>, StayError> {
        let mut invocations = Vec::new();
        for listener in &mut self.listeners {
            for event in fired {
                if !listener.events.iter().any(|e| *e == event.name) {
                    continue;
                }
                match tools.states().is_active(&listener.state) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(err) => {
                        tracing::warn!(
                            listener = %listener.name,
                            error = %err,
                            "skipping listener"
                        );
                        continue;
                    }
                }
                let mut snapshot = EventSnapshot {
                    name: event.name.clone(),
                    input: event.input.clone(),
                    target: None,
                };
                if event.input.trigger.is_pointer() {
                    let Some(target) = resolve_target(tools, listener, &snapshot)? else {
                        continue;
                    };
                    snapshot.target = Some(target);
                }

                let compose = self.compose.entry(listener.name.clone()).or_default();
                let update = (listener.callback)(&mut ActionContext {
                    native,
                    event: &snapshot,
                    tools: &mut *tools,
                    compose: &*compose,
                    payload,
                })?;
                update.apply(&event.name, compose);
                tracing::trace!(
                    listener = %listener.name,
                    event = %event.name,
                    "listener invoked"
                );
                invocations.push(Invocation {
                    listener: listener.name.clone(),
                    event: event.name.clone(),
                    target: snapshot.target,
                });
                if listener.log {
                    tools.log()?;
                }
            }
        }
        Ok(invocations)
    }
}

fn resolve_target(
    tools: &Tools,
    listener: &ListenerDefinition,
    snapshot: &EventSnapshot,
) -> Result<Option<ChildId>, StayError> {
    let root_selector;
    let selector = match &listener.selector {
        Some(selector) => selector.as_str(),
        None => {
            root_selector = tools.root_selector();
            root_selector.as_str()
        }
    };
    let candidates = tools.children_by_selector(selector, listener.sort_by.as_deref())?;
    let found = match &listener.condition {
        Some(condition) => candidates.into_iter().find(|c| condition(c, snapshot)),
        None => candidates.into_iter().find(|c| {
            c.flags().contains(ChildFlags::PICKABLE) && c.contains_point(snapshot.input.point)
        }),
    };
    Ok(found.map(|c| c.id().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StayConfig;
    use alloc::rc::Rc;
    use core::cell::RefCell;
    use kurbo::{Point, Rect};
    use stay_event::input::Trigger;
    use stay_scene::{AppendChild, Shape};

    fn fired(name: &str, trigger: Trigger, point: (f64, f64)) -> FiredEvent {
        FiredEvent {
            name: name.into(),
            input: InputSnapshot::new(trigger, point),
        }
    }

    fn tools() -> Tools {
        Tools::new(&StayConfig::default().with_size(100.0, 100.0))
    }

    fn boxed(t: &mut Tools, id: &str, rect: Rect) {
        t.append_child(AppendChild::new("box", Shape::rect(rect)).with_id(id))
            .unwrap();
    }

    #[test]
    fn default_selector_targets_root() {
        let mut t = tools();
        let mut d = Dispatcher::new();
        d.add(ListenerDefinition::new("l", |_| Ok(Compose::none())).event("mousedown"))
            .unwrap();
        let inv = d
            .dispatch(&mut t, None, &[fired("mousedown", Trigger::MouseDown, (5.0, 5.0))], None)
            .unwrap();
        assert_eq!(inv.len(), 1);
        assert_eq!(inv[0].target.as_ref(), Some(t.root_id()));

        // Outside the root extent there is no target.
        let inv = d
            .dispatch(&mut t, None, &[fired("mousedown", Trigger::MouseDown, (500.0, 5.0))], None)
            .unwrap();
        assert!(inv.is_empty());
    }

    #[test]
    fn hit_test_picks_topmost_candidate() {
        let mut t = tools();
        boxed(&mut t, "a", Rect::new(0.0, 0.0, 10.0, 10.0));
        boxed(&mut t, "b", Rect::new(5.0, 5.0, 15.0, 15.0));
        let mut d = Dispatcher::new();
        d.add(
            ListenerDefinition::new("pick", |_| Ok(Compose::none()))
                .event("click")
                .selector(".box"),
        )
        .unwrap();
        let inv = d
            .dispatch(&mut t, None, &[fired("click", Trigger::Click, (7.0, 7.0))], None)
            .unwrap();
        assert_eq!(inv[0].target, Some(ChildId::from("b")));
        let inv = d
            .dispatch(&mut t, None, &[fired("click", Trigger::Click, (2.0, 2.0))], None)
            .unwrap();
        assert_eq!(inv[0].target, Some(ChildId::from("a")));
    }

    #[test]
    fn custom_condition_replaces_hit_test() {
        let mut t = tools();
        boxed(&mut t, "a", Rect::new(0.0, 0.0, 10.0, 10.0));
        boxed(&mut t, "b", Rect::new(50.0, 0.0, 60.0, 10.0));
        let mut d = Dispatcher::new();
        d.add(
            ListenerDefinition::new("near", |_| Ok(Compose::none()))
                .event("mousemove")
                .selector(".box")
                .sort_by(|x, y| x.id().cmp(y.id()))
                .target(|c, e| {
                    c.bound()
                        .is_some_and(|b| b.inflate(5.0, 5.0).contains(e.input.point))
                }),
        )
        .unwrap();
        let inv = d
            .dispatch(&mut t, None, &[fired("mousemove", Trigger::MouseMove, (47.0, 5.0))], None)
            .unwrap();
        assert_eq!(inv[0].target, Some(ChildId::from("b")));
    }

    #[test]
    fn key_events_have_no_target() {
        let mut t = tools();
        let mut d = Dispatcher::new();
        d.add(
            ListenerDefinition::new("k", |cx| {
                assert!(cx.target().is_none(), "key events are not hit tested");
                Ok(Compose::none())
            })
            .event("keydown"),
        )
        .unwrap();
        let inv = d
            .dispatch(&mut t, None, &[fired("keydown", Trigger::KeyDown, (500.0, 500.0))], None)
            .unwrap();
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn state_gate_skips_inactive_listeners() {
        let mut t = tools();
        let mut d = Dispatcher::new();
        d.add(
            ListenerDefinition::new("drawing-only", |_| Ok(Compose::none()))
                .event("keyup")
                .state("drawing"),
        )
        .unwrap();
        let events = [fired("keyup", Trigger::KeyUp, (0.0, 0.0))];
        assert!(d.dispatch(&mut t, None, &events, None).unwrap().is_empty());
        t.switch_state("drawing").unwrap();
        assert_eq!(d.dispatch(&mut t, None, &events, None).unwrap().len(), 1);
    }

    #[test]
    fn compose_updates_merge_per_event() {
        let mut t = tools();
        let mut d = Dispatcher::new();
        d.add(
            ListenerDefinition::new("gesture", |cx| {
                let point = cx.event.input.point;
                Ok(Compose::none()
                    .on("mousedown", move |_| Store::new().with("start", point))
                    .on("mousemove", move |s| {
                        let n = s.get::<u32>("moves").copied().unwrap_or(0);
                        Store::new().with("moves", n + 1)
                    }))
            })
            .events(["mousedown", "mousemove"]),
        )
        .unwrap();
        d.dispatch(&mut t, None, &[fired("mousedown", Trigger::MouseDown, (1.0, 2.0))], None)
            .unwrap();
        for _ in 0..3 {
            d.dispatch(&mut t, None, &[fired("mousemove", Trigger::MouseMove, (3.0, 3.0))], None)
                .unwrap();
        }
        let store = d.compose_store("gesture").unwrap();
        assert_eq!(store.get::<Point>("start"), Some(&Point::new(1.0, 2.0)));
        assert_eq!(store.get::<u32>("moves"), Some(&3));
    }

    #[test]
    fn compose_reset_clears_before_merge() {
        let mut t = tools();
        let mut d = Dispatcher::new();
        d.add(
            ListenerDefinition::new("r", |cx| {
                if cx.compose.contains_key("x") {
                    Ok(Compose::none().reset())
                } else {
                    Ok(Compose::none().on("keydown", |_| Store::new().with("x", 1_u8)))
                }
            })
            .event("keydown"),
        )
        .unwrap();
        let events = [fired("keydown", Trigger::KeyDown, (0.0, 0.0))];
        d.dispatch(&mut t, None, &events, None).unwrap();
        assert!(d.compose_store("r").unwrap().contains_key("x"));
        d.dispatch(&mut t, None, &events, None).unwrap();
        assert!(d.compose_store("r").unwrap().is_empty());
    }

    #[test]
    fn later_listeners_see_earlier_mutations() {
        let mut t = tools();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut d = Dispatcher::new();
        d.add(
            ListenerDefinition::new("writer", |cx| {
                cx.tools.store_mut().insert("n", 7_i32);
                Ok(Compose::none())
            })
            .event("keyup"),
        )
        .unwrap();
        let sink = Rc::clone(&seen);
        d.add(
            ListenerDefinition::new("reader", move |cx| {
                sink.borrow_mut().push(cx.tools.store().get::<i32>("n").copied());
                Ok(Compose::none())
            })
            .event("keyup"),
        )
        .unwrap();
        d.dispatch(&mut t, None, &[fired("keyup", Trigger::KeyUp, (0.0, 0.0))], None)
            .unwrap();
        assert_eq!(*seen.borrow(), [Some(7)]);
    }

    #[test]
    fn callback_errors_abort_dispatch() {
        let mut t = tools();
        let mut d = Dispatcher::new();
        d.add(
            ListenerDefinition::new("bad", |cx| {
                let root = cx.tools.root_id().clone();
                cx.tools.remove_child(&root)?;
                Ok(Compose::none())
            })
            .event("keyup"),
        )
        .unwrap();
        let err = d
            .dispatch(&mut t, None, &[fired("keyup", Trigger::KeyUp, (0.0, 0.0))], None)
            .unwrap_err();
        assert!(matches!(err, StayError::Scene(_)));
    }

    #[test]
    fn log_flag_records_history() {
        let mut t = tools();
        let mut d = Dispatcher::new();
        d.add(
            ListenerDefinition::new("add", |cx| {
                cx.tools
                    .append_child(AppendChild::new("dot", Shape::circle((1.0, 1.0), 1.0)))?;
                Ok(Compose::none())
            })
            .event("keydown")
            .log(true),
        )
        .unwrap();
        d.dispatch(&mut t, None, &[fired("keydown", Trigger::KeyDown, (0.0, 0.0))], None)
            .unwrap();
        assert!(t.can_undo());
    }

    #[test]
    fn invalid_listeners_are_rejected() {
        fn noop(_: &mut ActionContext<'_>) -> Result<Compose, StayError> {
            Ok(Compose::none())
        }
        let mut d = Dispatcher::new();
        assert!(matches!(
            d.add(ListenerDefinition::new("", noop).event("click")),
            Err(StayError::InvalidListener { .. })
        ));
        assert!(matches!(
            d.add(ListenerDefinition::new("x", noop)),
            Err(StayError::InvalidListener { .. })
        ));
        assert!(matches!(
            d.add(ListenerDefinition::new("x", noop).event("click").state("a &")),
            Err(StayError::Selector(_))
        ));
        assert!(d.is_empty());
    }

    #[test]
    fn payload_downcasts() {
        let mut t = tools();
        let mut d = Dispatcher::new();
        d.add(
            ListenerDefinition::new("p", |cx| {
                assert_eq!(cx.payload::<u32>(), Some(&42));
                Ok(Compose::none())
            })
            .event("custom"),
        )
        .unwrap();
        let inv = d
            .dispatch(
                &mut t,
                None,
                &[fired("custom", Trigger::KeyUp, (0.0, 0.0))],
                Some(&42_u32),
            )
            .unwrap();
        assert_eq!(inv.len(), 1);
    }
}
