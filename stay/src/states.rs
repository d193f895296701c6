// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interaction states and state expressions.
//!
//! A state is a named interaction mode such as `default-state` or `annotationSelected`.
//! Listeners are gated by a state expression in the selector algebra: each operand is a
//! state name, and the reserved [`ALL_STATES`] operand stands for every known state.
//! Unknown names resolve to the empty set.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use stay_selector::SelectorError;

use crate::error::StayError;

/// The state the controller starts in, and the default listener gate.
pub const DEFAULT_STATE: &str = "default-state";

/// Reserved operand resolving to every known state.
pub const ALL_STATES: &str = "all-states";

/// The known state names and the current one.
#[derive(Clone, Debug)]
pub struct StateSet {
    known: Vec<String>,
    current: String,
}

impl Default for StateSet {
    fn default() -> Self {
        Self {
            known: alloc::vec![DEFAULT_STATE.to_string()],
            current: DEFAULT_STATE.to_string(),
        }
    }
}

impl StateSet {
    /// A set knowing only [`DEFAULT_STATE`], which is current.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that `name` can be used as a state.
    pub fn validate_name(name: &str) -> Result<(), StayError> {
        if name == ALL_STATES {
            return Err(StayError::ReservedStateName(name.into()));
        }
        if name.is_empty()
            || name.chars().any(char::is_whitespace)
            || stay_selector::contains_operator(name)
        {
            return Err(StayError::InvalidStateName(name.into()));
        }
        Ok(())
    }

    /// The current state.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Known states in registration order.
    pub fn known(&self) -> &[String] {
        &self.known
    }

    /// Whether `name` has been registered.
    pub fn contains(&self, name: &str) -> bool {
        self.known.iter().any(|s| s == name)
    }

    /// Validate `name`, register it if new and make it current.
    pub fn switch(&mut self, name: &str) -> Result<(), StayError> {
        Self::validate_name(name)?;
        self.enter(name);
        Ok(())
    }

    /// Make `name` current without validation, registering it if new.
    pub(crate) fn enter(&mut self, name: &str) {
        if !self.contains(name) {
            self.known.push(name.into());
        }
        self.current = name.into();
    }

    /// Resolve a state expression to the matching known states, in registration order.
    ///
    /// ```
    /// use stay::states::{StateSet, DEFAULT_STATE};
    ///
    /// let mut states = StateSet::new();
    /// states.switch("drawing").unwrap();
    /// assert_eq!(states.resolve("all-states & !drawing").unwrap(), [DEFAULT_STATE]);
    /// assert!(states.resolve("nowhere").unwrap().is_empty());
    /// ```
    pub fn resolve(&self, expr: &str) -> Result<Vec<String>, SelectorError> {
        stay_selector::evaluate(expr, &self.known, |token| {
            if token == ALL_STATES {
                self.known.clone()
            } else if self.contains(token) {
                alloc::vec![token.to_string()]
            } else {
                Vec::new()
            }
        })
    }

    /// Whether the current state is in the set `expr` resolves to.
    pub fn is_active(&self, expr: &str) -> Result<bool, SelectorError> {
        Ok(self.resolve(expr)?.iter().any(|s| *s == self.current))
    }
}
