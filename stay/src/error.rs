// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors surfaced by the controller and the tools contract.

use alloc::string::String;
use core::fmt;

use stay_scene::SceneError;
use stay_selector::SelectorError;

/// Faults raised by the controller.
///
/// All of these are caller mistakes. They are returned from the call that caused them and
/// never retried.
#[derive(Clone, Debug, PartialEq)]
pub enum StayError {
    /// A registry, diff or history fault.
    Scene(SceneError),
    /// A malformed state or node selector.
    Selector(SelectorError),
    /// A state name that is empty, or contains whitespace or operator characters.
    InvalidStateName(String),
    /// A state name that collides with a reserved token.
    ReservedStateName(String),
    /// A listener definition that cannot be installed.
    InvalidListener {
        /// Listener name as given.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// An event definition that cannot be registered.
    InvalidEvent {
        /// Event name as given.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}

impl fmt::Display for StayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scene(err) => err.fmt(f),
            Self::Selector(err) => err.fmt(f),
            Self::InvalidStateName(name) => write!(
                f,
                "invalid state name `{name}`: names must be non-empty and free of whitespace and selector operators"
            ),
            Self::ReservedStateName(name) => write!(f, "`{name}` is a reserved state name"),
            Self::InvalidListener { name, reason } => {
                write!(f, "invalid listener `{name}`: {reason}")
            }
            Self::InvalidEvent { name, reason } => write!(f, "invalid event `{name}`: {reason}"),
        }
    }
}

impl core::error::Error for StayError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Scene(err) => Some(err),
            Self::Selector(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SceneError> for StayError {
    fn from(err: SceneError) -> Self {
        match err {
            // Keep selector faults in one place regardless of which layer parsed them.
            SceneError::Selector(err) => Self::Selector(err),
            other => Self::Scene(other),
        }
    }
}

impl From<SelectorError> for StayError {
    fn from(err: SelectorError) -> Self {
        Self::Selector(err)
    }
}
