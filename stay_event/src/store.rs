// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A string-keyed store of heterogeneous values.

use alloc::boxed::Box;
use alloc::string::String;
use core::any::Any;
use core::fmt;

use hashbrown::HashMap;

/// String-keyed map of typed values.
///
/// Used for the persistent input store, the per-state store and per-listener compose
/// stores. Values are looked up by key and downcast to the requested type; a lookup with
/// the wrong type behaves like a missing key.
#[derive(Default)]
pub struct Store {
    values: HashMap<String, Box<dyn Any>>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

impl Store {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key`, replacing any previous value.
    pub fn insert<T: Any>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with<T: Any>(mut self, key: impl Into<String>, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// The value under `key`, if it has type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref())
    }

    /// Mutable access to the value under `key`, if it has type `T`.
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key).and_then(|v| v.downcast_mut())
    }

    /// Copy out a `bool` flag; missing or mistyped keys read as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.get::<bool>(key).copied().unwrap_or(false)
    }

    /// Remove the value under `key`, returning whether one existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Whether any value is stored under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Move every entry of `other` into `self`, overwriting equal keys.
    pub fn merge(&mut self, other: Self) {
        self.values.extend(other.values);
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
