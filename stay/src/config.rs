// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration for the [`Stay`](crate::Stay) controller.

use alloc::string::String;

use kurbo::{Point, Rect};

/// Controller configuration.
///
/// ```
/// use stay::StayConfig;
///
/// let config = StayConfig::default()
///     .with_size(1024.0, 768.0)
///     .with_layers(3)
///     .with_root("canvas", "canvas");
/// assert_eq!(config.extent().width(), 1024.0);
/// assert_eq!(config.layers, 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct StayConfig {
    /// Surface width; the root node spans it.
    pub width: f64,
    /// Surface height; the root node spans it.
    pub height: f64,
    /// Number of paint layers. The top one is the draw partition when there are two or
    /// more.
    pub layers: usize,
    /// Id of the root node.
    pub root_id: String,
    /// Class name of the root node, and the default listener selector.
    pub root_class: String,
    /// Top-left corner of the surface in client coordinates.
    pub surface_origin: Point,
    /// Whether to arm the default event catalog.
    pub default_events: bool,
}

impl Default for StayConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            layers: 2,
            root_id: "stay-root".into(),
            root_class: "stay-root".into(),
            surface_origin: Point::ZERO,
            default_events: true,
        }
    }
}

impl StayConfig {
    /// Set the surface size.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the number of paint layers; at least one is kept.
    #[must_use]
    pub fn with_layers(mut self, layers: usize) -> Self {
        self.layers = layers.max(1);
        self
    }

    /// Set the root node's id and class name.
    #[must_use]
    pub fn with_root(mut self, id: impl Into<String>, class: impl Into<String>) -> Self {
        self.root_id = id.into();
        self.root_class = class.into();
        self
    }

    /// Set the surface origin in client coordinates.
    #[must_use]
    pub fn with_surface_origin(mut self, origin: impl Into<Point>) -> Self {
        self.surface_origin = origin.into();
        self
    }

    /// Arm the default event catalog or not.
    #[must_use]
    pub fn with_default_events(mut self, enabled: bool) -> Self {
        self.default_events = enabled;
        self
    }

    /// The root extent in surface coordinates.
    pub fn extent(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}
