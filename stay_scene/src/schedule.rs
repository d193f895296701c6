// Copyright 2025 the Stay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render pass and completion signals.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::registry::ChildRegistry;
use crate::shape::Surface;

/// Single-shot signal fulfilled by the render pass that makes a change visible.
///
/// Clones share the same signal.
#[derive(Clone, Debug, Default)]
pub struct Completion(Rc<Cell<Option<u64>>>);

impl Completion {
    /// Whether a render pass has run since the signal was requested.
    pub fn is_complete(&self) -> bool {
        self.0.get().is_some()
    }

    /// Number of the frame that fulfilled the signal.
    pub fn frame(&self) -> Option<u64> {
        self.0.get()
    }

    fn fulfil(&self, frame: u64) {
        if self.0.get().is_none() {
            self.0.set(Some(frame));
        }
    }
}

/// Summary of one render pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Frame number, starting at 1.
    pub number: u64,
    /// Layers that were cleared and repainted.
    pub layers: Vec<usize>,
    /// Completion signals fulfilled by this pass.
    pub completed: usize,
}

/// Tracks outstanding completion signals and runs render passes.
#[derive(Debug, Default)]
pub struct RenderScheduler {
    pending: Vec<Completion>,
    frame: u64,
}

impl RenderScheduler {
    /// A scheduler that has not rendered yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A signal fulfilled by the next render pass.
    pub fn request(&mut self) -> Completion {
        let signal = Completion::default();
        self.pending.push(signal.clone());
        signal
    }

    /// Signals waiting for the next pass.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Number of the last completed frame; `0` before the first pass.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Clear and repaint every dirty layer, then fulfil all outstanding signals.
    ///
    /// Nodes are painted z-index ascending, then in insertion order.
    pub fn render(&mut self, registry: &mut ChildRegistry, surface: &mut dyn Surface) -> Frame {
        let layers = registry.take_dirty();
        for &layer in &layers {
            surface.clear_layer(layer);
            for child in registry.paint_order(layer) {
                child.draw(surface);
            }
        }
        registry.finish_draw();
        self.frame += 1;
        let completed = self.pending.len();
        for signal in self.pending.drain(..) {
            signal.fulfil(self.frame);
        }
        tracing::trace!(frame = self.frame, layers = layers.len(), completed, "render");
        Frame {
            number: self.frame,
            layers,
            completed,
        }
    }
}
