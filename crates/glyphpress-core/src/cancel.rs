// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cooperative cancellation for the pipeline.
//
// The pipeline is synchronous, so cancellation is a shared atomic flag
// checked at each per-page, per-class, and per-font boundary. The only
// stages with unbounded external latency (classification and font
// compilation) run between checkpoints; a cancelled run stops at the next
// boundary rather than interrupting a child process mid-flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{GlyphpressError, Result};

/// Cloneable cancellation handle shared between a caller and the pipeline.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; safe from any thread.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Boundary check: returns `Err(Cancelled)` once cancellation has been
    /// requested, otherwise `Ok(())`.
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(GlyphpressError::Cancelled)
        } else {
            Ok(())
        }
    }
}
