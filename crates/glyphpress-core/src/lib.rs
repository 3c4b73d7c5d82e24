// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Glyphpress — Core types, error definitions, configuration, and cancellation
// shared across all crates.

pub mod cancel;
pub mod config;
pub mod error;
pub mod geometry;

pub use cancel::CancellationToken;
pub use config::RunConfig;
pub use error::GlyphpressError;
pub use geometry::{Lattice, PageGeometry, SymbolInstance};
