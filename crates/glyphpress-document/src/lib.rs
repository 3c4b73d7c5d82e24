// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// glyphpress-document — The symbol-compression pipeline.
//
// Scanned 1-bit pages go in; a compact PDF comes out. The stages: a symbol
// classification adapter (external engine behind a trait), a code point
// allocator that bin-packs symbol classes into synthetic fonts, a glyph
// asset builder that stages padded glyph bitmaps and drives the font
// compiler, a page compositor that re-typesets every symbol occurrence as a
// positioned text run, and a workspace manager owning the temporary staging
// tree.

pub mod classify;
pub mod codepoints;
pub mod compose;
pub mod fontgen;
pub mod glyphs;
pub mod pipeline;
pub mod workspace;

pub use classify::{ClassifierOptions, ExternalClassifier, SymbolClassifier, SymbolDictionary};
pub use codepoints::{CodePointAssignment, CodePointMap, allocate};
pub use compose::PageCompositor;
pub use fontgen::{ExternalFontCompiler, FontCompiler};
pub use workspace::Workspace;
