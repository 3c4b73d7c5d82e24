// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font compiler interface.
//
// Compiling a directory of glyph images into an embeddable font is delegated
// to an external tool. The trait keeps the collaborator injectable so the
// asset builder can be tested with a stub, and the production implementation
// checks the child process's exit status explicitly — a compiler failure is
// fatal here, never discovered later as a missing font.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, instrument};

use glyphpress_core::error::{GlyphpressError, Result};
use glyphpress_core::geometry::Lattice;

/// Default program name for the external font compiler.
pub const DEFAULT_FONTGEN_PROGRAM: &str = "glyphpress-fontgen";

/// Compiles one font's glyph directory into a font file.
///
/// `glyph_dir` holds one image per code point, named `<code point>.png`;
/// `output` is where the compiled font must appear. Implementations return
/// the path to the produced artifact.
pub trait FontCompiler: Sync {
    fn compile(
        &self,
        glyph_dir: &Path,
        output: &Path,
        lattice: Lattice,
        font_index: u32,
    ) -> Result<PathBuf>;
}

/// Production compiler: one out-of-process invocation per font.
///
/// Called as `<program> <glyph-dir> <output> <lattice-h> <lattice-w> <index>`,
/// matching the glyph staging layout written by the asset builder.
#[derive(Debug, Clone)]
pub struct ExternalFontCompiler {
    program: PathBuf,
}

impl ExternalFontCompiler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ExternalFontCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_FONTGEN_PROGRAM)
    }
}

impl FontCompiler for ExternalFontCompiler {
    #[instrument(skip(self, glyph_dir, output), fields(font_index))]
    fn compile(
        &self,
        glyph_dir: &Path,
        output: &Path,
        lattice: Lattice,
        font_index: u32,
    ) -> Result<PathBuf> {
        let result = Command::new(&self.program)
            .arg(glyph_dir)
            .arg(output)
            .arg(lattice.height.to_string())
            .arg(lattice.width.to_string())
            .arg(font_index.to_string())
            .output()
            .map_err(|err| {
                GlyphpressError::FontCompiler(format!(
                    "cannot run font compiler {}: {}",
                    self.program.display(),
                    err
                ))
            })?;

        if !result.status.success() {
            return Err(GlyphpressError::FontCompiler(format!(
                "font compiler {} exited with {} for font {}: {}",
                self.program.display(),
                result.status,
                font_index,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }
        if !output.is_file() {
            return Err(GlyphpressError::FontCompiler(format!(
                "font compiler reported success but produced no file at {}",
                output.display()
            )));
        }

        debug!(font = %output.display(), "Font compiled");
        Ok(output.to_path_buf())
    }
}
