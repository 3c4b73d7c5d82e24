// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run configuration for a single Glyphpress invocation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{GlyphpressError, Result};

/// Valid range for the classifier correlation threshold.
pub const THRESH_RANGE: (f64, f64) = (0.40, 0.98);

/// Valid range for the classifier weight factor.
pub const WEIGHT_RANGE: (f64, f64) = (0.0, 1.0);

/// Settings for one conversion run, as assembled by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Output PDF path.
    pub output: PathBuf,
    /// Input page images, one 1-bit file per page, in page order.
    pub inputs: Vec<PathBuf>,
    /// Correlation threshold passed to the classifier (default 0.85).
    pub thresh: f64,
    /// Weight factor passed to the classifier (default 0.5).
    pub weight: f64,
    /// Use this workspace directory instead of a fresh system temp dir.
    pub workspace_dir: Option<PathBuf>,
    /// Keep the workspace tree after the run instead of deleting it.
    pub keep_workspace: bool,
    /// Skip glyph staging and font compilation; requires a workspace that
    /// already holds compiled fonts from an earlier `keep_workspace` run.
    pub skip_font_build: bool,
    /// Write the classifier's reconstruction of each page to PNG files.
    pub render_pages: bool,
    /// Stroke a red rectangle around every placed glyph in the output PDF.
    pub draw_glyph_boxes: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::new(),
            inputs: Vec::new(),
            thresh: 0.85,
            weight: 0.5,
            workspace_dir: None,
            keep_workspace: false,
            skip_font_build: false,
            render_pages: false,
            draw_glyph_boxes: false,
        }
    }
}

impl RunConfig {
    /// Validate the configuration before the pipeline starts.
    ///
    /// Checks output presence, at least one readable input file, and the
    /// documented classifier parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.output.as_os_str().is_empty() {
            return Err(GlyphpressError::InvalidInput(
                "no output file specified".into(),
            ));
        }
        if self.inputs.is_empty() {
            return Err(GlyphpressError::InvalidInput(
                "no input files specified".into(),
            ));
        }
        for input in &self.inputs {
            if !input.is_file() {
                return Err(GlyphpressError::InvalidInput(format!(
                    "input file {} does not exist or is not readable",
                    input.display()
                )));
            }
        }
        if self.thresh < THRESH_RANGE.0 || self.thresh > THRESH_RANGE.1 {
            return Err(GlyphpressError::InvalidInput(format!(
                "threshold {} outside the valid range [{} - {}]",
                self.thresh, THRESH_RANGE.0, THRESH_RANGE.1
            )));
        }
        if self.weight < WEIGHT_RANGE.0 || self.weight > WEIGHT_RANGE.1 {
            return Err(GlyphpressError::InvalidInput(format!(
                "weight {} outside the valid range [{} - {}]",
                self.weight, WEIGHT_RANGE.0, WEIGHT_RANGE.1
            )));
        }
        if self.skip_font_build && self.workspace_dir.is_none() {
            return Err(GlyphpressError::InvalidInput(
                "--skip-font-build requires --workspace-dir pointing at a workspace \
                 that already contains compiled fonts"
                    .into(),
            ));
        }
        Ok(())
    }
}
