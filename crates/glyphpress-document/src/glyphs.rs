// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Glyph asset builder — pads class bitmaps to the shared lattice, stages
// them into per-font directories, and drives the font compiler once per
// font. Fonts are independent after staging, so compilation runs on scoped
// threads, one per font.

use std::path::PathBuf;

use image::{GrayImage, Luma, imageops};
use tracing::{debug, info, instrument};

use glyphpress_core::cancel::CancellationToken;
use glyphpress_core::error::{GlyphpressError, Result};
use glyphpress_core::geometry::Lattice;

use crate::classify::SymbolDictionary;
use crate::codepoints::CodePointMap;
use crate::fontgen::FontCompiler;
use crate::workspace::Workspace;

/// Background level for padding: white.
const BACKGROUND: u8 = 255;

/// Pad a glyph bitmap on the right and bottom with background pixels to
/// exactly the lattice dimensions.
///
/// A bitmap larger than the lattice in either dimension is a classifier
/// contract violation and is rejected, never cropped. A zero-area lattice
/// is degenerate geometry and also fails.
pub fn pad_to_lattice(bitmap: &GrayImage, lattice: Lattice) -> Result<GrayImage> {
    if lattice.width == 0 || lattice.height == 0 {
        return Err(GlyphpressError::Image(format!(
            "degenerate lattice {}x{}",
            lattice.width, lattice.height
        )));
    }
    let (w, h) = bitmap.dimensions();
    if !lattice.contains(w, h) {
        return Err(GlyphpressError::Image(format!(
            "glyph bitmap {w}x{h} exceeds the {}x{} lattice",
            lattice.width, lattice.height
        )));
    }
    let mut padded = GrayImage::from_pixel(lattice.width, lattice.height, Luma([BACKGROUND]));
    imageops::replace(&mut padded, bitmap, 0, 0);
    Ok(padded)
}

/// Write every class's padded bitmap into its font's staging directory,
/// named by its assigned code point.
#[instrument(skip_all, fields(classes = dictionary.classes.len()))]
pub fn stage_glyphs(
    dictionary: &SymbolDictionary,
    map: &CodePointMap,
    workspace: &Workspace,
    cancel: &CancellationToken,
) -> Result<()> {
    for font_index in 0..map.font_count() {
        std::fs::create_dir_all(workspace.font_dir(font_index))?;
    }

    for class in &dictionary.classes {
        cancel.checkpoint()?;
        let assignment = map.assignment(class.id).ok_or_else(|| {
            GlyphpressError::FontCompiler(format!(
                "class {} has no code point assignment",
                class.id
            ))
        })?;
        let padded = pad_to_lattice(&class.bitmap, dictionary.lattice)?;
        let path = workspace.glyph_path(assignment.font_index, assignment.code_point);
        padded.save(&path).map_err(|err| {
            GlyphpressError::Image(format!("cannot write glyph {}: {}", path.display(), err))
        })?;
    }

    debug!(
        fonts = map.font_count(),
        glyphs = dictionary.classes.len(),
        "Glyphs staged"
    );
    Ok(())
}

/// Compile every font's staged glyph directory into a font artifact.
///
/// Fonts share no mutable state after staging, so each compiles on its own
/// scoped thread. Returns the compiled font paths indexed by font index;
/// any single compiler failure fails the whole build.
#[instrument(skip_all, fields(fonts = map.font_count()))]
pub fn compile_fonts(
    map: &CodePointMap,
    lattice: Lattice,
    workspace: &Workspace,
    compiler: &dyn FontCompiler,
    cancel: &CancellationToken,
) -> Result<Vec<PathBuf>> {
    let font_count = map.font_count();
    let mut results: Vec<Result<PathBuf>> = Vec::with_capacity(font_count as usize);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..font_count)
            .map(|font_index| {
                let glyph_dir = workspace.font_dir(font_index);
                let output = workspace.font_path(font_index);
                scope.spawn(move || {
                    cancel.checkpoint()?;
                    compiler.compile(&glyph_dir, &output, lattice, font_index)
                })
            })
            .collect();
        for handle in handles {
            results.push(handle.join().unwrap_or_else(|_| {
                Err(GlyphpressError::FontCompiler(
                    "font compilation thread panicked".into(),
                ))
            }));
        }
    });

    let fonts = results.into_iter().collect::<Result<Vec<_>>>()?;
    info!(fonts = fonts.len(), "Fonts compiled");
    Ok(fonts)
}
