// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Coordinate geometry: the shared glyph lattice, the uniform page geometry,
// and the transform between image space (origin top-left, y down) and
// document space (origin bottom-left, y up).

use serde::{Deserialize, Serialize};

use crate::error::{GlyphpressError, Result};

/// Shared bounding-box dimensions to which every glyph bitmap is padded.
///
/// All glyphs in every synthetic font are rendered at this one size, so the
/// fonts need no per-glyph metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lattice {
    /// Lattice height in pixels.
    pub height: u32,
    /// Lattice width in pixels.
    pub width: u32,
}

impl Lattice {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Whether a bitmap of the given dimensions fits inside the lattice.
    pub fn contains(&self, width: u32, height: u32) -> bool {
        width <= self.width && height <= self.height
    }
}

/// Uniform page dimensions in source-image pixels.
///
/// Pages map 1:1 from pixels to PDF points, so this is also the document
/// page size. The single-lattice/single-page-size model means every page in
/// a run shares one geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width in pixels.
    pub width: u32,
    /// Page height in pixels.
    pub height: u32,
}

impl PageGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Transform an image-space top-left coordinate into the document-space
    /// baseline position for a glyph padded to `lattice`.
    ///
    /// Image space has its origin at the top-left with y growing downward;
    /// document space has its origin at the bottom-left with y growing
    /// upward: `doc_y = page_height - image_y - lattice_height`, `doc_x`
    /// unchanged.
    ///
    /// Fails if the glyph box would extend below the page bottom — that is a
    /// classifier contract violation, not a condition to clamp silently.
    pub fn to_document(&self, x: u32, y: u32, lattice: Lattice) -> Result<(u32, u32)> {
        let floor = y.checked_add(lattice.height).ok_or_else(|| {
            GlyphpressError::Classification(format!("instance y={y} overflows page geometry"))
        })?;
        if floor > self.height {
            return Err(GlyphpressError::Classification(format!(
                "instance at ({x}, {y}) with lattice height {} falls off a page of height {}",
                lattice.height, self.height
            )));
        }
        Ok((x, self.height - y - lattice.height))
    }

    /// Inverse of [`to_document`](Self::to_document): recover the image-space
    /// top-left coordinate from a document-space position.
    pub fn to_image(&self, doc_x: u32, doc_y: u32, lattice: Lattice) -> (u32, u32) {
        (doc_x, self.height - doc_y - lattice.height)
    }
}

/// One concrete occurrence of a symbol class on a page.
///
/// `x`/`y` is the top-left pixel of the occurrence in source-image space.
/// Ordering across instances carries no meaning beyond page grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInstance {
    /// Dense symbol class index.
    pub class: u32,
    /// Source page index, 0-based.
    pub page: u32,
    /// Top-left x coordinate in image pixels.
    pub x: u32,
    /// Top-left y coordinate in image pixels.
    pub y: u32,
}
