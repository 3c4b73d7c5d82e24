// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The symbol dictionary — output of the classification engine.
//
// Classes and instances are immutable once the dictionary is built; every
// later stage only reads them. Bitmaps are 8-bit grayscale with black ink
// (0) on a white (255) background.

use image::{GrayImage, Luma};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, instrument};

use glyphpress_core::error::{GlyphpressError, Result};
use glyphpress_core::geometry::{Lattice, PageGeometry, SymbolInstance};

/// Gray level used for debug lattice box overlays in rendered pages.
const BOX_GRAY: u8 = 160;

/// One symbol class: a cluster of visually equivalent glyph shapes,
/// represented by a single canonical bitmap.
#[derive(Debug, Clone)]
pub struct SymbolClass {
    /// Dense class index, equal to this class's position in the dictionary.
    pub id: u32,
    /// Representative bitmap; never larger than the shared lattice.
    pub bitmap: GrayImage,
}

/// Everything the classification engine discovered across all input pages.
#[derive(Debug, Clone)]
pub struct SymbolDictionary {
    /// Symbol classes, indexed by class id.
    pub classes: Vec<SymbolClass>,
    /// Every recognized occurrence on any page.
    pub instances: Vec<SymbolInstance>,
    /// Shared bounding lattice covering every class bitmap.
    pub lattice: Lattice,
    /// Uniform page dimensions in pixels.
    pub page_geometry: PageGeometry,
    /// Number of source pages.
    pub page_count: u32,
}

impl SymbolDictionary {
    /// Check internal consistency: dense class ids, every instance
    /// referencing a real class and page, and every bitmap within the
    /// lattice. A violation means the engine broke its contract.
    pub fn validate(&self) -> Result<()> {
        for (index, class) in self.classes.iter().enumerate() {
            if class.id as usize != index {
                return Err(GlyphpressError::Classification(format!(
                    "class id {} at dictionary position {index}; ids must be dense",
                    class.id
                )));
            }
            let (w, h) = class.bitmap.dimensions();
            if !self.lattice.contains(w, h) {
                return Err(GlyphpressError::Classification(format!(
                    "class {index} bitmap {w}x{h} exceeds the {}x{} lattice",
                    self.lattice.width, self.lattice.height
                )));
            }
        }
        for instance in &self.instances {
            if instance.class as usize >= self.classes.len() {
                return Err(GlyphpressError::Classification(format!(
                    "instance references unknown class {}",
                    instance.class
                )));
            }
            if instance.page >= self.page_count {
                return Err(GlyphpressError::Classification(format!(
                    "instance references page {} of {}",
                    instance.page, self.page_count
                )));
            }
        }
        Ok(())
    }

    /// Reconstruct each page from the dictionary by stamping class bitmaps
    /// at instance positions. Debug aid only; with `draw_boxes` a gray
    /// lattice outline is added around every stamp.
    #[instrument(skip(self), fields(pages = self.page_count))]
    pub fn render_pages(&self, draw_boxes: bool) -> Result<Vec<GrayImage>> {
        let mut pages: Vec<GrayImage> = (0..self.page_count)
            .map(|_| {
                GrayImage::from_pixel(
                    self.page_geometry.width,
                    self.page_geometry.height,
                    Luma([255u8]),
                )
            })
            .collect();

        for instance in &self.instances {
            let class = self
                .classes
                .get(instance.class as usize)
                .ok_or_else(|| {
                    GlyphpressError::Classification(format!(
                        "instance references unknown class {}",
                        instance.class
                    ))
                })?;
            let page = &mut pages[instance.page as usize];
            stamp(page, &class.bitmap, instance.x, instance.y);
            if draw_boxes {
                let rect = Rect::at(instance.x as i32, instance.y as i32)
                    .of_size(self.lattice.width, self.lattice.height);
                draw_hollow_rect_mut(page, rect, Luma([BOX_GRAY]));
            }
        }

        debug!(pages = pages.len(), "Pages rendered from dictionary");
        Ok(pages)
    }
}

/// Copy the ink (non-white) pixels of `bitmap` onto `page` at (x, y),
/// clipping at the page edges.
fn stamp(page: &mut GrayImage, bitmap: &GrayImage, x: u32, y: u32) {
    let (page_w, page_h) = page.dimensions();
    for (bx, by, pixel) in bitmap.enumerate_pixels() {
        let (px, py) = (x + bx, y + by);
        if px < page_w && py < page_h && pixel.0[0] < 128 {
            page.put_pixel(px, py, *pixel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_square(side: u32) -> GrayImage {
        GrayImage::from_pixel(side, side, Luma([0u8]))
    }

    fn dictionary_with(classes: Vec<SymbolClass>, instances: Vec<SymbolInstance>) -> SymbolDictionary {
        SymbolDictionary {
            classes,
            instances,
            lattice: Lattice::new(4, 4),
            page_geometry: PageGeometry::new(16, 16),
            page_count: 1,
        }
    }

    /// A consistent dictionary validates.
    #[test]
    fn consistent_dictionary_validates() {
        let dict = dictionary_with(
            vec![SymbolClass {
                id: 0,
                bitmap: black_square(3),
            }],
            vec![SymbolInstance {
                class: 0,
                page: 0,
                x: 2,
                y: 2,
            }],
        );
        assert!(dict.validate().is_ok());
    }

    /// Out-of-range class and page references are contract violations.
    #[test]
    fn dangling_references_rejected() {
        let dict = dictionary_with(
            vec![SymbolClass {
                id: 0,
                bitmap: black_square(2),
            }],
            vec![SymbolInstance {
                class: 1,
                page: 0,
                x: 0,
                y: 0,
            }],
        );
        assert!(dict.validate().is_err());

        let dict = dictionary_with(
            vec![SymbolClass {
                id: 0,
                bitmap: black_square(2),
            }],
            vec![SymbolInstance {
                class: 0,
                page: 3,
                x: 0,
                y: 0,
            }],
        );
        assert!(dict.validate().is_err());
    }

    /// A bitmap larger than the lattice fails validation rather than being
    /// cropped later.
    #[test]
    fn oversized_bitmap_rejected() {
        let dict = dictionary_with(
            vec![SymbolClass {
                id: 0,
                bitmap: black_square(5),
            }],
            Vec::new(),
        );
        assert!(dict.validate().is_err());
    }

    /// Rendering stamps ink at the recorded position and leaves the rest of
    /// the page white.
    #[test]
    fn render_stamps_ink_at_instance_position() {
        let dict = dictionary_with(
            vec![SymbolClass {
                id: 0,
                bitmap: black_square(2),
            }],
            vec![SymbolInstance {
                class: 0,
                page: 0,
                x: 5,
                y: 7,
            }],
        );
        let pages = dict.render_pages(false).unwrap();
        assert_eq!(pages.len(), 1);
        let page = &pages[0];
        assert_eq!(page.get_pixel(5, 7).0[0], 0);
        assert_eq!(page.get_pixel(6, 8).0[0], 0);
        assert_eq!(page.get_pixel(0, 0).0[0], 255);
        assert_eq!(page.get_pixel(7, 9).0[0], 255);
    }
}
