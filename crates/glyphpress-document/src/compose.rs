// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page compositor — re-typesets every recognized symbol occurrence as a
// one-character text run in the output PDF, using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. Each compiled synthetic font is loaded exactly once;
// instances are pre-partitioned by page in a single linear pass rather than
// rescanned per page.

use std::path::PathBuf;

use printpdf::{
    Color, FontId, Line, LinePoint, Mm, Op, ParsedFont, PdfDocument, PdfPage, PdfSaveOptions,
    PdfWarnMsg, Point, Pt, Rgb, TextItem,
};
use tracing::{debug, info, instrument};

use glyphpress_core::cancel::CancellationToken;
use glyphpress_core::error::{GlyphpressError, Result};
use glyphpress_core::geometry::{Lattice, PageGeometry, SymbolInstance};

use crate::codepoints::CodePointMap;

/// Fixed display size for every placed glyph, in points. Glyph bitmaps are
/// padded to one shared lattice, so a single size renders every code point.
const GLYPH_SIZE_PT: f32 = 100.0;

/// Hard ceiling on font sizes in the PDF backend lineage this tool targets.
const BACKEND_MAX_FONT_SIZE_PT: f32 = 300.0;

// The display size is a constant, not user input; the ceiling is checked
// once at build time.
const _: () = assert!(GLYPH_SIZE_PT <= BACKEND_MAX_FONT_SIZE_PT);

/// Stroke width for debug glyph boxes.
const BOX_STROKE_PT: f32 = 0.75;

/// Assembles the multi-page output document from placement instructions.
pub struct PageCompositor {
    /// Uniform page size; pixels map 1:1 to points.
    geometry: PageGeometry,
    /// Shared glyph lattice, needed for the y-flip and debug boxes.
    lattice: Lattice,
    /// Stroke a red rectangle around every placed glyph.
    draw_glyph_boxes: bool,
}

impl PageCompositor {
    pub fn new(geometry: PageGeometry, lattice: Lattice, draw_glyph_boxes: bool) -> Self {
        Self {
            geometry,
            lattice,
            draw_glyph_boxes,
        }
    }

    /// Compose the whole document and return the serialised PDF bytes.
    ///
    /// `font_paths` are the compiled font artifacts indexed by font index;
    /// a mapping entry referencing a font with no artifact means the asset
    /// builder and allocator desynchronised, which is fatal.
    #[instrument(skip_all, fields(pages = page_count, instances = instances.len()))]
    pub fn compose(
        &self,
        page_count: u32,
        instances: &[SymbolInstance],
        map: &CodePointMap,
        font_paths: &[PathBuf],
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        if (map.font_count() as usize) > font_paths.len() {
            return Err(GlyphpressError::Backend(format!(
                "mapping uses {} fonts but only {} were compiled",
                map.font_count(),
                font_paths.len()
            )));
        }

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let mut doc = PdfDocument::new("glyphpress output");

        // Load each compiled font exactly once, keyed by font index.
        let mut fonts: Vec<FontId> = Vec::with_capacity(font_paths.len());
        for path in font_paths {
            let bytes = std::fs::read(path).map_err(|err| {
                GlyphpressError::Backend(format!(
                    "cannot read compiled font {}: {}",
                    path.display(),
                    err
                ))
            })?;
            let parsed = ParsedFont::from_bytes(&bytes, 0, &mut warnings).ok_or_else(|| {
                GlyphpressError::Backend(format!(
                    "compiled font {} is not a parseable font file",
                    path.display()
                ))
            })?;
            fonts.push(doc.add_font(&parsed));
        }
        debug!(fonts = fonts.len(), "Fonts loaded into document");

        // One linear pass partitions instances by page membership.
        let mut by_page: Vec<Vec<&SymbolInstance>> = vec![Vec::new(); page_count as usize];
        for instance in instances {
            let slot = by_page.get_mut(instance.page as usize).ok_or_else(|| {
                GlyphpressError::Backend(format!(
                    "instance on page {} of a {page_count}-page document",
                    instance.page
                ))
            })?;
            slot.push(instance);
        }

        let page_w: Mm = Pt(self.geometry.width as f32).into();
        let page_h: Mm = Pt(self.geometry.height as f32).into();

        let mut pages: Vec<PdfPage> = Vec::with_capacity(page_count as usize);
        for page_instances in &by_page {
            cancel.checkpoint()?;
            let ops = self.page_ops(page_instances, map, &fonts)?;
            pages.push(PdfPage::new(page_w, page_h, ops));
        }
        doc.with_pages(pages);

        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        info!(
            pages = page_count,
            bytes = bytes.len(),
            "Document composed"
        );
        Ok(bytes)
    }

    /// Build the operation list for one page.
    ///
    /// Per instance: resolve class to (font, code point), flip the y axis,
    /// and emit a single-character text run at the transformed position.
    /// With `draw_glyph_boxes`, an unfilled red rectangle spanning the
    /// lattice is added after the text run; it never changes the placement.
    pub fn page_ops(
        &self,
        instances: &[&SymbolInstance],
        map: &CodePointMap,
        fonts: &[FontId],
    ) -> Result<Vec<Op>> {
        let mut ops: Vec<Op> = Vec::with_capacity(instances.len() * 5);

        for instance in instances {
            let assignment = map.assignment(instance.class).ok_or_else(|| {
                GlyphpressError::Backend(format!(
                    "class {} has no code point assignment",
                    instance.class
                ))
            })?;
            let font = fonts.get(assignment.font_index as usize).ok_or_else(|| {
                GlyphpressError::Backend(format!(
                    "font {} referenced by class {} was never loaded",
                    assignment.font_index, instance.class
                ))
            })?;

            let (x, y) = self
                .geometry
                .to_document(instance.x, instance.y, self.lattice)?;
            let pos = Point {
                x: Pt(x as f32),
                y: Pt(y as f32),
            };

            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor { pos });
            ops.push(Op::SetFontSize {
                size: Pt(GLYPH_SIZE_PT),
                font: font.clone(),
            });
            ops.push(Op::WriteText {
                items: vec![TextItem::Text(
                    char::from(assignment.code_point).to_string(),
                )],
                font: font.clone(),
            });
            ops.push(Op::EndTextSection);

            if self.draw_glyph_boxes {
                ops.extend(self.box_ops(x, y));
            }
        }

        Ok(ops)
    }

    /// Red unfilled rectangle spanning the lattice at (x, y), document space.
    fn box_ops(&self, x: u32, y: u32) -> Vec<Op> {
        let (x, y) = (x as f32, y as f32);
        let (w, h) = (self.lattice.width as f32, self.lattice.height as f32);
        let corner = |cx: f32, cy: f32| LinePoint {
            p: Point {
                x: Pt(cx),
                y: Pt(cy),
            },
            bezier: false,
        };
        vec![
            Op::SetOutlineColor {
                col: Color::Rgb(Rgb {
                    r: 1.0,
                    g: 0.0,
                    b: 0.0,
                    icc_profile: None,
                }),
            },
            Op::SetOutlineThickness {
                pt: Pt(BOX_STROKE_PT),
            },
            Op::DrawLine {
                line: Line {
                    points: vec![
                        corner(x, y),
                        corner(x + w, y),
                        corner(x + w, y + h),
                        corner(x, y + h),
                    ],
                    is_closed: true,
                },
            },
        ]
    }
}
