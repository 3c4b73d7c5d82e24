// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end pipeline driver: classify, allocate, stage, compile, compose.
//
// The workspace wraps the staging stages: it is acquired before glyph
// staging and released on every exit path — explicitly (honouring
// retention) on success, via the owned-workspace drop guard on error.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use glyphpress_core::cancel::CancellationToken;
use glyphpress_core::config::RunConfig;
use glyphpress_core::error::{GlyphpressError, Result};

use crate::classify::{ClassifierOptions, SymbolClassifier, SymbolDictionary, classify_pages};
use crate::codepoints::{CodePointMap, allocate};
use crate::compose::PageCompositor;
use crate::fontgen::FontCompiler;
use crate::glyphs::{compile_fonts, stage_glyphs};
use crate::workspace::Workspace;

/// Run one full conversion and return the output path.
#[instrument(skip_all, fields(output = %config.output.display(), pages = config.inputs.len()))]
pub fn run(
    config: &RunConfig,
    engine: &dyn SymbolClassifier,
    compiler: &dyn FontCompiler,
    cancel: &CancellationToken,
) -> Result<PathBuf> {
    config.validate()?;

    let options = ClassifierOptions {
        thresh: config.thresh,
        weight: config.weight,
    };
    let dictionary = classify_pages(engine, &config.inputs, &options, cancel)?;

    if config.render_pages {
        let dir = config
            .output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        write_rendered_pages(&dictionary, dir, config.draw_glyph_boxes)?;
    }

    let map = allocate(dictionary.classes.len());
    let workspace = Workspace::acquire(config.workspace_dir.clone())?;

    let bytes = build_document(config, &dictionary, &map, &workspace, compiler, cancel)?;

    std::fs::write(&config.output, &bytes)?;
    info!(
        output = %config.output.display(),
        bytes = bytes.len(),
        "Output written"
    );

    workspace.release(config.keep_workspace)?;
    Ok(config.output.clone())
}

/// Stage and compile fonts (unless skipped), then compose the document.
///
/// On error the workspace is dropped by the caller: owned temp trees are
/// removed by the drop guard, explicit paths are left for inspection.
fn build_document(
    config: &RunConfig,
    dictionary: &SymbolDictionary,
    map: &CodePointMap,
    workspace: &Workspace,
    compiler: &dyn FontCompiler,
    cancel: &CancellationToken,
) -> Result<Vec<u8>> {
    let fonts = if config.skip_font_build {
        let fonts: Vec<PathBuf> = (0..map.font_count())
            .map(|index| workspace.font_path(index))
            .collect();
        for font in &fonts {
            if !font.is_file() {
                return Err(GlyphpressError::FontCompiler(format!(
                    "workspace {} has no compiled font at {}; \
                     run once without --skip-font-build first",
                    workspace.root().display(),
                    font.display()
                )));
            }
        }
        info!(fonts = fonts.len(), "Reusing compiled fonts from workspace");
        fonts
    } else {
        stage_glyphs(dictionary, map, workspace, cancel)?;
        compile_fonts(map, dictionary.lattice, workspace, compiler, cancel)?
    };

    let compositor = PageCompositor::new(
        dictionary.page_geometry,
        dictionary.lattice,
        config.draw_glyph_boxes,
    );
    compositor.compose(
        dictionary.page_count,
        &dictionary.instances,
        map,
        &fonts,
        cancel,
    )
}

/// Write the classifier's reconstruction of each page as
/// `rendered_NNNNN.png` into `dir` (debug aid).
pub fn write_rendered_pages(
    dictionary: &SymbolDictionary,
    dir: &Path,
    draw_boxes: bool,
) -> Result<()> {
    let pages = dictionary.render_pages(draw_boxes)?;
    for (index, page) in pages.iter().enumerate() {
        let path = dir.join(format!("rendered_{index:05}.png"));
        page.save(&path).map_err(|err| {
            GlyphpressError::Image(format!(
                "cannot write rendered page {}: {}",
                path.display(),
                err
            ))
        })?;
    }
    info!(pages = pages.len(), dir = %dir.display(), "Rendered pages written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use image::{GrayImage, Luma};

    use glyphpress_core::geometry::{Lattice, PageGeometry, SymbolInstance};

    use crate::classify::SymbolClass;

    struct StubEngine {
        dictionary: SymbolDictionary,
    }

    impl SymbolClassifier for StubEngine {
        fn classify(
            &self,
            _pages: &[PathBuf],
            _options: &ClassifierOptions,
        ) -> Result<SymbolDictionary> {
            Ok(self.dictionary.clone())
        }
    }

    struct FailingCompiler;

    impl FontCompiler for FailingCompiler {
        fn compile(
            &self,
            _glyph_dir: &Path,
            _output: &Path,
            _lattice: Lattice,
            _font_index: u32,
        ) -> Result<PathBuf> {
            Err(GlyphpressError::FontCompiler("stub failure".into()))
        }
    }

    fn small_dictionary() -> SymbolDictionary {
        SymbolDictionary {
            classes: vec![SymbolClass {
                id: 0,
                bitmap: GrayImage::from_pixel(4, 4, Luma([0u8])),
            }],
            instances: vec![SymbolInstance {
                class: 0,
                page: 0,
                x: 5,
                y: 5,
            }],
            lattice: Lattice::new(8, 8),
            page_geometry: PageGeometry::new(100, 100),
            page_count: 1,
        }
    }

    /// Rendered debug pages land in the requested directory with the
    /// documented names.
    #[test]
    fn rendered_pages_written_with_documented_names() {
        let dir = tempfile::tempdir().unwrap();
        write_rendered_pages(&small_dictionary(), dir.path(), false).unwrap();
        assert!(dir.path().join("rendered_00000.png").is_file());
    }

    /// A font compiler failure aborts the build, and the explicit-path
    /// workspace (dropped unreleased) survives for inspection with the
    /// staged glyphs in place.
    #[test]
    fn compiler_failure_aborts_and_leaves_explicit_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let dictionary = small_dictionary();
        let map = allocate(1);
        let ws_path = dir.path().join("ws");
        let config = RunConfig {
            output: dir.path().join("out.pdf"),
            workspace_dir: Some(ws_path.clone()),
            ..RunConfig::default()
        };
        let workspace = Workspace::acquire(config.workspace_dir.clone()).unwrap();

        let result = build_document(
            &config,
            &dictionary,
            &map,
            &workspace,
            &FailingCompiler,
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(GlyphpressError::FontCompiler(_))));
        drop(workspace);
        assert!(ws_path.join("00000000").join("033.png").is_file());
        assert!(!config.output.exists());
    }

    /// Skipping the font build against a workspace with no compiled fonts
    /// is detected before composition.
    #[test]
    fn skip_font_build_detects_missing_fonts() {
        let dir = tempfile::tempdir().unwrap();
        let dictionary = small_dictionary();
        let map = allocate(1);
        let config = RunConfig {
            output: dir.path().join("out.pdf"),
            workspace_dir: Some(dir.path().join("ws")),
            skip_font_build: true,
            ..RunConfig::default()
        };
        let workspace = Workspace::acquire(config.workspace_dir.clone()).unwrap();

        let result = build_document(
            &config,
            &dictionary,
            &map,
            &workspace,
            &FailingCompiler,
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(GlyphpressError::FontCompiler(_))));
    }

    /// An invalid configuration stops the run before the engine is invoked.
    #[test]
    fn invalid_config_rejected_before_classification() {
        let engine = StubEngine {
            dictionary: small_dictionary(),
        };
        let config = RunConfig::default(); // no output, no inputs
        let result = run(
            &config,
            &engine,
            &FailingCompiler,
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(GlyphpressError::InvalidInput(_))));
    }
}
