// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Symbol classification adapter.
//
// The classification engine itself is an external collaborator behind the
// `SymbolClassifier` trait; this module validates its inputs (readable,
// strictly 1-bit pages; parameters in range), invokes it, and checks the
// returned dictionary against its contract. `ExternalClassifier` is the
// production implementation, driving an out-of-process engine that writes a
// staging directory we parse back.

pub mod dictionary;

use std::path::{Path, PathBuf};
use std::process::Command;

use image::{ExtendedColorType, ImageDecoder, ImageReader};
use tracing::{debug, info, instrument};

use glyphpress_core::cancel::CancellationToken;
use glyphpress_core::config::{THRESH_RANGE, WEIGHT_RANGE};
use glyphpress_core::error::{GlyphpressError, Result};
use glyphpress_core::geometry::{Lattice, PageGeometry, SymbolInstance};

pub use dictionary::{SymbolClass, SymbolDictionary};

/// Parameters forwarded to the classification engine.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierOptions {
    /// Correlation threshold in [0.40, 0.98].
    pub thresh: f64,
    /// Weight factor correcting the threshold for thick strokes, in [0.0, 1.0].
    pub weight: f64,
}

/// The external symbol classification engine.
///
/// Given an ordered list of 1-bit page images it discovers a minimal set of
/// visually equivalent symbol classes and reports every occurrence with its
/// class, page, and top-left coordinate. Injectable so tests can substitute
/// a stub.
pub trait SymbolClassifier {
    fn classify(
        &self,
        pages: &[PathBuf],
        options: &ClassifierOptions,
    ) -> Result<SymbolDictionary>;
}

/// Validate inputs, invoke the engine, and vet the resulting dictionary.
///
/// The cancellation token is honoured once per input page during validation
/// and once after the engine returns.
#[instrument(skip_all, fields(pages = pages.len()))]
pub fn classify_pages(
    engine: &dyn SymbolClassifier,
    pages: &[PathBuf],
    options: &ClassifierOptions,
    cancel: &CancellationToken,
) -> Result<SymbolDictionary> {
    if options.thresh < THRESH_RANGE.0 || options.thresh > THRESH_RANGE.1 {
        return Err(GlyphpressError::InvalidInput(format!(
            "threshold {} outside [{} - {}]",
            options.thresh, THRESH_RANGE.0, THRESH_RANGE.1
        )));
    }
    if options.weight < WEIGHT_RANGE.0 || options.weight > WEIGHT_RANGE.1 {
        return Err(GlyphpressError::InvalidInput(format!(
            "weight {} outside [{} - {}]",
            options.weight, WEIGHT_RANGE.0, WEIGHT_RANGE.1
        )));
    }
    if pages.is_empty() {
        return Err(GlyphpressError::InvalidInput(
            "no input pages to classify".into(),
        ));
    }

    for page in pages {
        cancel.checkpoint()?;
        ensure_one_bit(page)?;
    }

    let dictionary = engine.classify(pages, options)?;
    cancel.checkpoint()?;

    if dictionary.page_count as usize != pages.len() {
        return Err(GlyphpressError::Classification(format!(
            "engine reported {} pages for {} inputs",
            dictionary.page_count,
            pages.len()
        )));
    }
    dictionary.validate()?;

    info!(
        classes = dictionary.classes.len(),
        instances = dictionary.instances.len(),
        lattice_w = dictionary.lattice.width,
        lattice_h = dictionary.lattice.height,
        "Classification complete"
    );
    Ok(dictionary)
}

/// Reject any input that is not stored with a strict 1-bit depth.
///
/// The check reads the container's declared pixel format, not the decoded
/// buffer: decoders widen 1-bit data to 8-bit on decode, which would hide
/// grayscale inputs that the classifier cannot handle.
fn ensure_one_bit(path: &Path) -> Result<()> {
    let decoder = ImageReader::open(path)
        .map_err(|err| {
            GlyphpressError::InvalidInput(format!("cannot read {}: {}", path.display(), err))
        })?
        .with_guessed_format()
        .map_err(|err| {
            GlyphpressError::InvalidInput(format!("cannot probe {}: {}", path.display(), err))
        })?
        .into_decoder()
        .map_err(|err| {
            GlyphpressError::Image(format!("cannot decode {}: {}", path.display(), err))
        })?;

    let color = decoder.original_color_type();
    if color != ExtendedColorType::L1 {
        return Err(GlyphpressError::InvalidInput(format!(
            "{} is {:?}, only 1-bit (black and white) pages are supported",
            path.display(),
            color
        )));
    }
    debug!(path = %path.display(), "Input page depth verified");
    Ok(())
}

// -- Out-of-process engine ----------------------------------------------------

/// Default program name for the external classification engine.
pub const DEFAULT_CLASSIFIER_PROGRAM: &str = "glyphpress-classify";

/// Name of the manifest file the engine writes into its staging directory.
const MANIFEST_NAME: &str = "dictionary.tsv";

/// Subdirectory holding one representative bitmap per class.
const CLASSES_DIR: &str = "classes";

/// Production classifier: invokes an external engine process.
///
/// The engine is called as
/// `<program> --thresh T --weight W --out <staging-dir> <pages...>` and must
/// write `dictionary.tsv` plus `classes/NNNNN.png` bitmaps into the staging
/// directory. Its exit status is checked explicitly.
#[derive(Debug, Clone)]
pub struct ExternalClassifier {
    program: PathBuf,
}

impl ExternalClassifier {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ExternalClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CLASSIFIER_PROGRAM)
    }
}

impl SymbolClassifier for ExternalClassifier {
    #[instrument(skip_all, fields(program = %self.program.display(), pages = pages.len()))]
    fn classify(
        &self,
        pages: &[PathBuf],
        options: &ClassifierOptions,
    ) -> Result<SymbolDictionary> {
        let staging = tempfile::Builder::new()
            .prefix("glyphpress_classify_")
            .tempdir()
            .map_err(|err| {
                GlyphpressError::Classification(format!(
                    "cannot create classifier staging directory: {err}"
                ))
            })?;

        let output = Command::new(&self.program)
            .arg("--thresh")
            .arg(options.thresh.to_string())
            .arg("--weight")
            .arg(options.weight.to_string())
            .arg("--out")
            .arg(staging.path())
            .args(pages)
            .output()
            .map_err(|err| {
                GlyphpressError::Classification(format!(
                    "cannot run classifier {}: {}",
                    self.program.display(),
                    err
                ))
            })?;

        if !output.status.success() {
            return Err(GlyphpressError::Classification(format!(
                "classifier {} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_staging_dir(staging.path())
    }
}

/// Parse the staging directory an engine run produced.
///
/// Manifest format, whitespace-separated, one record per line:
///
/// ```text
/// lattice   <height> <width>
/// page-size <width> <height>
/// pages     <count>
/// classes   <count>
/// instance  <class> <page> <x> <y>
/// ```
pub(crate) fn parse_staging_dir(dir: &Path) -> Result<SymbolDictionary> {
    let manifest_path = dir.join(MANIFEST_NAME);
    let manifest = std::fs::read_to_string(&manifest_path).map_err(|err| {
        GlyphpressError::Classification(format!(
            "cannot read classifier manifest {}: {}",
            manifest_path.display(),
            err
        ))
    })?;

    let mut lattice: Option<Lattice> = None;
    let mut page_geometry: Option<PageGeometry> = None;
    let mut page_count: Option<u32> = None;
    let mut class_count: Option<u32> = None;
    let mut instances: Vec<SymbolInstance> = Vec::new();

    for (line_no, line) in manifest.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let parse = |field: &str| -> Result<u32> {
            field.parse::<u32>().map_err(|_| {
                GlyphpressError::Classification(format!(
                    "manifest line {}: bad number {:?}",
                    line_no + 1,
                    field
                ))
            })
        };
        match (fields[0], fields.len()) {
            ("lattice", 3) => {
                lattice = Some(Lattice::new(parse(fields[1])?, parse(fields[2])?));
            }
            ("page-size", 3) => {
                page_geometry = Some(PageGeometry::new(parse(fields[1])?, parse(fields[2])?));
            }
            ("pages", 2) => page_count = Some(parse(fields[1])?),
            ("classes", 2) => class_count = Some(parse(fields[1])?),
            ("instance", 5) => instances.push(SymbolInstance {
                class: parse(fields[1])?,
                page: parse(fields[2])?,
                x: parse(fields[3])?,
                y: parse(fields[4])?,
            }),
            _ => {
                return Err(GlyphpressError::Classification(format!(
                    "manifest line {}: unrecognised record {:?}",
                    line_no + 1,
                    fields[0]
                )));
            }
        }
    }

    let missing = |name: &str| {
        GlyphpressError::Classification(format!("classifier manifest is missing {name}"))
    };
    let lattice = lattice.ok_or_else(|| missing("lattice"))?;
    let page_geometry = page_geometry.ok_or_else(|| missing("page-size"))?;
    let page_count = page_count.ok_or_else(|| missing("pages"))?;
    let class_count = class_count.ok_or_else(|| missing("classes"))?;

    let mut classes = Vec::with_capacity(class_count as usize);
    for id in 0..class_count {
        let bitmap_path = dir.join(CLASSES_DIR).join(format!("{id:05}.png"));
        let bitmap = image::open(&bitmap_path)
            .map_err(|err| {
                GlyphpressError::Classification(format!(
                    "cannot read class bitmap {}: {}",
                    bitmap_path.display(),
                    err
                ))
            })?
            .into_luma8();
        classes.push(SymbolClass { id, bitmap });
    }

    Ok(SymbolDictionary {
        classes,
        instances,
        lattice,
        page_geometry,
        page_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    struct StubClassifier {
        dictionary: SymbolDictionary,
    }

    impl SymbolClassifier for StubClassifier {
        fn classify(
            &self,
            _pages: &[PathBuf],
            _options: &ClassifierOptions,
        ) -> Result<SymbolDictionary> {
            Ok(self.dictionary.clone())
        }
    }

    fn stub_dictionary(page_count: u32) -> SymbolDictionary {
        SymbolDictionary {
            classes: vec![SymbolClass {
                id: 0,
                bitmap: GrayImage::from_pixel(2, 2, Luma([0u8])),
            }],
            instances: Vec::new(),
            lattice: Lattice::new(4, 4),
            page_geometry: PageGeometry::new(100, 100),
            page_count,
        }
    }

    /// Out-of-range engine parameters are rejected before any file access.
    #[test]
    fn out_of_range_options_rejected() {
        let stub = StubClassifier {
            dictionary: stub_dictionary(1),
        };
        let pages = vec![PathBuf::from("does-not-matter.tiff")];
        let cancel = CancellationToken::new();

        let bad_thresh = ClassifierOptions {
            thresh: 0.30,
            weight: 0.5,
        };
        assert!(matches!(
            classify_pages(&stub, &pages, &bad_thresh, &cancel),
            Err(GlyphpressError::InvalidInput(_))
        ));

        let bad_weight = ClassifierOptions {
            thresh: 0.85,
            weight: 1.5,
        };
        assert!(matches!(
            classify_pages(&stub, &pages, &bad_weight, &cancel),
            Err(GlyphpressError::InvalidInput(_))
        ));
    }

    /// A missing input page is an input error, not an engine error.
    #[test]
    fn missing_page_rejected() {
        let stub = StubClassifier {
            dictionary: stub_dictionary(1),
        };
        let pages = vec![PathBuf::from("/nonexistent/page.tiff")];
        let options = ClassifierOptions {
            thresh: 0.85,
            weight: 0.5,
        };
        let result = classify_pages(&stub, &pages, &options, &CancellationToken::new());
        assert!(matches!(result, Err(GlyphpressError::InvalidInput(_))));
    }

    /// An 8-bit grayscale input is rejected: the depth check looks at the
    /// stored format, which for a GrayImage PNG is L8, not L1.
    #[test]
    fn eight_bit_input_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        GrayImage::from_pixel(10, 10, Luma([255u8]))
            .save(&path)
            .unwrap();

        let stub = StubClassifier {
            dictionary: stub_dictionary(1),
        };
        let options = ClassifierOptions {
            thresh: 0.85,
            weight: 0.5,
        };
        let result = classify_pages(
            &stub,
            &[path],
            &options,
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(GlyphpressError::InvalidInput(_))));
    }

    /// A cancelled token stops classification at the first page boundary.
    #[test]
    fn cancellation_honoured_per_page() {
        let stub = StubClassifier {
            dictionary: stub_dictionary(1),
        };
        let cancel = CancellationToken::new();
        cancel.cancel();
        let options = ClassifierOptions {
            thresh: 0.85,
            weight: 0.5,
        };
        let result = classify_pages(
            &stub,
            &[PathBuf::from("unread.tiff")],
            &options,
            &cancel,
        );
        assert!(matches!(result, Err(GlyphpressError::Cancelled)));
    }

    /// A staging directory written by the engine parses back into a
    /// consistent dictionary.
    #[test]
    fn staging_dir_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(CLASSES_DIR)).unwrap();
        for id in 0..2u32 {
            GrayImage::from_pixel(3, 3, Luma([0u8]))
                .save(dir.path().join(CLASSES_DIR).join(format!("{id:05}.png")))
                .unwrap();
        }
        std::fs::write(
            dir.path().join(MANIFEST_NAME),
            "lattice 20 20\n\
             page-size 600 800\n\
             pages 1\n\
             classes 2\n\
             instance 0 0 10 30\n\
             instance 1 0 50 30\n\
             instance 0 0 90 60\n",
        )
        .unwrap();

        let dict = parse_staging_dir(dir.path()).unwrap();
        assert_eq!(dict.classes.len(), 2);
        assert_eq!(dict.instances.len(), 3);
        assert_eq!(dict.lattice, Lattice::new(20, 20));
        assert_eq!(dict.page_geometry, PageGeometry::new(600, 800));
        assert_eq!(dict.page_count, 1);
        assert!(dict.validate().is_ok());
    }

    /// A manifest missing a required header record fails to parse.
    #[test]
    fn incomplete_manifest_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_NAME),
            "page-size 600 800\npages 1\nclasses 0\n",
        )
        .unwrap();
        assert!(matches!(
            parse_staging_dir(dir.path()),
            Err(GlyphpressError::Classification(_))
        ));
    }
}
