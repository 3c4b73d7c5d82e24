// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Glyphpress CLI — symbol-compression PDF generator for 1-bit page scans.
//
// Entry point. Initialises logging, assembles the run configuration from the
// command line, wires in the external classifier and font compiler, and maps
// every fatal error to its class-specific non-zero exit code.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use glyphpress_core::{CancellationToken, GlyphpressError, RunConfig};
use glyphpress_document::{ExternalClassifier, ExternalFontCompiler, pipeline};

#[derive(Parser)]
#[command(name = "glyphpress")]
#[command(version, about = "Convert 1-bit page scans into a compact symbol-font PDF", long_about = None)]
#[command(after_help = "EXAMPLES:
    glyphpress -o book.pdf page-*.tiff          Convert scanned pages
    glyphpress -o book.pdf -t 0.90 page-*.tiff  Stricter symbol matching
")]
struct Cli {
    /// Output PDF file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Correlation threshold for symbol matching [0.40 - 0.98]
    #[arg(short, long, default_value_t = 0.85)]
    thresh: f64,

    /// Weight factor correcting the threshold for thick strokes [0.0 - 1.0]
    #[arg(short, long, default_value_t = 0.5)]
    weight: f64,

    /// Input page images, one 1-bit file per page, in page order
    #[arg(value_name = "PAGES", required = true)]
    inputs: Vec<PathBuf>,

    /// Use this workspace directory instead of a fresh system temp dir
    #[arg(long, value_name = "DIR")]
    workspace_dir: Option<PathBuf>,

    /// Keep the workspace tree after the run instead of deleting it
    #[arg(long)]
    keep_workspace: bool,

    /// Skip glyph staging and font compilation; reuses compiled fonts from
    /// an earlier --keep-workspace run (requires --workspace-dir)
    #[arg(long)]
    skip_font_build: bool,

    /// Write the classifier's reconstruction of each page to PNG files
    #[arg(long)]
    render_pages: bool,

    /// Stroke a red rectangle around every placed glyph in the output PDF
    #[arg(long)]
    draw_glyph_boxes: bool,

    /// Overwrite an existing output file without asking
    #[arg(short, long)]
    force: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.output.exists() && !cli.force && !confirm_overwrite(&cli.output) {
        eprintln!("error: output file {} already exists", cli.output.display());
        return ExitCode::from(GlyphpressError::InvalidInput(String::new()).exit_code());
    }

    let config = RunConfig {
        output: cli.output,
        inputs: cli.inputs,
        thresh: cli.thresh,
        weight: cli.weight,
        workspace_dir: cli.workspace_dir,
        keep_workspace: cli.keep_workspace,
        skip_font_build: cli.skip_font_build,
        render_pages: cli.render_pages,
        draw_glyph_boxes: cli.draw_glyph_boxes,
    };

    let engine = ExternalClassifier::default();
    let compiler = ExternalFontCompiler::default();
    let cancel = CancellationToken::new();

    match pipeline::run(&config, &engine, &compiler, &cancel) {
        Ok(output) => {
            tracing::info!(output = %output.display(), "Done");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

/// Ask before clobbering an existing output file. Anything but an explicit
/// yes declines.
fn confirm_overwrite(path: &std::path::Path) -> bool {
    print!("Output file {} already exists. Overwrite? (y/N) ", path.display());
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y")
}
