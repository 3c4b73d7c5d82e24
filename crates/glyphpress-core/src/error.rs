// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Glyphpress.
//
// Every fatal condition in the pipeline maps to exactly one variant, and every
// variant maps to a distinct non-zero process exit code. Nothing in the core
// recovers locally: errors propagate to the binary, which prints the
// diagnostic and terminates with the variant's exit code.

use thiserror::Error;

/// Top-level error type for all Glyphpress operations.
#[derive(Debug, Error)]
pub enum GlyphpressError {
    // -- Input validation --
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // -- Image handling --
    #[error("image processing failed: {0}")]
    Image(String),

    // -- External collaborators --
    #[error("symbol classification failed: {0}")]
    Classification(String),

    #[error("font compilation failed: {0}")]
    FontCompiler(String),

    #[error("document backend error: {0}")]
    Backend(String),

    // -- Workspace / filesystem --
    #[error("workspace error: {0}")]
    Workspace(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    // -- Cancellation --
    #[error("operation cancelled")]
    Cancelled,
}

impl GlyphpressError {
    /// Process exit code for this error class.
    ///
    /// Each class gets a distinct non-zero code so scripted callers can tell
    /// a bad invocation apart from a collaborator failure. Cancellation uses
    /// 130 by analogy with SIGINT termination.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidInput(_) => 2,
            Self::Image(_) | Self::Classification(_) => 3,
            Self::FontCompiler(_) => 4,
            Self::Backend(_) => 5,
            Self::Workspace(_) => 6,
            Self::Io(_) => 7,
            Self::Cancelled => 130,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GlyphpressError>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Every error class must terminate with a non-zero exit code.
    #[test]
    fn exit_codes_are_nonzero_and_distinct() {
        let errors = [
            GlyphpressError::InvalidInput("x".into()),
            GlyphpressError::FontCompiler("x".into()),
            GlyphpressError::Backend("x".into()),
            GlyphpressError::Workspace("x".into()),
            GlyphpressError::Cancelled,
        ];
        let codes: Vec<u8> = errors.iter().map(|e| e.exit_code()).collect();
        assert!(codes.iter().all(|&c| c != 0));
        let mut unique = codes.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), codes.len());
    }

    /// Image and classification failures share one class (external input
    /// defects) and therefore one code.
    #[test]
    fn image_and_classification_share_a_code() {
        assert_eq!(
            GlyphpressError::Image("x".into()).exit_code(),
            GlyphpressError::Classification("x".into()).exit_code()
        );
    }
}
