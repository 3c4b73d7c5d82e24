// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Workspace manager — lifecycle of the temporary staging tree.
//
// Layout under the workspace root:
//
//   <root>/<font index as %08>/        glyph images for one font
//   <root>/<font index as %08>/<code point as %03>.png
//   <root>/<font index as %08>.ttf    compiled font artifact
//
// The glyph asset builder writes the tree, the page compositor reads it,
// and `release` deletes it unless retention was requested. A workspace
// acquired at an explicit path is reusable across runs (staged/debug mode);
// one acquired in the system temp dir is owned and removed on drop if the
// caller never released it.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use glyphpress_core::error::{GlyphpressError, Result};

/// Prefix for workspaces created under the system temp directory.
const TEMP_PREFIX: &str = "glyphpress_";

/// A staging directory tree with tracked ownership.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    /// Whether this process created the root as a fresh temp allocation.
    /// Explicit paths are never auto-freed.
    owned: bool,
    released: bool,
}

impl Workspace {
    /// Acquire a workspace root.
    ///
    /// With `None`, a uniquely named directory is created under the system
    /// temp location. With an explicit path, the directory is created if
    /// absent and reused if it already exists.
    pub fn acquire(explicit: Option<PathBuf>) -> Result<Self> {
        match explicit {
            None => {
                let dir = tempfile::Builder::new()
                    .prefix(TEMP_PREFIX)
                    .tempdir()
                    .map_err(|err| {
                        GlyphpressError::Workspace(format!(
                            "cannot create temp workspace: {err}"
                        ))
                    })?;
                // Deletion is managed here, not by the tempfile guard, so
                // that cleanup failures surface through `release`.
                let root = dir.keep();
                info!(root = %root.display(), "Workspace created");
                Ok(Self {
                    root,
                    owned: true,
                    released: false,
                })
            }
            Some(path) => {
                match std::fs::create_dir(&path) {
                    Ok(()) => debug!(root = %path.display(), "Workspace directory created"),
                    Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                        debug!(root = %path.display(), "Reusing existing workspace")
                    }
                    Err(err) => {
                        return Err(GlyphpressError::Workspace(format!(
                            "cannot create workspace {}: {}",
                            path.display(),
                            err
                        )));
                    }
                }
                Ok(Self {
                    root: path,
                    owned: false,
                    released: false,
                })
            }
        }
    }

    /// The workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Glyph staging directory for one font.
    pub fn font_dir(&self, font_index: u32) -> PathBuf {
        self.root.join(format!("{font_index:08}"))
    }

    /// Path of one glyph image inside its font's staging directory.
    pub fn glyph_path(&self, font_index: u32, code_point: u8) -> PathBuf {
        self.font_dir(font_index).join(format!("{code_point:03}.png"))
    }

    /// Path of one compiled font artifact.
    pub fn font_path(&self, font_index: u32) -> PathBuf {
        self.root.join(format!("{font_index:08}.ttf"))
    }

    /// Release the workspace.
    ///
    /// Unless `retain` is set, the whole tree is removed recursively; a
    /// removal failure is a fatal workspace error, never silently partial.
    pub fn release(mut self, retain: bool) -> Result<()> {
        self.released = true;
        if retain {
            info!(root = %self.root.display(), "Workspace retained");
            return Ok(());
        }
        std::fs::remove_dir_all(&self.root).map_err(|err| {
            GlyphpressError::Workspace(format!(
                "cannot clean up workspace {}: {}",
                self.root.display(),
                err
            ))
        })?;
        info!(root = %self.root.display(), "Workspace removed");
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        // Error-path safety net for owned temp allocations only; explicit
        // paths belong to the caller.
        if !self.released && self.owned {
            if let Err(err) = std::fs::remove_dir_all(&self.root) {
                warn!(
                    root = %self.root.display(),
                    %err,
                    "Failed to remove abandoned workspace"
                );
            }
        }
    }
}
