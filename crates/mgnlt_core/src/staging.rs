//! Staging directory lifecycle.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::CoreResult;

/// The `Original/` and `Modified/` directories used as an editing buffer.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root_path: PathBuf,
}

impl StagingArea {
    /// Directory name for provider snapshots.
    pub const ORIGINAL_DIR: &'static str = "Original";

    /// Directory name for hand-edited copies.
    pub const MODIFIED_DIR: &'static str = "Modified";

    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn original_dir(&self) -> PathBuf {
        self.root_path.join(Self::ORIGINAL_DIR)
    }

    pub fn modified_dir(&self) -> PathBuf {
        self.root_path.join(Self::MODIFIED_DIR)
    }

    /// Create both directories if they are missing.
    pub fn ensure(&self) -> CoreResult<()> {
        for dir in [self.original_dir(), self.modified_dir()] {
            if !dir.exists() {
                debug!("Creating staging directory {:?}", dir);
            }
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    /// Remove both directories and the entries directly inside them.
    ///
    /// Only one level is removed: a subdirectory that is not empty makes this fail.
    pub fn cleanup(&self) -> CoreResult<()> {
        for dir in [self.original_dir(), self.modified_dir()] {
            if !dir.exists() {
                continue;
            }

            info!("Removing staging directory {:?}", dir);
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let path = entry.path();
                // Symlinks are unlinked, never followed.
                if entry.file_type()?.is_dir() {
                    fs::remove_dir(&path)?;
                } else {
                    fs::remove_file(&path)?;
                }
            }
            fs::remove_dir(&dir)?;
        }
        Ok(())
    }
}
