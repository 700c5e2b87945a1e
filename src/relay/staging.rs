use crate::config::{StagingConfig, StagingNaming};
use crate::error::RelayError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// File name used by the single-slot staging policy
pub const FIXED_STAGING_FILE_NAME: &str = "captured_video.mp4";

/// Server-local directory holding uploads while they are forwarded
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
    naming: StagingNaming,
}

impl StagingArea {
    pub fn new(config: &StagingConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            naming: config.naming,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn naming(&self) -> StagingNaming {
        self.naming
    }

    fn next_path(&self) -> PathBuf {
        match self.naming {
            StagingNaming::Fixed => self.dir.join(FIXED_STAGING_FILE_NAME),
            StagingNaming::Unique => self.dir.join(format!("{}.mp4", Uuid::new_v4())),
        }
    }

    /// Write `data` to a fresh staging path; the returned guard owns the file
    pub async fn stage(&self, data: &[u8]) -> Result<StagedFile, RelayError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RelayError::Staging {
                path: self.dir.display().to_string(),
                source: e,
            })?;

        // Guard first so a failed write still gets cleaned up
        let staged = StagedFile {
            path: self.next_path(),
            released: false,
        };

        fs::write(&staged.path, data)
            .await
            .map_err(|e| RelayError::Staging {
                path: staged.path.display().to_string(),
                source: e,
            })?;

        debug!("Staged {} bytes at {}", data.len(), staged.path.display());
        Ok(staged)
    }
}

/// A staged upload that is deleted when released or dropped
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    released: bool,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the staged file
    pub async fn release(mut self) {
        self.released = true;
        match fs::remove_file(&self.path).await {
            Ok(()) => debug!("Removed staged file {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Staged file {} already gone", self.path.display())
            }
            Err(e) => warn!(
                "Failed to remove staged file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        // Blocking delete, reached only on cancellation or a failed write
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed staged file {} on drop", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove staged file {} on drop: {}",
                self.path.display(),
                e
            ),
        }
    }
}
