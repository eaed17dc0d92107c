//! On-disk artifact store.
//!
//! All artifacts live flat in one directory (the system temp directory by
//! default). Writes go through a sibling temporary file that is renamed into
//! place, so a concurrent reader sees either the old file or the complete new
//! one. Nothing is ever expired: one rendered pair per day accumulates until
//! the directory is purged externally.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::raster::DisplayMode;

use super::key::{CacheKey, Stage, MIRROR_FILE_NAME};

/// Counter making temporary file names unique within the process.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

// =============================================================================
// ArtifactState
// =============================================================================

/// Most advanced artifact present for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    NoArtifact,
    HasRaw,
    HasCropped,
    HasRendered,
}

// =============================================================================
// ArtifactStore
// =============================================================================

/// Day-keyed artifact files in a single directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a store in the system temp directory.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the artifact for `stage` of `key`.
    pub fn path(&self, key: &CacheKey, stage: Stage) -> PathBuf {
        self.dir.join(key.file_name(stage))
    }

    /// Path of the stage-agnostic copy of the latest cropped image.
    pub fn mirror_path(&self) -> PathBuf {
        self.dir.join(MIRROR_FILE_NAME)
    }

    /// Whether the artifact for `stage` exists.
    pub fn exists(&self, key: &CacheKey, stage: Stage) -> bool {
        self.path(key, stage).is_file()
    }

    /// Most advanced artifact available for rendering `mode` on `key`'s day.
    pub fn probe(&self, key: &CacheKey, mode: DisplayMode) -> ArtifactState {
        if self.exists(key, Stage::Rendered(mode)) {
            ArtifactState::HasRendered
        } else if self.exists(key, Stage::Cropped) {
            ArtifactState::HasCropped
        } else if self.exists(key, Stage::Raw) {
            ArtifactState::HasRaw
        } else {
            ArtifactState::NoArtifact
        }
    }

    /// Read the artifact for `stage`.
    pub fn read(&self, key: &CacheKey, stage: Stage) -> Result<Vec<u8>, PipelineError> {
        let path = self.path(key, stage);
        fs::read(&path).map_err(|e| PipelineError::storage(&path, e))
    }

    /// Atomically write the artifact for `stage`, returning its path.
    pub fn write(&self, key: &CacheKey, stage: Stage, data: &[u8]) -> Result<PathBuf, PipelineError> {
        let path = self.path(key, stage);
        self.write_atomic(&path, data)?;
        debug!("Wrote {} ({} bytes)", path.display(), data.len());
        Ok(path)
    }

    /// Atomically replace the mirror file.
    pub fn write_mirror(&self, data: &[u8]) -> Result<PathBuf, PipelineError> {
        let path = self.mirror_path();
        self.write_atomic(&path, data)?;
        Ok(path)
    }

    /// Delete the artifact for `stage`.
    ///
    /// Returns `true` if a file was removed. Failures other than "not found"
    /// are logged and otherwise ignored.
    pub fn remove(&self, key: &CacheKey, stage: Stage) -> bool {
        let path = self.path(key, stage);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                warn!("Failed to remove {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Delete the raw and cropped artifacts of `key`.
    pub fn remove_intermediates(&self, key: &CacheKey) {
        for stage in [Stage::Raw, Stage::Cropped] {
            self.remove(key, stage);
        }
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), PipelineError> {
        fs::create_dir_all(&self.dir).map_err(|e| PipelineError::storage(&self.dir, e))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = self.dir.join(format!(
            ".{}.{}-{}.tmp",
            file_name,
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(e) = fs::write(&tmp, data) {
            let _ = fs::remove_file(&tmp);
            return Err(PipelineError::storage(&tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(PipelineError::storage(path, e));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
