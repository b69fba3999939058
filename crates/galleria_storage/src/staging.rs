//! Temporary landing area for raw upload bytes.

use galleria_error::{StagingError, StagingErrorKind, StorageError, StorageErrorKind, StorageResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::io::AsyncWriteExt;

/// Directory where uploads are written before normalization.
///
/// Staged files are named `{unix_nanos}-{sequence}`. The sequence number is
/// per area, so two uploads in the same clock tick still get distinct names,
/// and files are created exclusively so a collision fails instead of clobbering.
#[derive(Debug)]
pub struct StagingArea {
    dir: PathBuf,
    sequence: AtomicU64,
}

/// Raw upload bytes sitting at a unique temporary path.
///
/// Consumed by [`ImageStorage::normalize`](crate::ImageStorage::normalize),
/// which removes the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpload {
    path: PathBuf,
    len: u64,
}

impl StagedUpload {
    /// Temporary path holding the bytes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of bytes staged.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the staged file holds no bytes. Never true for a successful stage.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl StagingArea {
    /// Open a staging area, creating the directory if needed.
    #[tracing::instrument(skip(dir))]
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;

        tracing::debug!(path = %dir.display(), "Opened staging area");
        Ok(Self {
            dir,
            sequence: AtomicU64::new(0),
        })
    }

    /// Directory staged files are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_path(&self) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!("{nanos}-{sequence}"))
    }

    /// Write upload bytes to a fresh temporary file.
    ///
    /// Empty uploads are rejected. On failure nothing is left behind.
    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    pub async fn stage(&self, data: &[u8]) -> Result<StagedUpload, StagingError> {
        if data.is_empty() {
            return Err(StagingError::new(StagingErrorKind::Empty));
        }

        let path = self.next_path();
        let write_error = |e: std::io::Error| {
            StagingError::new(StagingErrorKind::Write {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        };

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(write_error)?;

        let written = async {
            file.write_all(data).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                tracing::warn!(path = %path.display(), error = %cleanup, "Failed to remove partial staged upload");
            }
            return Err(write_error(e));
        }

        tracing::debug!(path = %path.display(), size = data.len(), "Staged upload");
        Ok(StagedUpload {
            path,
            len: data.len() as u64,
        })
    }

    /// Remove every file left in the staging directory.
    ///
    /// Run at process start, before any upload is accepted, to clear residue
    /// from uploads interrupted by a previous shutdown.
    #[tracing::instrument(skip(self), fields(path = %self.dir.display()))]
    pub fn sweep(&self) -> StorageResult<usize> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                self.dir.display(),
                e
            )))
        })?;

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove staging residue")
                }
            }
        }

        if removed > 0 {
            tracing::info!(removed, "Swept staging residue");
        }
        Ok(removed)
    }
}
