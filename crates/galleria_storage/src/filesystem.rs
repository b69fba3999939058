//! Filesystem-based image storage implementation.
//!
//! This backend stores normalized PNGs in a content-addressable filesystem
//! structure, sharded by the leading characters of the content hash.

use crate::{ContentId, ImageStorage, StoredImage};
use chrono::{DateTime, Utc};
use galleria_error::{StorageError, StorageErrorKind, StorageResult};
use std::ffi::OsStr;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;

/// Extension of every stored artifact.
const EXTENSION: &str = "png";
/// Extension of in-flight writes.
const TEMP_EXTENSION: &str = "tmp";

/// Filesystem storage backend.
///
/// Stores images in a content-addressable structure:
/// `{base_path}/{hash[0:2]}/{hash[2:4]}/{hash}.png`
///
/// # Example Structure
///
/// ```text
/// www/content/image/
/// ├── ab/
/// │   └── cd/
/// │       └── abcdef123456....png
/// └── 12/
///     └── 34/
///         └── 123456abcdef....png
/// ```
///
/// # Features
///
/// - **Normalized**: Every upload is decoded and re-encoded as PNG before hashing
/// - **Automatic deduplication**: Same pixels = same hash = same file
/// - **Atomic placement**: Bytes go to a private temp file which is then hard
///   linked into place; the link fails if the artifact exists, so the first
///   writer wins and readers never see a partial file
#[derive(Debug)]
pub struct FileSystemStorage {
    base_path: PathBuf,
    sequence: AtomicU64,
}

impl FileSystemStorage {
    /// Open a filesystem storage backend.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn open(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Opened filesystem image storage");
        Ok(Self {
            base_path,
            sequence: AtomicU64::new(0),
        })
    }

    /// Root directory of the store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the filesystem path for a given identifier.
    ///
    /// Structure: `{base}/{hash[0:2]}/{hash[2:4]}/{hash}.png`
    pub fn artifact_path(&self, id: &ContentId) -> PathBuf {
        let (l1, l2) = id.shard();
        self.base_path
            .join(l1)
            .join(l2)
            .join(format!("{id}.{EXTENSION}"))
    }

    /// Decode arbitrary image bytes and re-encode them as PNG.
    ///
    /// The returned identifier is the digest of the PNG encoding, so it depends
    /// only on the decoded pixels, not on the container the client sent.
    pub fn normalize_bytes(data: &[u8]) -> StorageResult<(ContentId, Vec<u8>)> {
        let decoded = image::load_from_memory(data)
            .map_err(|e| StorageError::new(StorageErrorKind::Decode(e.to_string())))?;

        let mut png = Vec::new();
        decoded
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| StorageError::new(StorageErrorKind::Decode(e.to_string())))?;

        Ok((ContentId::digest(&png), png))
    }

    fn temp_path(&self, artifact: &Path) -> PathBuf {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        artifact.with_file_name(format!(
            "{name}.{}.{sequence}.{TEMP_EXTENSION}",
            std::process::id()
        ))
    }

    /// Write `png` to a temp file beside `artifact` that no other writer owns.
    async fn write_temp(&self, artifact: &Path, png: &[u8]) -> StorageResult<PathBuf> {
        let write_error = |path: &Path, e: std::io::Error| {
            StorageError::new(StorageErrorKind::FileWrite(format!("{}: {}", path.display(), e)))
        };

        let (temp_path, mut file) = loop {
            let temp_path = self.temp_path(artifact);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&temp_path)
                .await
            {
                Ok(file) => break (temp_path, file),
                // Another store on the same directory picked this name.
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(write_error(&temp_path, e)),
            }
        };

        let written = async {
            file.write_all(png).await?;
            file.flush().await
        }
        .await;
        drop(file);

        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
                tracing::warn!(path = %temp_path.display(), error = %cleanup, "Failed to remove temp artifact");
            }
            return Err(write_error(&temp_path, e));
        }

        Ok(temp_path)
    }

    /// Write `png` to `artifact` unless something is already there.
    ///
    /// Returns `true` if this call created the artifact.
    async fn place(&self, artifact: &Path, png: &[u8]) -> StorageResult<bool> {
        if let Some(parent) = artifact.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let temp_path = self.write_temp(artifact, png).await?;

        // Hard link is an atomic create-if-absent on the final name.
        let linked = tokio::fs::hard_link(&temp_path, artifact).await;

        if let Err(e) = tokio::fs::remove_file(&temp_path).await {
            tracing::warn!(path = %temp_path.display(), error = %e, "Failed to remove temp artifact");
        }

        match linked {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "link {} to {}: {}",
                temp_path.display(),
                artifact.display(),
                e
            )))),
        }
    }

    /// Remove temp files left in the shard directories by interrupted writes.
    ///
    /// Run at process start, before any upload is accepted.
    #[tracing::instrument(skip(self), fields(path = %self.base_path.display()))]
    pub fn sweep(&self) -> StorageResult<usize> {
        let mut removed = 0;

        for entry in walkdir::WalkDir::new(&self.base_path)
            .min_depth(3)
            .max_depth(3)
        {
            let entry = entry.map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    self.base_path.display(),
                    e
                )))
            })?;

            let path = entry.path();
            let is_temp = path.extension() == Some(OsStr::new(TEMP_EXTENSION));
            if !entry.file_type().is_file() || !is_temp {
                continue;
            }
            match std::fs::remove_file(path) {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove temp residue")
                }
            }
        }

        if removed > 0 {
            tracing::info!(removed, "Swept temp residue from content store");
        }
        Ok(removed)
    }

    fn scan(base_path: &Path) -> StorageResult<Vec<StoredImage>> {
        let mut images = Vec::new();

        for entry in walkdir::WalkDir::new(base_path).min_depth(3).max_depth(3) {
            let entry = entry.map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    base_path.display(),
                    e
                )))
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<ContentId>().ok())
            else {
                continue;
            };
            let (l1, l2) = id.shard();
            let in_shard = path.parent().and_then(|p| p.file_name()) == Some(OsStr::new(l2))
                && path
                    .parent()
                    .and_then(|p| p.parent())
                    .and_then(|p| p.file_name())
                    == Some(OsStr::new(l1));
            if !in_shard {
                tracing::debug!(path = %path.display(), "Skipping artifact outside its shard");
                continue;
            }

            let metadata = entry.metadata().map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            })?;
            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            images.push(StoredImage::new(
                id,
                path.to_path_buf(),
                metadata.len(),
                modified,
            ));
        }

        Ok(images)
    }
}

#[async_trait::async_trait]
impl ImageStorage for FileSystemStorage {
    #[tracing::instrument(skip(self, staged, known), fields(staged = %staged.display()))]
    async fn normalize_unless_known(
        &self,
        staged: &Path,
        known: &(dyn for<'k> Fn(&'k ContentId) -> bool + Send + Sync),
    ) -> StorageResult<ContentId> {
        let data = tokio::fs::read(staged).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(staged.display().to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    staged.display(),
                    e
                )))
            }
        })?;

        // The bytes are in memory now; the staged file is no longer needed
        // whether or not normalization succeeds.
        if let Err(e) = tokio::fs::remove_file(staged).await {
            tracing::warn!(path = %staged.display(), error = %e, "Failed to remove staged upload");
        }

        let (id, png) = tokio::task::spawn_blocking(move || Self::normalize_bytes(&data))
            .await
            .map_err(|e| {
                StorageError::new(StorageErrorKind::Decode(format!(
                    "normalization task failed: {}",
                    e
                )))
            })??;

        if known(&id) {
            tracing::debug!(hash = %id, "Image already known, skipping store");
            return Ok(id);
        }

        let artifact = self.artifact_path(&id);

        // If the artifact already exists, skip the write (deduplication)
        if tokio::fs::try_exists(&artifact).await.unwrap_or(false) {
            tracing::debug!(
                hash = %id,
                path = %artifact.display(),
                "Image already stored, skipping write"
            );
            return Ok(id);
        }

        if self.place(&artifact, &png).await? {
            tracing::info!(
                hash = %id,
                path = %artifact.display(),
                size = png.len(),
                "Stored image"
            );
        } else {
            tracing::debug!(
                hash = %id,
                path = %artifact.display(),
                "Concurrent writer stored image first"
            );
        }

        Ok(id)
    }

    #[tracing::instrument(skip(self, id), fields(hash = %id))]
    async fn contains(&self, id: &ContentId) -> bool {
        tokio::fs::try_exists(self.artifact_path(id))
            .await
            .unwrap_or(false)
    }

    #[tracing::instrument(skip(self), fields(path = %self.base_path.display()))]
    async fn list(&self) -> StorageResult<Vec<StoredImage>> {
        let base_path = self.base_path.clone();
        let images = tokio::task::spawn_blocking(move || Self::scan(&base_path))
            .await
            .map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "listing task failed: {}",
                    e
                )))
            })??;

        tracing::debug!(count = images.len(), "Listed stored images");
        Ok(images)
    }
}
