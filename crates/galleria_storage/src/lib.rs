//! Content-addressable image storage for Galleria.
//!
//! This crate owns the durable side of ingestion: a staging area where raw
//! upload bytes land first, and a content store that normalizes a staged file
//! into a canonical PNG and places it at a path derived from its own hash.
//!
//! # Features
//!
//! - **Content-addressable storage**: Images stored by SHA-256 of their normalized PNG encoding
//! - **Automatic deduplication**: Same pixels = same identifier = same file
//! - **First writer wins**: Final placement uses an atomic hard link, so concurrent
//!   writers of identical content never overwrite or corrupt each other
//! - **Pluggable backends**: Trait-based abstraction over the filesystem store
//!
//! # Example
//!
//! ```rust,no_run
//! use galleria_storage::{FileSystemStorage, ImageStorage, StagingArea};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let staging = StagingArea::open("/tmp/galleria/tmp")?;
//! let storage = FileSystemStorage::open("/tmp/galleria/image")?;
//!
//! let png = std::fs::read("cat.png")?;
//! let staged = staging.stage(&png).await?;
//! let id = storage.normalize(staged.path()).await?;
//! assert!(storage.contains(&id).await);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod id;
mod record;
mod staging;

pub use filesystem::FileSystemStorage;
pub use galleria_error::{StorageError, StorageErrorKind, StorageResult};
pub use id::ContentId;
pub use record::StoredImage;
pub use staging::{StagedUpload, StagingArea};

use std::path::Path;

/// Trait for pluggable image storage backends.
///
/// Implementations are the only writers of durable image artifacts.
#[async_trait::async_trait]
pub trait ImageStorage: Send + Sync {
    /// Turn a staged upload into a stored image and return its identifier.
    ///
    /// The implementation should:
    /// - Decode the staged bytes as an image
    /// - Compute the identifier from the normalized content
    /// - Write the artifact unless one already exists for that identifier
    /// - Remove the staged file
    ///
    /// Calls with different staged paths that resolve to the same identifier
    /// must all succeed, with exactly one physical write.
    async fn normalize(&self, staged: &Path) -> StorageResult<ContentId> {
        self.normalize_unless_known(staged, &|_| false).await
    }

    /// Like [`normalize`](Self::normalize), but consults `known` once the
    /// identifier is computed. When it returns `true` the store is not
    /// touched beyond consuming the staged file.
    async fn normalize_unless_known(
        &self,
        staged: &Path,
        known: &(dyn for<'k> Fn(&'k ContentId) -> bool + Send + Sync),
    ) -> StorageResult<ContentId>;

    /// Check if an artifact exists for `id`.
    async fn contains(&self, id: &ContentId) -> bool;

    /// List every stored image.
    ///
    /// This is the authoritative view of the store and is what the gallery is
    /// rebuilt from.
    async fn list(&self) -> StorageResult<Vec<StoredImage>>;
}
