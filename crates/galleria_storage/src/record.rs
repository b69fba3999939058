//! Stored image records.

use crate::ContentId;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::Serialize;
use std::path::PathBuf;

/// A durable artifact found in the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct StoredImage {
    /// Identifier the artifact is stored under
    id: ContentId,
    /// Location of the normalized PNG
    #[serde(skip)]
    path: PathBuf,
    /// Size of the normalized PNG in bytes
    size_bytes: u64,
    /// Last modification time reported by the filesystem
    modified: DateTime<Utc>,
}

impl StoredImage {
    /// Create a record for an artifact.
    pub fn new(id: ContentId, path: PathBuf, size_bytes: u64, modified: DateTime<Utc>) -> Self {
        Self {
            id,
            path,
            size_bytes,
            modified,
        }
    }
}
