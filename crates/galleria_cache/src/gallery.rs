//! Read-optimized snapshot of the browsable image set.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use galleria_storage::{ContentId, StoredImage};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// One image in the gallery listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct GalleryEntry {
    /// Content identifier of the image
    id: ContentId,
    /// Size of the stored artifact in bytes
    size_bytes: u64,
    /// When the artifact was written
    modified: DateTime<Utc>,
}

impl From<StoredImage> for GalleryEntry {
    fn from(image: StoredImage) -> Self {
        Self {
            id: image.id().clone(),
            size_bytes: *image.size_bytes(),
            modified: *image.modified(),
        }
    }
}

/// Immutable gallery snapshot.
///
/// Entries are ordered newest first, ties broken by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct GalleryView {
    /// Monotonic rebuild counter; 0 for the initial empty view
    generation: u64,
    /// When this snapshot was built
    built_at: DateTime<Utc>,
    /// Images in display order
    entries: Vec<GalleryEntry>,
}

impl GalleryView {
    fn empty() -> Self {
        Self {
            generation: 0,
            built_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Whether the snapshot lists `id`.
    pub fn contains(&self, id: &ContentId) -> bool {
        self.entries.iter().any(|e| &e.id == id)
    }

    /// Number of images in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the snapshot lists no images.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Holder of the current [`GalleryView`].
///
/// A rebuild constructs a whole new view and then swaps the shared pointer, so
/// readers holding the old `Arc` keep a consistent snapshot and never observe
/// a half-built one.
#[derive(Debug)]
pub struct GalleryCache {
    current: RwLock<Arc<GalleryView>>,
    generation: AtomicU64,
}

impl Default for GalleryCache {
    fn default() -> Self {
        Self::empty()
    }
}

impl GalleryCache {
    /// Create a cache holding an empty generation-0 view.
    pub fn empty() -> Self {
        Self {
            current: RwLock::new(Arc::new(GalleryView::empty())),
            generation: AtomicU64::new(0),
        }
    }

    /// Replace the snapshot with one built from `images`.
    ///
    /// `images` must come from the authoritative store listing.
    #[tracing::instrument(skip(self, images), fields(count = images.len()))]
    pub fn rebuild(&self, images: Vec<StoredImage>) -> Arc<GalleryView> {
        let mut entries: Vec<GalleryEntry> = images.into_iter().map(GalleryEntry::from).collect();
        entries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.id.cmp(&b.id)));

        let view = Arc::new(GalleryView {
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
            built_at: Utc::now(),
            entries,
        });

        *self.current.write() = Arc::clone(&view);
        tracing::debug!(generation = view.generation, size = view.len(), "Rebuilt gallery cache");
        view
    }

    /// Latest snapshot.
    pub fn current(&self) -> Arc<GalleryView> {
        Arc::clone(&self.current.read())
    }
}
