//! Upload ingestion: stage, normalize, then refresh the caches.

use galleria_cache::{ExistenceCache, GalleryCache};
use galleria_error::{ConversionError, GalleriaResult};
use galleria_storage::{ContentId, ImageStorage, StagingArea};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Orchestrates a single upload from raw bytes to a cached identifier.
///
/// The pipeline owns both caches and is their only writer. Cache maintenance
/// after a successful write is serialized through an internal lock, so
/// concurrent uploads of different content can stage and normalize in
/// parallel but update the caches one at a time.
pub struct IngestionPipeline {
    staging: StagingArea,
    store: Arc<dyn ImageStorage>,
    existence: ExistenceCache,
    gallery: GalleryCache,
    writer: Mutex<()>,
}

impl std::fmt::Debug for IngestionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("staging", &self.staging)
            .field("existence", &self.existence.len())
            .field("gallery", &self.gallery.current().len())
            .finish()
    }
}

impl IngestionPipeline {
    /// Build a pipeline with caches warmed from the store.
    ///
    /// Clears staging residue first, then lists the store once to seed both
    /// the existence cache and the first gallery snapshot.
    #[tracing::instrument(skip_all)]
    pub async fn bootstrap(
        store: Arc<dyn ImageStorage>,
        staging: StagingArea,
    ) -> GalleriaResult<Self> {
        staging.sweep()?;

        let images = store.list().await?;
        let existence = ExistenceCache::from_ids(images.iter().map(|i| i.id().clone()));
        let gallery = GalleryCache::empty();
        gallery.rebuild(images);

        tracing::info!(images = existence.len(), "Ingestion pipeline ready");
        Ok(Self {
            staging,
            store,
            existence,
            gallery,
            writer: Mutex::new(()),
        })
    }

    /// Existence cache maintained by this pipeline.
    pub fn existence(&self) -> &ExistenceCache {
        &self.existence
    }

    /// Gallery cache maintained by this pipeline.
    pub fn gallery(&self) -> &GalleryCache {
        &self.gallery
    }

    /// Ingest one uploaded file and return its content identifier.
    ///
    /// Staging and conversion failures abort before either cache is touched.
    /// Once the image is durable the call succeeds; cache maintenance problems
    /// after that point are logged, not returned.
    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    pub async fn ingest(&self, data: &[u8]) -> GalleriaResult<ContentId> {
        let staged = self.staging.stage(data).await?;

        let id = self
            .store
            .normalize_unless_known(staged.path(), &|id| self.existence.contains(id))
            .await
            .map_err(ConversionError::new)?;

        self.refresh_caches(&id).await;
        tracing::info!(hash = %id, "Ingested upload");
        Ok(id)
    }

    async fn refresh_caches(&self, id: &ContentId) {
        let _writer = self.writer.lock().await;

        if !self.existence.add(id.clone()) {
            tracing::debug!(hash = %id, "Upload matched a known image");
        }

        // Always rebuild from the store, even for known images, so the gallery
        // also picks up changes made outside this process.
        match self.store.list().await {
            Ok(images) => {
                let view = self.gallery.rebuild(images);
                if !view.contains(id) {
                    tracing::error!(
                        hash = %id,
                        generation = *view.generation(),
                        "Gallery rebuild is missing a freshly stored image"
                    );
                }
            }
            Err(e) => {
                tracing::error!(
                    hash = %id,
                    error = %e,
                    "Gallery rebuild failed after a durable write; serving previous snapshot"
                );
            }
        }
    }
}
