//! Membership cache over known content identifiers.

use galleria_storage::ContentId;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Default)]
struct Members {
    order: Vec<ContentId>,
    index: HashSet<ContentId>,
}

/// Set of identifiers known to exist in the content store.
///
/// Keeps insertion order and never holds the same identifier twice. May lag
/// behind the store; it is a shortcut, not the source of truth. Ingestion
/// hands [`contains`](Self::contains) to the store so re-uploads of known
/// content skip the store's own existence probe.
///
/// # Example
///
/// ```
/// use galleria_cache::ExistenceCache;
/// use galleria_storage::ContentId;
///
/// let cache = ExistenceCache::default();
/// let id = ContentId::digest(b"png bytes");
///
/// assert!(cache.add(id.clone()));
/// assert!(!cache.add(id.clone()));
/// assert!(cache.contains(&id));
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ExistenceCache {
    members: RwLock<Members>,
}

impl ExistenceCache {
    /// Warm the cache from a durable listing. Duplicates are collapsed.
    pub fn from_ids(ids: impl IntoIterator<Item = ContentId>) -> Self {
        let cache = Self::default();
        {
            let mut members = cache.members.write();
            for id in ids {
                if members.index.insert(id.clone()) {
                    members.order.push(id);
                }
            }
        }
        tracing::debug!(size = cache.len(), "Warmed existence cache");
        cache
    }

    /// Whether `id` is known.
    pub fn contains(&self, id: &ContentId) -> bool {
        self.members.read().index.contains(id)
    }

    /// Record `id`. Returns `false` if it was already present.
    #[tracing::instrument(skip(self), fields(hash = %id))]
    pub fn add(&self, id: ContentId) -> bool {
        let mut members = self.members.write();
        if !members.index.insert(id.clone()) {
            tracing::debug!("Identifier already cached");
            return false;
        }
        members.order.push(id);
        tracing::debug!(size = members.order.len(), "Cached new identifier");
        true
    }

    /// Number of known identifiers.
    pub fn len(&self) -> usize {
        self.members.read().order.len()
    }

    /// Check if no identifiers are known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Known identifiers in insertion order.
    pub fn ids(&self) -> Vec<ContentId> {
        self.members.read().order.clone()
    }
}
