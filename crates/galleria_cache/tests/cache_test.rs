//! Tests for the existence and gallery caches.

use chrono::{Duration, Utc};
use galleria_cache::{ExistenceCache, GalleryCache};
use galleria_storage::{ContentId, StoredImage};
use std::path::PathBuf;
use std::sync::Arc;

fn image(seed: &str, age_secs: i64) -> StoredImage {
    StoredImage::new(
        ContentId::digest(seed.as_bytes()),
        PathBuf::from(format!("/store/{seed}.png")),
        128,
        Utc::now() - Duration::seconds(age_secs),
    )
}

#[test]
fn test_existence_add_is_idempotent() {
    let cache = ExistenceCache::default();
    let id = ContentId::digest(b"one");

    assert!(cache.add(id.clone()));
    assert!(!cache.add(id.clone()));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.ids(), vec![id]);
}

#[test]
fn test_existence_keeps_insertion_order() {
    let a = ContentId::digest(b"a");
    let b = ContentId::digest(b"b");
    let c = ContentId::digest(b"c");

    let cache = ExistenceCache::from_ids([b.clone(), a.clone(), b.clone()]);
    cache.add(c.clone());

    assert_eq!(cache.ids(), vec![b, a, c]);
    assert!(!cache.contains(&ContentId::digest(b"missing")));
}

#[test]
fn test_existence_concurrent_adds() {
    let cache = Arc::new(ExistenceCache::default());
    let ids: Vec<_> = (0..16u8).map(|i| ContentId::digest(&[i])).collect();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let ids = ids.clone();
            std::thread::spawn(move || {
                for id in ids {
                    cache.add(id);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), ids.len());
}

#[test]
fn test_gallery_starts_empty() {
    let cache = GalleryCache::empty();
    let view = cache.current();

    assert!(view.is_empty());
    assert_eq!(*view.generation(), 0);
}

#[test]
fn test_gallery_rebuild_orders_newest_first() {
    let cache = GalleryCache::empty();
    let old = image("old", 600);
    let new = image("new", 5);

    let view = cache.rebuild(vec![old.clone(), new.clone()]);

    let ids: Vec<_> = view.entries().iter().map(|e| e.id().clone()).collect();
    assert_eq!(ids, vec![new.id().clone(), old.id().clone()]);
}

#[test]
fn test_gallery_rebuild_replaces_snapshot() {
    let cache = GalleryCache::empty();
    let first = cache.rebuild(vec![image("a", 10)]);

    let held = cache.current();
    let added = image("b", 1);
    let second = cache.rebuild(vec![image("a", 10), added.clone()]);

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&cache.current(), &second));
    assert!(second.contains(added.id()));
    assert!(*second.generation() > *first.generation());

    // Readers holding the previous snapshot still see it unchanged.
    assert_eq!(held.len(), 1);
    assert!(!held.contains(added.id()));
}

#[test]
fn test_gallery_concurrent_readers_never_see_partial_view() {
    let cache = Arc::new(GalleryCache::empty());
    let sizes = [0usize, 3, 7];

    let reader = {
        let cache = Arc::clone(&cache);
        std::thread::spawn(move || {
            for _ in 0..1000 {
                let view = cache.current();
                assert!(sizes.contains(&view.len()));
            }
        })
    };

    for round in 0..50 {
        let size = sizes[1 + round % 2];
        let images = (0..size).map(|i| image(&format!("{round}-{i}"), i as i64)).collect();
        cache.rebuild(images);
    }
    reader.join().unwrap();
}

#[test]
fn test_gallery_view_serializes() {
    let cache = GalleryCache::empty();
    let view = cache.rebuild(vec![image("a", 1)]);

    let json = serde_json::to_value(&*view).unwrap();
    assert_eq!(json["generation"], 1);
    assert_eq!(json["entries"][0]["id"], view.entries()[0].id().as_str());
    assert!(json["entries"][0].get("path").is_none());
}
