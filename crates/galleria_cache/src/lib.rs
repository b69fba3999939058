//! In-memory views over the content store.
//!
//! Two caches sit in front of the durable store so that requests never have
//! to rescan storage:
//!
//! - [`ExistenceCache`] answers "is this identifier known?"
//! - [`GalleryCache`] holds the browsable listing as an immutable snapshot
//!
//! Both are owned by the ingestion pipeline, which is their only writer, and
//! both live for the whole process.

#![warn(missing_docs)]

mod existence;
mod gallery;

pub use existence::ExistenceCache;
pub use gallery::{GalleryCache, GalleryEntry, GalleryView};
