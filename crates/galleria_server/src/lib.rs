//! Upload ingestion server for Galleria.
//!
//! Accepts image uploads over HTTP, deduplicates them through the
//! content-addressed store, and keeps the existence and gallery caches in step
//! with what has been stored.
//!
//! # Request Flow
//!
//! 1. [`AccessGate`] checks the upload feature flag and the session cookie
//! 2. [`IngestionPipeline`] stages the file, hands it to the content store,
//!    then refreshes both caches
//! 3. The identifier comes back in the `X-Image-Hash` header of a `201 Created`
//!
//! # Example
//!
//! ```rust,no_run
//! use galleria_server::{
//!     AccessGate, ApiState, IngestionPipeline, ServerConfig, UserDirectory, create_router,
//! };
//! use galleria_storage::{FileSystemStorage, StagingArea};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::load(None)?;
//! let store = Arc::new(FileSystemStorage::open(&config.content_dir)?);
//! store.sweep()?;
//! let staging = StagingArea::open(&config.staging_dir)?;
//! let pipeline = Arc::new(IngestionPipeline::bootstrap(store, staging).await?);
//!
//! let gate = AccessGate::new(config.allow_upload, UserDirectory::from_file(&config.users_file)?);
//! let app = create_router(ApiState::new(
//!     pipeline,
//!     gate,
//!     config.cookie_name.as_str(),
//!     config.max_upload_bytes,
//! ));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod config;
mod gate;
mod observability;
mod pipeline;
mod response;
mod users;

pub use api::{ApiState, UPLOAD_FIELD, create_router};
pub use config::ServerConfig;
pub use gate::{AccessGate, Authorization};
pub use observability::init_logging;
pub use pipeline::IngestionPipeline;
pub use response::{IMAGE_HASH_HEADER, SERVER_MESSAGE_HEADER, ServerMessage};
pub use users::{User, UserDirectory};
