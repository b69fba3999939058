//! Error types for the Galleria image ingestion service.
//!
//! This crate provides the foundation error types used throughout the Galleria workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! The ingestion path only ever surfaces two of them to callers:
//! [`StagingError`] when the upload body could not be written to the staging
//! area, and [`ConversionError`] when the content store could not decode or
//! persist the staged file.
//!
//! # Examples
//!
//! ```
//! use galleria_error::{GalleriaResult, StagingError, StagingErrorKind};
//!
//! fn stage() -> GalleriaResult<()> {
//!     Err(StagingError::new(StagingErrorKind::Empty))?
//! }
//!
//! match stage() {
//!     Ok(_) => println!("Staged"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod config;
mod conversion;
mod error;
mod http;
mod staging;
mod storage;

pub use auth::{AuthError, AuthErrorKind};
pub use config::ConfigError;
pub use conversion::ConversionError;
pub use error::{GalleriaError, GalleriaErrorKind, GalleriaResult};
pub use http::{MethodError, NotFoundError};
pub use staging::{StagingError, StagingErrorKind};
pub use storage::{StorageError, StorageErrorKind, StorageResult};
