//! Top-level error wrapper types.

use crate::{
    AuthError, ConfigError, ConversionError, MethodError, NotFoundError, StagingError,
    StorageError,
};

/// Every error the Galleria crates can produce.
///
/// # Examples
///
/// ```
/// use galleria_error::{ConfigError, GalleriaError, GalleriaErrorKind};
///
/// let err: GalleriaError = ConfigError::new("bad bind address").into();
/// assert!(matches!(err.kind(), GalleriaErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum GalleriaErrorKind {
    /// Upload body could not be staged
    #[from(StagingError)]
    Staging(StagingError),
    /// Staged upload could not be decoded or persisted
    #[from(ConversionError)]
    Conversion(ConversionError),
    /// Raw storage failure outside the ingestion path
    #[from(StorageError)]
    Storage(StorageError),
    /// Request refused by the access gate
    #[from(AuthError)]
    Auth(AuthError),
    /// Unsupported HTTP method
    #[from(MethodError)]
    Method(MethodError),
    /// Missing path reported by a lower layer
    #[from(NotFoundError)]
    NotFound(NotFoundError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Galleria error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Galleria Error: {}", _0)]
pub struct GalleriaError(Box<GalleriaErrorKind>);

impl GalleriaError {
    /// Create a new error from a kind.
    pub fn new(kind: GalleriaErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GalleriaErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to GalleriaErrorKind
impl<T> From<T> for GalleriaError
where
    T: Into<GalleriaErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Galleria operations.
///
/// # Examples
///
/// ```
/// use galleria_error::{GalleriaResult, NotFoundError};
///
/// fn lookup() -> GalleriaResult<String> {
///     Err(NotFoundError::new("www/content/tmp/123"))?
/// }
/// assert!(lookup().is_err());
/// ```
pub type GalleriaResult<T> = std::result::Result<T, GalleriaError>;
