//! Errors raised while turning a staged upload into a stored image.

use crate::StorageError;

/// A staged upload could not be normalized or persisted.
///
/// Wraps the underlying [`StorageError`] so callers can distinguish a missing
/// path (mapped to "not found" at the HTTP boundary) from any other failure.
///
/// # Examples
///
/// ```
/// use galleria_error::{ConversionError, StorageError, StorageErrorKind};
///
/// let err = ConversionError::new(StorageError::new(StorageErrorKind::Decode(
///     "unsupported format".to_string(),
/// )));
/// assert!(!err.is_not_found());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Conversion Error: {} at line {} in {}", source, line, file)]
pub struct ConversionError {
    /// Storage failure that aborted the conversion
    pub source: StorageError,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ConversionError {
    /// Wrap a storage error with automatic location tracking.
    #[track_caller]
    pub fn new(source: StorageError) -> Self {
        let location = std::panic::Location::caller();
        Self {
            source,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Returns `true` if the conversion failed because a path was missing.
    pub fn is_not_found(&self) -> bool {
        self.source.is_not_found()
    }
}

impl From<StorageError> for ConversionError {
    #[track_caller]
    fn from(err: StorageError) -> Self {
        Self::new(err)
    }
}
