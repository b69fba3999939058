//! Errors raised while staging an upload to a temporary location.

/// Kinds of staging errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StagingErrorKind {
    /// Request body could not be parsed as multipart form data
    #[display("Malformed multipart body: {}", _0)]
    Multipart(String),
    /// The form did not contain the expected file field
    #[display("Missing form field '{}'", _0)]
    MissingField(String),
    /// The uploaded file contained no bytes
    #[display("Uploaded file is empty")]
    Empty,
    /// The staged file could not be written
    #[display("Failed to write staged upload {}: {}", path, reason)]
    Write {
        /// Temporary path that was being written
        path: String,
        /// Underlying I/O failure
        reason: String,
    },
}

/// Staging error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Staging Error: {} at line {} in {}", kind, line, file)]
pub struct StagingError {
    /// The kind of error that occurred
    pub kind: StagingErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StagingError {
    /// Create a new staging error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StagingErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StagingErrorKind {
        &self.kind
    }
}
