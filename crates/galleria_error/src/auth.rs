//! Access gate error types.

/// Reasons a request is refused before ingestion starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum AuthErrorKind {
    /// Uploads are switched off for this process
    #[display("Uploads are disabled")]
    UploadsDisabled,
    /// No session cookie was presented
    #[display("Not logged in!")]
    Unauthenticated,
    /// A session cookie was presented but matches no user
    #[display("Invalid Cookie")]
    Forbidden,
}

/// Authorization error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Auth Error: {} at line {} in {}", kind, line, file)]
pub struct AuthError {
    /// The kind of error that occurred
    pub kind: AuthErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl AuthError {
    /// Create a new auth error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AuthErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }
}
