//! HTTP boundary error types.

/// Request used a method the endpoint does not serve.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Method Error: {} on {} at line {} in {}", method, path, line, file)]
pub struct MethodError {
    /// Offending HTTP method
    pub method: String,
    /// Path the request targeted
    pub path: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl MethodError {
    /// Create a new MethodError at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use galleria_error::MethodError;
    ///
    /// let err = MethodError::new("GET", "/api/upload");
    /// assert_eq!(err.method, "GET");
    /// ```
    #[track_caller]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            method: method.into(),
            path: path.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}

/// A lower layer reported a missing path.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Not Found: {} at line {} in {}", message, line, file)]
pub struct NotFoundError {
    /// Description of what was missing
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl NotFoundError {
    /// Create a new NotFoundError with the given message at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
