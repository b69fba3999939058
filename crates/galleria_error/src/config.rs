//! Errors from loading server configuration and the users file.

/// Configuration could not be loaded, parsed or applied.
///
/// Also covers logging setup, which is driven by configuration.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Record a configuration failure at the caller's location.
    ///
    /// # Examples
    ///
    /// ```
    /// use galleria_error::ConfigError;
    ///
    /// let bind = "localhost:http";
    /// let err = ConfigError::new(format!("Invalid bind address '{}'", bind));
    /// assert!(err.message.contains("localhost:http"));
    /// assert!(err.to_string().starts_with("Configuration Error: Invalid bind address"));
    /// ```
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
