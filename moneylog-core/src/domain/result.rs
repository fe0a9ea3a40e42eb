//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A record failed structural constraints before reaching storage
    #[error("Validation error: {0}")]
    Validation(String),

    /// A backup document could not be decoded
    #[error("Format error: {0}")]
    Format(String),

    /// An aggregate left the representable decimal range
    #[error("Overflow: {0}")]
    Overflow(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a format error
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Create an overflow error
    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::Overflow(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::Overflow(_))
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::validation("amount is not a number");
        assert_eq!(err.to_string(), "Validation error: amount is not a number");

        let err = Error::format("expected a JSON array");
        assert_eq!(err.to_string(), "Format error: expected a JSON array");
    }

    #[test]
    fn test_error_kind_helpers() {
        assert!(Error::validation("x").is_validation());
        assert!(Error::format("x").is_format());
        assert!(Error::not_found("x").is_not_found());
        assert!(!Error::database("x").is_not_found());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.to_string().starts_with("JSON error"));
    }
}
