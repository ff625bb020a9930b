//! Error types for docintel.
//!
//! Library crates use [`DocIntelError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docintel operations.
#[derive(Debug, thiserror::Error)]
pub enum DocIntelError {
    /// Configuration loading, job input parsing, or path resolution error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// PDF loading or text extraction error.
    #[error("pdf error: {0}")]
    Pdf(String),

    /// Record validation error (empty filename, page 0, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// JSON serialization error when writing the result artifact.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocIntelError>;

impl DocIntelError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a PDF error from any displayable message.
    pub fn pdf(msg: impl Into<String>) -> Self {
        Self::Pdf(msg.into())
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DocIntelError::config("missing field `persona`");
        assert_eq!(err.to_string(), "config error: missing field `persona`");

        let err = DocIntelError::validation("heading page must be >= 1");
        assert!(err.to_string().contains("page must be"));

        let err = DocIntelError::pdf("trailer not found");
        assert_eq!(err.to_string(), "pdf error: trailer not found");
    }

    #[test]
    fn io_error_keeps_path() {
        let err = DocIntelError::io(
            "/tmp/missing.pdf",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("missing.pdf"));
    }
}
