//! Error types for LeadCollector.
//!
//! Library crates use [`LeadCollectorError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all LeadCollector operations.
#[derive(Debug, thiserror::Error)]
pub enum LeadCollectorError {
    /// Configuration loading error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Missing or out-of-range run input. Raised before any network call.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Network/HTTP transport error.
    #[error("network error: {0}")]
    Network(String),

    /// The search provider rejected the query or returned an unusable body.
    #[error("search error: {0}")]
    Search(String),

    /// Malformed data.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// CSV export could not be encoded.
    #[error("export error: {0}")]
    Export(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LeadCollectorError>;

impl LeadCollectorError {
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

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error was raised by input validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
