//! Error types for EduTrack.
//!
//! Library crates use [`EdutrackError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all EduTrack operations.
#[derive(Debug, thiserror::Error)]
pub enum EdutrackError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Database or storage layer error. The failed operation was rolled back.
    #[error("storage error: {0}")]
    Storage(String),

    /// The record already exists (politician name + party, or a family
    /// member name under the same parent). Nothing was written.
    #[error("duplicate entry: {message}")]
    Duplicate { message: String },

    /// Record validation error (missing name, unknown parent, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Malformed input file (dataset, family members, scraped records).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Record source failure during ingestion.
    #[error("ingest error: {0}")]
    Ingest(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EdutrackError>;

impl EdutrackError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a duplicate-entry error from any displayable message.
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate {
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

    /// Whether this is a recoverable duplicate-entry rejection.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}
