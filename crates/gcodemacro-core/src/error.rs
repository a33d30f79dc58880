//! Error handling for GCodeMacro
//!
//! Provides error types for the layers of the core crate:
//! - Fetch errors (macro list request lifecycle)
//! - Source errors (reading macros from a backing store)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Errors raised by a macro source while producing the macro list.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    /// The backing file could not be read
    #[error("Failed to read macros from {path}: {reason}")]
    ReadFailed {
        /// Path of the backing file.
        path: String,
        /// Underlying failure.
        reason: String,
    },

    /// The backing data is not a valid macro list
    #[error("Malformed macro data: {reason}")]
    Malformed {
        /// Why parsing failed.
        reason: String,
    },

    /// The source is unreachable
    #[error("Macro source unavailable: {reason}")]
    Unavailable {
        /// Why the source could not be reached.
        reason: String,
    },
}

/// Errors raised by the fetch service.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    /// The request failed in the source
    #[error("Fetch failed: {0}")]
    Source(#[from] SourceError),

    /// No tokio runtime was available to run the request
    #[error("No async runtime available to run the fetch request")]
    NoRuntime,
}

/// Main error type for GCodeMacro
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Source error
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Check if this is a fetch error
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, Error::Fetch(_))
    }

    /// Check if this is a source error
    pub fn is_source_error(&self) -> bool {
        matches!(self, Error::Source(_) | Error::Fetch(FetchError::Source(_)))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
