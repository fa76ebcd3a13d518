//! Error types for metaext.
//!
//! The file cache distinguishes three failure classes: read, parse and write.
//! They have different policies. A read failure is fatal when a file is first
//! acquired and non-fatal on later refreshes. Parse and write failures are
//! always surfaced to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for metaext.
#[derive(Debug, Error)]
pub enum MetaExtError {
    // File cache errors
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid content in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to write {path}: {message}")]
    Write {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("{path} is already cached with a different value type")]
    CacheTypeMismatch { path: PathBuf },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Path has no parent directory: {0}")]
    InvalidPath(PathBuf),

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Host API errors
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Host API error on {endpoint}: {message}")]
    Api { endpoint: String, message: String },

    #[error("No API token available from the host application")]
    MissingToken,

    #[error("No library matches {query:?}")]
    LibraryNotFound { query: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias for metaext operations.
pub type Result<T> = std::result::Result<T, MetaExtError>;

impl From<std::io::Error> for MetaExtError {
    fn from(err: std::io::Error) -> Self {
        MetaExtError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for MetaExtError {
    fn from(err: serde_json::Error) -> Self {
        MetaExtError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for MetaExtError {
    fn from(err: reqwest::Error) -> Self {
        MetaExtError::Network {
            message: err.to_string(),
        }
    }
}

impl MetaExtError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        MetaExtError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a read error for `path`.
    pub fn read(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        MetaExtError::Read {
            path: path.into(),
            source: err,
        }
    }

    /// Create a parse error for `path`.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        MetaExtError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Path the error refers to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            MetaExtError::Read { path, .. }
            | MetaExtError::Parse { path, .. }
            | MetaExtError::Write { path, .. }
            | MetaExtError::CacheTypeMismatch { path }
            | MetaExtError::InvalidPath(path) => Some(path),
            MetaExtError::Io { path, .. } => path.as_deref(),
            _ => None,
        }
    }

    /// Check if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MetaExtError::Network { .. })
    }
}
