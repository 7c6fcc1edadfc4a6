//! Error types for state reading and import operations.
//!
//! Errors are categorized so callers can tell a corrupt file apart from a
//! structurally unexpected one, and decide how to present each.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Broad categories of errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File unreadable or not valid JSON
    Decode,
    /// JSON decoded but does not have the expected shape
    Format,
    /// Path does not exist
    NotFound,
    /// External import tool could not be run
    Adapter,
}

impl ErrorKind {
    /// Get a user-friendly description of this error kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Decode => "State file could not be decoded",
            Self::Format => "Unexpected state file structure",
            Self::NotFound => "Path not found",
            Self::Adapter => "Import tool failed to start",
        }
    }

    /// Get actionable advice for resolving this error kind.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Decode => "Check that the file is complete, valid JSON",
            Self::Format => "Expected a top-level object with `resources` or `modules`",
            Self::NotFound => "Verify the path and try again",
            Self::Adapter => "Install terraformer or set its path in the config",
        }
    }
}

/// Errors that can occur while reading state or running an import.
#[derive(Debug, Error)]
pub enum Error {
    /// File could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File contents are not valid JSON
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        /// File that failed to decode
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Decoded content does not match the expected shape
    #[error("invalid state format in {}: {message}", .path.display())]
    Format {
        /// File with the unexpected structure
        path: PathBuf,
        /// What was wrong with it
        message: String,
    },

    /// Path does not exist
    #[error("path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    /// Import tool could not be launched
    #[error("import tool failed: {message}")]
    Adapter {
        /// Description of the launch failure
        message: String,
    },
}

impl Error {
    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Read { .. } | Error::Decode { .. } => ErrorKind::Decode,
            Error::Format { .. } => ErrorKind::Format,
            Error::PathNotFound(_) => ErrorKind::NotFound,
            Error::Adapter { .. } => ErrorKind::Adapter,
        }
    }

    /// Create a format error for a path.
    pub fn format(path: &Path, message: impl Into<String>) -> Self {
        Error::Format {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// The file this error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::Read { path, .. } | Error::Decode { path, .. } | Error::Format { path, .. } => {
                Some(path)
            }
            Error::PathNotFound(path) => Some(path),
            Error::Adapter { .. } => None,
        }
    }
}

/// Result type for state operations.
pub type Result<T> = std::result::Result<T, Error>;
