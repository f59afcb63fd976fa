//! Error types for mailconf-fs

use std::path::PathBuf;

/// Result type for mailconf-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mailconf-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    #[error("Invalid target path {path}: {reason}")]
    InvalidTarget { path: PathBuf, reason: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The path the failing operation was acting on.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::LockFailed { path } | Self::InvalidTarget { path, .. } => {
                path
            }
        }
    }
}
