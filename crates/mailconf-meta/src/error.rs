//! Error types for mailconf-meta

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] mailconf_fs::Error),

    #[error("Settings not found at {path}")]
    SettingsNotFound { path: PathBuf },

    #[error("Failed to parse {format} settings at {path}: {message}")]
    SettingsParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported settings format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error(transparent)]
    Validation(#[from] crate::ValidationError),

    #[error("Invalid {kind} policy: {value}")]
    InvalidPolicy { kind: &'static str, value: String },
}
