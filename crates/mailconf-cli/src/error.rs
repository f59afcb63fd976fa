//! Error types for mailconf-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] mailconf_core::Error),

    #[error(transparent)]
    Meta(#[from] mailconf_meta::Error),

    #[error(transparent)]
    Validation(#[from] mailconf_meta::ValidationError),

    #[error("Failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
