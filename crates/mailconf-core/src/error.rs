//! Error types for mailconf-core

use std::path::PathBuf;

/// Result type for mailconf-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling or provisioning services
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required descriptor or config file field is empty
    #[error("Validation failed: {0}")]
    Validation(#[from] mailconf_meta::ValidationError),

    /// The named template does not exist under the templates root
    #[error("Template not found: {path}")]
    TemplateNotFound { path: PathBuf },

    /// The template exists but could not be expanded
    #[error("Failed to render template {template}: {message}")]
    Render { template: String, message: String },

    /// Filesystem error from mailconf-fs
    #[error(transparent)]
    Fs(#[from] mailconf_fs::Error),

    /// A configuration was written but the owning service did not restart.
    ///
    /// The new configuration stays on disk while the daemon may still be
    /// running the old one.
    #[error("Failed to restart {service} after updating its configuration: {source}")]
    RestartFailed {
        service: String,
        #[source]
        source: Box<Error>,
    },

    /// An external command exited with a non-zero status
    #[error("Command `{command}` failed (exit code {code}): {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    /// An external command could not be started at all
    #[error("Failed to run `{program}`: {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A provisioning step produced an unusable result
    #[error("Provisioning failed: {message}")]
    Provision { message: String },
}

impl Error {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_render_failure(&self) -> bool {
        matches!(self, Self::TemplateNotFound { .. } | Self::Render { .. })
    }

    pub fn is_io_failure(&self) -> bool {
        matches!(self, Self::Fs(_))
    }

    pub fn is_restart_failure(&self) -> bool {
        matches!(self, Self::RestartFailed { .. })
    }

    pub(crate) fn render(template: &str, message: impl Into<String>) -> Self {
        Self::Render {
            template: template.to_string(),
            message: message.into(),
        }
    }
}
