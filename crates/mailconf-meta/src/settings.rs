//! Run settings and their format-agnostic loading

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, MailServerConfig, RestartPolicy, Result, StopPolicy};

/// Default directory templates are looked up in
pub const DEFAULT_TEMPLATES_DIR: &str = "./templates";

/// Settings for one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding one template file per `ConfigFile::template_name`
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,
    /// Filesystem root every service path is resolved beneath
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default)]
    pub stop_before_configure: StopPolicy,
    #[serde(default)]
    pub restart: RestartPolicy,
    /// The descriptor rendered into every template
    #[serde(default)]
    pub server: MailServerConfig,
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from(DEFAULT_TEMPLATES_DIR)
}

fn default_root() -> PathBuf {
    PathBuf::from("/")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            root: default_root(),
            stop_before_configure: StopPolicy::default(),
            restart: RestartPolicy::default(),
            server: MailServerConfig::default(),
        }
    }
}

/// Loads [`Settings`] from TOML, JSON or YAML files.
///
/// The format is detected from the file extension.
#[derive(Debug, Default)]
pub struct SettingsStore;

impl SettingsStore {
    pub fn new() -> Self {
        Self
    }

    /// Load settings from a file.
    ///
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    pub fn load(&self, path: &Path) -> Result<Settings> {
        if !path.is_file() {
            return Err(Error::SettingsNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = mailconf_fs::io::read_text(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let parse_error = |format: &str, message: String| Error::SettingsParse {
            path: path.to_path_buf(),
            format: format.into(),
            message,
        };

        let settings: Settings = match extension.as_str() {
            "toml" => toml::from_str(&content).map_err(|e| parse_error("TOML", e.to_string()))?,
            "json" => {
                serde_json::from_str(&content).map_err(|e| parse_error("JSON", e.to_string()))?
            }
            "yaml" | "yml" => {
                serde_yaml::from_str(&content).map_err(|e| parse_error("YAML", e.to_string()))?
            }
            _ => return Err(Error::UnsupportedFormat { extension }),
        };

        tracing::debug!(path = %path.display(), domain = %settings.server.domain, "loaded settings");
        Ok(settings)
    }
}
