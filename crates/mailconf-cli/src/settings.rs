//! Settings resolution: file, then command-line overrides

use std::path::Path;

use mailconf_meta::{Settings, SettingsStore};

use crate::cli::Overrides;
use crate::error::Result;

/// Settings file picked up from the working directory when `--config` is absent
pub const DEFAULT_SETTINGS_FILE: &str = "mailconf.toml";

/// Load settings from `config`, or from [`DEFAULT_SETTINGS_FILE`] if it
/// exists, or fall back to defaults; then apply `overrides`.
pub fn resolve(config: Option<&Path>, overrides: &Overrides) -> Result<Settings> {
    let store = SettingsStore::new();
    let mut settings = match config {
        Some(path) => store.load(path)?,
        None if Path::new(DEFAULT_SETTINGS_FILE).is_file() => {
            store.load(Path::new(DEFAULT_SETTINGS_FILE))?
        }
        None => {
            tracing::debug!("no settings file, using defaults");
            Settings::default()
        }
    };

    overrides.apply(&mut settings);
    Ok(settings)
}

impl Overrides {
    pub fn apply(&self, settings: &mut Settings) {
        let server = &mut settings.server;
        if let Some(domain) = &self.domain {
            server.domain = domain.clone();
        }
        if let Some(sub_domain) = &self.sub_domain {
            server.sub_domain = sub_domain.clone();
        }
        if let Some(hostname) = &self.lb_hostname {
            server.load_balancer.hostname = hostname.clone();
        }
        if let Some(ipv4) = self.lb_ipv4 {
            server.load_balancer.ipv4 = Some(ipv4);
        }
        if let Some(ipv6) = self.lb_ipv6 {
            server.load_balancer.ipv6 = Some(ipv6);
        }
        if let Some(templates) = &self.templates {
            settings.templates_dir = templates.clone();
        }
        if let Some(root) = &self.root {
            settings.root = root.clone();
        }
        if let Some(policy) = self.stop_before_configure {
            settings.stop_before_configure = policy;
        }
        if let Some(policy) = self.restart {
            settings.restart = policy;
        }
    }
}
