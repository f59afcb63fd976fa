//! Init command: per-service pre-flight only

use std::sync::Arc;

use colored::Colorize;
use mailconf_core::{CommandRunner, ServiceKind};
use mailconf_meta::Settings;

use super::build_services;
use crate::error::{CliError, Result};

pub fn run_init(
    settings: &Settings,
    runner: Arc<dyn CommandRunner>,
    services: &[ServiceKind],
) -> Result<()> {
    let (_, built) = build_services(settings, runner, services);
    let mut failed = Vec::new();

    for service in &built {
        match service.init() {
            Ok(()) => println!("{} {} initialized", "OK".green().bold(), service.name().cyan()),
            Err(e) => {
                tracing::error!(service = service.name(), error = %e, "init failed");
                println!("{} {}: {}", "FAILED".red().bold(), service.name().cyan(), e);
                failed.push(service.name().to_string());
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::user(format!("init failed for: {}", failed.join(", "))))
    }
}
