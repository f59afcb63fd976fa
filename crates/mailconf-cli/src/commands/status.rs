//! Status command

use std::sync::Arc;

use colored::Colorize;
use mailconf_core::{CommandRunner, ServiceKind, ServiceState};
use mailconf_meta::Settings;

use super::build_services;
use crate::error::Result;

pub fn run_status(
    settings: &Settings,
    runner: Arc<dyn CommandRunner>,
    services: &[ServiceKind],
) -> Result<()> {
    let (_, built) = build_services(settings, runner, services);

    for service in &built {
        let state = service.status();
        let label = match state {
            ServiceState::Running => state.to_string().green().bold(),
            ServiceState::Stopped => state.to_string().yellow().bold(),
            ServiceState::Unknown => state.to_string().dimmed(),
        };
        println!("{:<10} {}", service.name(), label);
    }

    Ok(())
}
