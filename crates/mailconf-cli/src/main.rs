//! mailconf CLI
//!
//! Renders mail daemon configuration from templates and keeps the deployed
//! files in line with the descriptor.

mod cli;
mod commands;
mod error;
mod logging;
mod settings;

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use mailconf_core::{CommandRunner, SystemCommandRunner};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: logging disabled: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!(command = ?cli.command, "starting");

    let settings = settings::resolve(cli.config.as_deref(), &cli.overrides)?;
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner);

    match cli.command {
        Commands::Apply {
            services,
            skip_provision,
            json,
        } => commands::run_apply(&settings, runner, &services, skip_provision, json),
        Commands::Check { services, json } => {
            commands::run_check(&settings, runner, &services, json)
        }
        Commands::Init { services } => commands::run_init(&settings, runner, &services),
        Commands::Status { services } => commands::run_status(&settings, runner, &services),
        Commands::Provision => commands::run_provision(&settings, runner),
    }
}
