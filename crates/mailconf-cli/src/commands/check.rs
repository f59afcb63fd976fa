//! Check command: drift report without writes or restarts

use std::sync::Arc;

use colored::Colorize;
use mailconf_core::{CheckReport, CommandRunner, ServiceKind};
use mailconf_fs::Drift;
use mailconf_meta::Settings;

use super::build_services;
use crate::error::{CliError, Result};

pub fn run_check(
    settings: &Settings,
    runner: Arc<dyn CommandRunner>,
    services: &[ServiceKind],
    json: bool,
) -> Result<()> {
    let (ctx, built) = build_services(settings, runner, services);

    let mut reports = Vec::with_capacity(built.len());
    let mut failed = Vec::new();

    for service in &built {
        let result = ctx.reconciler.check(
            service.name(),
            &settings.server,
            service.requirements(),
            &service.config_files(),
        );
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::error!(service = service.name(), error = %e, "check failed");
                if !json {
                    println!("{} {}: {}", "FAILED".red().bold(), service.name().cyan(), e);
                }
                failed.push(service.name().to_string());
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::user(format!("could not check: {}", failed.join(", "))))
    }
}

fn print_report(report: &CheckReport) {
    if report.is_in_sync() {
        println!("{} {} is in sync", "OK".green().bold(), report.service.cyan());
        return;
    }

    println!("{} {} has drifted:", "DRIFTED".red().bold(), report.service.cyan());
    for file in report.drifted() {
        let marker = match file.drift {
            Drift::Absent => "+".yellow(),
            _ => "!".red(),
        };
        println!(
            "   {} {} ({})",
            marker,
            file.path.display(),
            file.drift.to_string().dimmed()
        );
    }
}
