//! Apply command: provision, then init and configure each service
//!
//! Only the fields every service needs are checked up front. Services are
//! then driven one after another; a failure, including a missing
//! service-specific field, is logged and counted and the run moves on to the
//! next service.

use std::sync::Arc;

use colored::Colorize;
use mailconf_core::{CommandRunner, MailService, ReconcileReport, ServiceKind, VirtualMailbox};
use mailconf_meta::{MailServerConfig, Settings};
use serde::Serialize;

use super::build_services;
use crate::error::{CliError, Result};

/// A service that did not finish
#[derive(Debug, Serialize)]
pub struct Failure {
    pub service: String,
    pub error: String,
}

/// Everything `apply` did, in run order
#[derive(Debug, Default, Serialize)]
pub struct ApplySummary {
    pub provisioned: bool,
    pub reports: Vec<ReconcileReport>,
    pub failures: Vec<Failure>,
}

pub fn run_apply(
    settings: &Settings,
    runner: Arc<dyn CommandRunner>,
    services: &[ServiceKind],
    skip_provision: bool,
    json: bool,
) -> Result<()> {
    let (ctx, built) = build_services(settings, runner, services);
    settings.server.validate(&[])?;

    let mut summary = ApplySummary::default();

    if !skip_provision {
        match VirtualMailbox::new(ctx.provisioner.clone()).setup() {
            Ok(()) => summary.provisioned = true,
            Err(e) => {
                tracing::error!(error = %e, "virtual mailbox provisioning failed");
                summary.failures.push(Failure {
                    service: "vmail".into(),
                    error: e.to_string(),
                });
            }
        }
    }

    for service in &built {
        match apply_one(service.as_ref(), &settings.server) {
            Ok(report) => summary.reports.push(report),
            Err(e) => {
                tracing::error!(service = service.name(), error = %e, "service failed");
                summary.failures.push(Failure {
                    service: service.name().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if summary.failures.is_empty() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{} step(s) failed: {}",
            summary.failures.len(),
            summary
                .failures
                .iter()
                .map(|f| f.service.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

fn apply_one(
    service: &dyn MailService,
    config: &MailServerConfig,
) -> mailconf_core::Result<ReconcileReport> {
    config.validate(service.requirements())?;
    service.init()?;
    service.configure(config)
}

fn print_summary(summary: &ApplySummary) {
    if summary.provisioned {
        println!("{} virtual mailboxes", "OK".green().bold());
    }

    for report in &summary.reports {
        if report.changed() {
            println!(
                "{} {} ({} restart{})",
                "UPDATED".yellow().bold(),
                report.service.cyan(),
                report.restarts,
                if report.restarts == 1 { "" } else { "s" }
            );
            for file in report.written() {
                println!("   {} {}", "~".yellow(), file.path.display());
            }
        } else {
            println!("{} {} is up to date", "OK".green().bold(), report.service.cyan());
        }
    }

    for failure in &summary.failures {
        println!(
            "{} {}: {}",
            "FAILED".red().bold(),
            failure.service.cyan(),
            failure.error
        );
    }
}
