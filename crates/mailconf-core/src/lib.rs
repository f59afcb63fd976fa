//! Configuration reconciliation engine for mail daemons
//!
//! Renders each service's configuration files from templates and a
//! [`MailServerConfig`](mailconf_meta::MailServerConfig) descriptor, replaces
//! a deployed file only when its content drifted, and restarts the owning
//! service when something actually changed.
//!
//! # Architecture
//!
//! ```text
//!                     mailconf-cli
//!                          |
//!                    mailconf-core
//!        +---------+-------+--------+-----------+
//!        |         |                |           |
//!    template   reconcile       services    provision
//!        |         |                |           |
//!        +---- mailconf-fs     ServiceControl  CommandRunner
//!                  |
//!             mailconf-meta
//! ```
//!
//! The engine knows services only through the [`MailService`] capability;
//! process management goes through [`ServiceControl`] and every other OS
//! side effect through [`CommandRunner`].

pub mod command;
pub mod error;
pub mod paths;
pub mod provision;
pub mod reconcile;
pub mod service;
pub mod services;
pub mod template;

pub use command::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use error::{Error, Result};
pub use provision::Provisioner;
pub use reconcile::{CheckReport, FileDrift, FileReport, ReconcileReport, Reconciler};
pub use service::{MailService, ServiceControl, ServiceState, SystemdControl, apply_stop_policy};
pub use services::{
    Dovecot, OpenDkim, OpenDmarc, Postfix, ServiceContext, ServiceKind, VirtualMailbox,
};
pub use template::TemplateRenderer;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn template_not_found_displays_path() {
        let error = Error::TemplateNotFound {
            path: PathBuf::from("./templates/postfix_main.cf.tpl"),
        };
        let display = error.to_string();
        assert!(
            display.contains("./templates/postfix_main.cf.tpl"),
            "Error display should contain the path, got: {}",
            display
        );
    }

    #[test]
    fn restart_failure_names_service() {
        let error = Error::RestartFailed {
            service: "Postfix".into(),
            source: Box::new(Error::CommandFailed {
                command: "systemctl restart postfix".into(),
                code: 1,
                stderr: "Job for postfix.service failed".into(),
            }),
        };
        assert!(error.to_string().contains("Postfix"));
        assert!(error.is_restart_failure());
    }
}
