//! Postfix mail transfer agent

use mailconf_meta::{ConfigFile, MailServerConfig, Requirement};

use super::{Daemon, ServiceContext};
use crate::reconcile::ReconcileReport;
use crate::service::{MailService, ServiceState};
use crate::Result;

pub const POSTFIX_USER: &str = "postfix";
pub const POSTFIX_CONFIG_DIR: &str = "/etc/postfix";

const REQUIREMENTS: &[Requirement] = &[Requirement::LoadBalancerHostname];

pub struct Postfix {
    daemon: Daemon,
}

impl Postfix {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            daemon: Daemon::new("Postfix", "postfix", ctx),
        }
    }
}

impl MailService for Postfix {
    fn name(&self) -> &str {
        self.daemon.name
    }

    fn start(&self) -> Result<()> {
        self.daemon.start()
    }

    fn stop(&self) -> Result<()> {
        self.daemon.stop()
    }

    fn restart(&self) -> Result<()> {
        self.daemon.restart()
    }

    fn status(&self) -> ServiceState {
        self.daemon.status()
    }

    fn init(&self) -> Result<()> {
        self.daemon.prepare(self)?;
        self.daemon.provisioner().ensure_dir(POSTFIX_CONFIG_DIR)?;
        Ok(())
    }

    fn configure(&self, config: &MailServerConfig) -> Result<ReconcileReport> {
        self.daemon
            .reconciler()
            .reconcile(self, config, REQUIREMENTS, &self.config_files())
    }

    fn config_files(&self) -> Vec<ConfigFile> {
        vec![
            ConfigFile::new("postfix_header_checks.tpl", POSTFIX_CONFIG_DIR, "header_checks"),
            ConfigFile::new("postfix_main.cf.tpl", POSTFIX_CONFIG_DIR, "main.cf"),
            ConfigFile::new("postfix_master.cf.tpl", POSTFIX_CONFIG_DIR, "master.cf"),
        ]
    }

    fn requirements(&self) -> &'static [Requirement] {
        REQUIREMENTS
    }
}
