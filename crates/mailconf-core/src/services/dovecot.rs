//! Dovecot IMAP store

use mailconf_meta::{ConfigFile, MailServerConfig, Requirement};

use super::{Daemon, ServiceContext};
use crate::reconcile::ReconcileReport;
use crate::service::{MailService, ServiceState};
use crate::Result;

const CONFIG_DIR: &str = "/etc/dovecot";
const CONF_D_DIR: &str = "/etc/dovecot/conf.d";

// Mailbox mappings live in SQL, so the whole block is mandatory.
const REQUIREMENTS: &[Requirement] = &[Requirement::SqlServer];

pub struct Dovecot {
    daemon: Daemon,
}

impl Dovecot {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            daemon: Daemon::new("Dovecot", "dovecot", ctx),
        }
    }
}

impl MailService for Dovecot {
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
        self.daemon.provisioner().ensure_dir(CONF_D_DIR)?;
        Ok(())
    }

    fn configure(&self, config: &MailServerConfig) -> Result<ReconcileReport> {
        self.daemon
            .reconciler()
            .reconcile(self, config, REQUIREMENTS, &self.config_files())
    }

    fn config_files(&self) -> Vec<ConfigFile> {
        vec![
            ConfigFile::new("dovecot.conf.tpl", CONFIG_DIR, "dovecot.conf"),
            ConfigFile::new("dovecot_conf.d_10-auth.conf.tpl", CONF_D_DIR, "10-auth.conf"),
            ConfigFile::new("dovecot_conf.d_10-mail.conf.tpl", CONF_D_DIR, "10-mail.conf"),
            ConfigFile::new("dovecot_conf.d_10-master.conf.tpl", CONF_D_DIR, "10-master.conf"),
            ConfigFile::new("dovecot_conf.d_10-ssl.conf.tpl", CONF_D_DIR, "10-ssl.conf"),
            ConfigFile::new("dovecot_conf.d_auth-sql.conf.ext.tpl", CONF_D_DIR, "auth-sql.conf.ext"),
            ConfigFile::new("dovecot_conf.d_sql.conf.ext.tpl", CONF_D_DIR, "sql.conf.ext"),
        ]
    }

    fn requirements(&self) -> &'static [Requirement] {
        REQUIREMENTS
    }
}
