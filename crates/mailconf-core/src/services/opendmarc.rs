//! OpenDMARC policy daemon

use mailconf_meta::{ConfigFile, MailServerConfig};

use super::postfix::POSTFIX_USER;
use super::{Daemon, ServiceContext};
use crate::reconcile::ReconcileReport;
use crate::service::{MailService, ServiceState};
use crate::Result;

pub const OPENDMARC_USER: &str = "opendmarc";
pub const OPENDMARC_GROUP: &str = "opendmarc";

/// Milter socket directory, inside the Postfix chroot
const SOCKET_DIR: &str = "/var/spool/postfix/opendmarc";

pub struct OpenDmarc {
    daemon: Daemon,
}

impl OpenDmarc {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            daemon: Daemon::new("OpenDMARC", "opendmarc", ctx),
        }
    }
}

impl MailService for OpenDmarc {
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
        let host = self.daemon.provisioner();

        host.ensure_dir(SOCKET_DIR)?;
        host.chown_recursive(SOCKET_DIR, OPENDMARC_USER, OPENDMARC_GROUP)?;
        host.chmod_recursive(SOCKET_DIR, "750")?;
        // Postfix talks to the milter socket, so it joins the daemon's group.
        host.add_user_to_group(POSTFIX_USER, OPENDMARC_GROUP)?;

        Ok(())
    }

    fn configure(&self, config: &MailServerConfig) -> Result<ReconcileReport> {
        self.daemon
            .reconciler()
            .reconcile(self, config, &[], &self.config_files())
    }

    fn config_files(&self) -> Vec<ConfigFile> {
        vec![ConfigFile::new("opendmarc.conf.tpl", "/etc", "opendmarc.conf")]
    }
}
