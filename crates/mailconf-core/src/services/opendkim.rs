//! OpenDKIM signer

use mailconf_meta::{ConfigFile, MailServerConfig};

use super::{Daemon, ServiceContext};
use crate::reconcile::ReconcileReport;
use crate::service::{MailService, ServiceState};
use crate::Result;

pub const OPENDKIM_USER: &str = "opendkim";
pub const OPENDKIM_GROUP: &str = "opendkim";

const CONFIG_DIR: &str = "/etc/opendkim";
const KEYS_DIR: &str = "/etc/opendkim/keys";
const SIGNING_TABLE: &str = "/etc/opendkim/signing.table";
const KEY_TABLE: &str = "/etc/opendkim/key.table";
const TRUSTED_HOSTS: &str = "/etc/opendkim/trusted.hosts";

/// Hosts always allowed to sign through the local milter
const LOCAL_HOSTS: [&str; 3] = ["127.0.0.1", "::1", "localhost"];

pub struct OpenDkim {
    daemon: Daemon,
}

impl OpenDkim {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            daemon: Daemon::new("OpenDKIM", "opendkim", ctx),
        }
    }

    /// Add `host` to the trusted hosts table if it is not there yet.
    pub fn trust_host(&self, host: &str) -> Result<bool> {
        self.daemon.provisioner().trust_host(TRUSTED_HOSTS, host)
    }
}

impl MailService for OpenDkim {
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

        host.ensure_dir(KEYS_DIR)?;
        host.chown_recursive(CONFIG_DIR, OPENDKIM_USER, OPENDKIM_GROUP)?;
        host.chmod_recursive(CONFIG_DIR, "go-rw")?;

        for table in [SIGNING_TABLE, KEY_TABLE, TRUSTED_HOSTS] {
            host.touch(table)?;
        }

        for local in LOCAL_HOSTS {
            self.trust_host(local)?;
        }
        let hostname = host.short_hostname()?;
        self.trust_host(&hostname)?;

        Ok(())
    }

    fn configure(&self, config: &MailServerConfig) -> Result<ReconcileReport> {
        self.daemon
            .reconciler()
            .reconcile(self, config, &[], &self.config_files())
    }

    fn config_files(&self) -> Vec<ConfigFile> {
        vec![ConfigFile::new("opendkim.conf.tpl", "/etc", "opendkim.conf")]
    }
}
