//! Virtual mailbox storage shared by the MTA and the IMAP store

use std::sync::Arc;

use crate::provision::Provisioner;
use crate::Result;

pub const DEFAULT_MAIL_PATH: &str = "/var/mail";
pub const VHOSTS_FOLDER: &str = "vhosts";
pub const VMAIL_USER: &str = "vmail";
pub const VMAIL_GROUP: &str = "vmail";
pub const VMAIL_UID: u32 = 5000;
pub const VMAIL_GID: u32 = 5000;

/// Provisions the folder tree and the `vmail` account owning it.
pub struct VirtualMailbox {
    provisioner: Arc<Provisioner>,
    base_path: String,
}

impl VirtualMailbox {
    pub fn new(provisioner: Arc<Provisioner>) -> Self {
        Self::with_base_path(provisioner, DEFAULT_MAIL_PATH)
    }

    pub fn with_base_path(provisioner: Arc<Provisioner>, base_path: impl Into<String>) -> Self {
        Self {
            provisioner,
            base_path: base_path.into(),
        }
    }

    /// Absolute daemon path of the virtual hosts folder.
    pub fn vhosts_path(&self) -> String {
        format!("{}/{}", self.base_path.trim_end_matches('/'), VHOSTS_FOLDER)
    }

    /// Create folders, group and user when absent, then hand the tree to
    /// `vmail`. Safe to run repeatedly.
    pub fn setup(&self) -> Result<()> {
        let host = &self.provisioner;
        let vhosts = self.vhosts_path();

        tracing::info!(path = %self.base_path, "checking virtual mailbox folders");
        host.ensure_dir(&self.base_path)?;
        host.ensure_dir(&vhosts)?;

        tracing::info!("checking virtual mailbox user and group");
        if host.group_exists(VMAIL_GROUP)? {
            tracing::info!(group = VMAIL_GROUP, "group already exists, skipping");
        } else {
            host.create_group(VMAIL_GROUP, VMAIL_GID)?;
        }

        if host.user_exists(VMAIL_USER)? {
            tracing::info!(user = VMAIL_USER, "user already exists, skipping");
        } else {
            host.create_user(VMAIL_USER, VMAIL_UID, VMAIL_GROUP, &vhosts)?;
        }

        host.chown_recursive(&self.base_path, VMAIL_USER, VMAIL_GROUP)?;
        Ok(())
    }
}
