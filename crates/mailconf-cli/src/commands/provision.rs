//! Provision command: virtual mailbox folders and account

use std::sync::Arc;

use colored::Colorize;
use mailconf_core::{CommandRunner, Provisioner, VirtualMailbox};
use mailconf_meta::Settings;

use crate::error::Result;

pub fn run_provision(settings: &Settings, runner: Arc<dyn CommandRunner>) -> Result<()> {
    let provisioner = Arc::new(Provisioner::new(runner, &settings.root));
    let mailbox = VirtualMailbox::new(provisioner);

    mailbox.setup()?;
    println!(
        "{} virtual mailboxes ready under {}",
        "OK".green().bold(),
        mailbox.vhosts_path().cyan()
    );
    Ok(())
}
