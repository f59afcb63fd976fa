//! One-shot host provisioning steps used by service `init`
//!
//! Directory and file creation happen directly on the filesystem; user,
//! group, ownership and mode changes go through the [`CommandRunner`].
//! Every path is an absolute daemon path resolved beneath the deployment
//! root.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::command::{CommandRunner, command_line};
use crate::paths::rooted;
use crate::{Error, Result};

/// Exit status `getent` uses for "key not found"
const GETENT_NOT_FOUND: i32 = 2;

/// Host-level side effects shared by the services.
#[derive(Clone)]
pub struct Provisioner {
    runner: Arc<dyn CommandRunner>,
    root: PathBuf,
}

impl Provisioner {
    pub fn new(runner: Arc<dyn CommandRunner>, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an absolute daemon path on this deployment.
    pub fn path(&self, absolute: &str) -> PathBuf {
        rooted(&self.root, absolute)
    }

    /// Create a directory and its parents. Returns whether it was created.
    pub fn ensure_dir(&self, absolute: &str) -> Result<bool> {
        let path = self.path(absolute);
        if path.is_dir() {
            tracing::info!(path = %path.display(), "folder already exists, skipping");
            return Ok(false);
        }

        fs::create_dir_all(&path).map_err(|e| mailconf_fs::Error::io(&path, e))?;
        tracing::info!(path = %path.display(), "folder was created");
        Ok(true)
    }

    /// Create an empty file if none exists. Returns whether it was created.
    pub fn touch(&self, absolute: &str) -> Result<bool> {
        let path = self.path(absolute);
        if path.exists() {
            return Ok(false);
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| mailconf_fs::Error::io(&path, e))?;
        tracing::info!(path = %path.display(), "created empty file");
        Ok(true)
    }

    pub fn chown_recursive(&self, absolute: &str, user: &str, group: &str) -> Result<()> {
        let path = self.path(absolute);
        let owner = format!("{}:{}", user, group);
        self.runner
            .run("chown", &["-R", &owner, &path.to_string_lossy()])?;
        tracing::info!(path = %path.display(), %owner, "changed owner");
        Ok(())
    }

    /// Apply a `chmod` mode (numeric or symbolic) recursively.
    pub fn chmod_recursive(&self, absolute: &str, mode: &str) -> Result<()> {
        let path = self.path(absolute);
        self.runner
            .run("chmod", &["-R", mode, &path.to_string_lossy()])?;
        tracing::info!(path = %path.display(), mode, "changed mode");
        Ok(())
    }

    pub fn group_exists(&self, name: &str) -> Result<bool> {
        self.getent("group", name)
    }

    pub fn user_exists(&self, name: &str) -> Result<bool> {
        self.getent("passwd", name)
    }

    fn getent(&self, database: &str, key: &str) -> Result<bool> {
        let args = [database, key];
        let output = self.runner.output("getent", &args)?;
        match output.code {
            Some(0) => Ok(true),
            Some(GETENT_NOT_FOUND) => Ok(false),
            code => Err(Error::CommandFailed {
                command: command_line("getent", &args),
                code: code.unwrap_or(-1),
                stderr: output.stderr.trim().to_string(),
            }),
        }
    }

    pub fn create_group(&self, name: &str, gid: u32) -> Result<()> {
        self.runner
            .run("groupadd", &["-g", &gid.to_string(), name])?;
        tracing::info!(group = name, gid, "group was created");
        Ok(())
    }

    /// Create a system user without a login shell.
    ///
    /// `home` is an absolute daemon path and must already exist.
    pub fn create_user(&self, name: &str, uid: u32, group: &str, home: &str) -> Result<()> {
        let home = self.path(home);
        self.runner.run(
            "useradd",
            &[
                "-u",
                &uid.to_string(),
                "-g",
                group,
                "-d",
                &home.to_string_lossy(),
                "-M",
                "-s",
                "/usr/sbin/nologin",
                name,
            ],
        )?;
        tracing::info!(user = name, uid, group, "user was created");
        Ok(())
    }

    pub fn add_user_to_group(&self, user: &str, group: &str) -> Result<()> {
        self.runner.run("usermod", &["-a", "-G", group, user])?;
        tracing::info!(user, group, "added user to group");
        Ok(())
    }

    /// Short host name of the machine, as printed by `hostname -s`.
    pub fn short_hostname(&self) -> Result<String> {
        let hostname = self.runner.run("hostname", &["-s"])?.trim().to_string();
        if hostname.is_empty() {
            return Err(Error::Provision {
                message: "hostname -s printed nothing".into(),
            });
        }
        Ok(hostname)
    }

    /// Append `host` to a one-host-per-line allow list unless already listed.
    ///
    /// Returns whether the file changed.
    pub fn trust_host(&self, hosts_file: &str, host: &str) -> Result<bool> {
        let host = host.trim();
        if host.is_empty() {
            return Err(Error::Provision {
                message: format!("refusing to trust an empty host in {}", hosts_file),
            });
        }

        let path = self.path(hosts_file);
        let existing = if path.exists() {
            mailconf_fs::io::read_text(&path)?
        } else {
            String::new()
        };

        if existing.lines().any(|line| line.trim() == host) {
            tracing::debug!(host, file = %path.display(), "host already trusted");
            return Ok(false);
        }

        let mut updated = existing;
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push('\n');
        }
        updated.push_str(host);
        updated.push('\n');

        mailconf_fs::io::write_atomic(&path, updated.as_bytes())?;
        tracing::info!(host, file = %path.display(), "trusted host");
        Ok(true)
    }
}
