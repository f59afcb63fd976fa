//! The mail service capability and OS service control
//!
//! [`MailService`] is what the reconciliation engine depends on. Concrete
//! daemons implement it on top of a [`ServiceControl`], which by default is
//! `systemctl`.

use std::fmt;
use std::sync::Arc;

use mailconf_meta::{ConfigFile, MailServerConfig, Requirement, StopPolicy};
use serde::{Deserialize, Serialize};

use crate::command::CommandRunner;
use crate::reconcile::ReconcileReport;
use crate::Result;

/// Runtime state of a service as reported by the service manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Running,
    Stopped,
    Unknown,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A mail daemon whose configuration mailconf manages.
pub trait MailService {
    /// Human-readable name used in logs and reports.
    fn name(&self) -> &str;

    fn start(&self) -> Result<()>;

    fn stop(&self) -> Result<()>;

    fn restart(&self) -> Result<()>;

    fn status(&self) -> ServiceState;

    /// Idempotent pre-flight run once before the first `configure`.
    ///
    /// Applies the stop-before-configure policy and leaves the service's
    /// configuration directories existing and writable.
    fn init(&self) -> Result<()>;

    /// Reconcile every configuration file of this service against `config`.
    fn configure(&self, config: &MailServerConfig) -> Result<ReconcileReport>;

    /// The ordered files this service owns.
    fn config_files(&self) -> Vec<ConfigFile>;

    /// Descriptor fields this service needs beyond domain and sub-domain.
    fn requirements(&self) -> &'static [Requirement] {
        &[]
    }
}

/// Start/stop/restart/status keyed by a unit name.
pub trait ServiceControl: Send + Sync {
    fn start(&self, unit: &str) -> Result<()>;
    fn stop(&self, unit: &str) -> Result<()>;
    fn restart(&self, unit: &str) -> Result<()>;
    fn status(&self, unit: &str) -> ServiceState;
}

/// [`ServiceControl`] backed by `systemctl`.
#[derive(Clone)]
pub struct SystemdControl {
    runner: Arc<dyn CommandRunner>,
}

impl SystemdControl {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl ServiceControl for SystemdControl {
    fn start(&self, unit: &str) -> Result<()> {
        tracing::info!(unit, "starting service");
        self.runner.run("systemctl", &["start", unit]).map(|_| ())
    }

    fn stop(&self, unit: &str) -> Result<()> {
        tracing::info!(unit, "stopping service");
        self.runner.run("systemctl", &["stop", unit]).map(|_| ())
    }

    fn restart(&self, unit: &str) -> Result<()> {
        tracing::info!(unit, "restarting service");
        self.runner.run("systemctl", &["restart", unit]).map(|_| ())
    }

    fn status(&self, unit: &str) -> ServiceState {
        // is-active exits non-zero for anything but "active", so read stdout
        // regardless of the exit code.
        match self.runner.output("systemctl", &["is-active", unit]) {
            Ok(output) => match output.stdout.trim() {
                "active" | "reloading" | "activating" => ServiceState::Running,
                "inactive" | "failed" | "deactivating" => ServiceState::Stopped,
                _ => ServiceState::Unknown,
            },
            Err(e) => {
                tracing::warn!(unit, error = %e, "could not query service state");
                ServiceState::Unknown
            }
        }
    }
}

/// Apply the stop-before-configure policy to `service`.
///
/// Returns whether a stop was issued.
pub fn apply_stop_policy<S: MailService + ?Sized>(service: &S, policy: StopPolicy) -> Result<bool> {
    let stop = match policy {
        StopPolicy::Always => true,
        StopPolicy::IfRunning => service.status() == ServiceState::Running,
        StopPolicy::Never => false,
    };

    if stop {
        tracing::info!(service = service.name(), %policy, "stopping before configuration");
        service.stop()?;
    } else {
        tracing::debug!(service = service.name(), %policy, "leaving service state unchanged");
    }
    Ok(stop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutput;
    use std::sync::Mutex;

    struct Scripted {
        stdout: &'static str,
        code: i32,
        calls: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(stdout: &'static str, code: i32) -> Self {
            Self {
                stdout,
                code,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for Scripted {
        fn output(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{} {}", program, args.join(" ")));
            Ok(CommandOutput {
                code: Some(self.code),
                stdout: self.stdout.to_string(),
                stderr: String::new(),
            })
        }
    }

    #[test]
    fn restart_invokes_systemctl() {
        let runner = Arc::new(Scripted::new("", 0));
        let control = SystemdControl::new(runner.clone());

        control.restart("postfix").unwrap();

        assert_eq!(*runner.calls.lock().unwrap(), vec!["systemctl restart postfix"]);
    }

    #[test]
    fn failed_stop_is_an_error() {
        let control = SystemdControl::new(Arc::new(Scripted::new("", 5)));
        assert!(control.stop("dovecot").is_err());
    }

    #[test]
    fn status_maps_is_active_output() {
        let cases = [
            ("active\n", 0, ServiceState::Running),
            ("inactive\n", 3, ServiceState::Stopped),
            ("failed\n", 3, ServiceState::Stopped),
            ("", 4, ServiceState::Unknown),
        ];
        for (stdout, code, expected) in cases {
            let control = SystemdControl::new(Arc::new(Scripted::new(stdout, code)));
            assert_eq!(control.status("opendkim"), expected, "stdout {:?}", stdout);
        }
    }
}
