//! Concrete mail services
//!
//! Each service owns a fixed list of configuration files and its own
//! provisioning, and delegates reconciliation to the shared [`Reconciler`].
//! Everything a service needs is injected through a [`ServiceContext`]
//! built once by the caller.

mod dovecot;
mod opendkim;
mod opendmarc;
mod postfix;
mod vmail;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use mailconf_meta::{Settings, StopPolicy};

use crate::command::CommandRunner;
use crate::provision::Provisioner;
use crate::reconcile::Reconciler;
use crate::service::{MailService, ServiceControl, ServiceState, SystemdControl, apply_stop_policy};
use crate::template::TemplateRenderer;
use crate::Result;

pub use dovecot::Dovecot;
pub use opendkim::OpenDkim;
pub use opendmarc::OpenDmarc;
pub use postfix::Postfix;
pub use vmail::VirtualMailbox;

/// Collaborators shared by every service of a run.
#[derive(Clone)]
pub struct ServiceContext {
    pub reconciler: Arc<Reconciler>,
    pub control: Arc<dyn ServiceControl>,
    pub provisioner: Arc<Provisioner>,
    pub stop_policy: StopPolicy,
}

impl ServiceContext {
    pub fn new(
        reconciler: Reconciler,
        control: Arc<dyn ServiceControl>,
        provisioner: Provisioner,
        stop_policy: StopPolicy,
    ) -> Self {
        Self {
            reconciler: Arc::new(reconciler),
            control,
            provisioner: Arc::new(provisioner),
            stop_policy,
        }
    }

    /// Wire up a context from run settings, controlling services with
    /// `systemctl` through `runner`.
    pub fn from_settings(settings: &Settings, runner: Arc<dyn CommandRunner>) -> Self {
        let reconciler = Reconciler::new(
            TemplateRenderer::new(&settings.templates_dir),
            &settings.root,
        )
        .with_restart_policy(settings.restart);
        let control = Arc::new(SystemdControl::new(runner.clone()));
        let provisioner = Provisioner::new(runner, &settings.root);

        Self::new(reconciler, control, provisioner, settings.stop_before_configure)
    }
}

/// The service-manager side every concrete service shares.
#[derive(Clone)]
struct Daemon {
    name: &'static str,
    unit: &'static str,
    ctx: ServiceContext,
}

impl Daemon {
    fn new(name: &'static str, unit: &'static str, ctx: ServiceContext) -> Self {
        Self { name, unit, ctx }
    }

    fn start(&self) -> Result<()> {
        self.ctx.control.start(self.unit)
    }

    fn stop(&self) -> Result<()> {
        self.ctx.control.stop(self.unit)
    }

    fn restart(&self) -> Result<()> {
        self.ctx.control.restart(self.unit)
    }

    fn status(&self) -> ServiceState {
        self.ctx.control.status(self.unit)
    }

    fn prepare<S: MailService + ?Sized>(&self, service: &S) -> Result<()> {
        tracing::info!(service = self.name, "starting initialization");
        apply_stop_policy(service, self.ctx.stop_policy)?;
        Ok(())
    }

    fn provisioner(&self) -> &Provisioner {
        &self.ctx.provisioner
    }

    fn reconciler(&self) -> &Reconciler {
        &self.ctx.reconciler
    }
}

/// The services mailconf knows how to configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Postfix,
    Dovecot,
    OpenDkim,
    OpenDmarc,
}

impl ServiceKind {
    /// Every service in the order a full run configures them.
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::Postfix,
        ServiceKind::Dovecot,
        ServiceKind::OpenDkim,
        ServiceKind::OpenDmarc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postfix => "postfix",
            Self::Dovecot => "dovecot",
            Self::OpenDkim => "opendkim",
            Self::OpenDmarc => "opendmarc",
        }
    }

    pub fn build(self, ctx: ServiceContext) -> Box<dyn MailService> {
        match self {
            Self::Postfix => Box::new(Postfix::new(ctx)),
            Self::Dovecot => Box::new(Dovecot::new(ctx)),
            Self::OpenDkim => Box::new(OpenDkim::new(ctx)),
            Self::OpenDmarc => Box::new(OpenDmarc::new(ctx)),
        }
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postfix" => Ok(Self::Postfix),
            "dovecot" => Ok(Self::Dovecot),
            "opendkim" => Ok(Self::OpenDkim),
            "opendmarc" => Ok(Self::OpenDmarc),
            other => Err(format!(
                "unknown service '{}' (expected one of: postfix, dovecot, opendkim, opendmarc)",
                other
            )),
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
