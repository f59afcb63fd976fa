//! Reconciler implementation
//!
//! For one service and its ordered file list: validate the descriptor,
//! then render, compare and write each file in turn, and restart the
//! service according to the [`RestartPolicy`].

use std::path::{Path, PathBuf};

use mailconf_fs::{has_drifted, write_if_different};
use mailconf_meta::{ConfigFile, MailServerConfig, Requirement, RestartPolicy};

use crate::paths::rooted;
use crate::service::MailService;
use crate::template::TemplateRenderer;
use crate::{Error, Result};

use super::report::{CheckReport, FileDrift, FileReport, ReconcileReport};

/// Drives render, drift detection, write and restart for a service.
///
/// Holds no per-service state; one instance is shared by every service of a
/// run. Reconciliations of the same service must not run concurrently.
#[derive(Debug, Clone)]
pub struct Reconciler {
    renderer: TemplateRenderer,
    /// Root every destination directory is resolved beneath
    root: PathBuf,
    restart_policy: RestartPolicy,
}

impl Reconciler {
    pub fn new(renderer: TemplateRenderer, root: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            root: root.into(),
            restart_policy: RestartPolicy::default(),
        }
    }

    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = policy;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    pub fn restart_policy(&self) -> RestartPolicy {
        self.restart_policy
    }

    /// Where `file` lives on this deployment.
    pub fn destination(&self, file: &ConfigFile) -> PathBuf {
        rooted(&self.root, file.destination())
    }

    /// Bring every file in `files` in line with `config`.
    ///
    /// The descriptor is validated before anything touches the disk or the
    /// service. Files are processed in order and the first failure aborts the
    /// rest; files already written stay written.
    ///
    /// With [`RestartPolicy::Once`] the service is restarted a single time at
    /// the end if any file was written, including when a later file aborts
    /// the run. With [`RestartPolicy::PerFile`] it is restarted after every
    /// written file.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for a missing descriptor or file field
    /// - [`Error::TemplateNotFound`] / [`Error::Render`] for template problems
    /// - [`Error::Fs`] for filesystem failures
    /// - [`Error::RestartFailed`] if the service does not restart
    pub fn reconcile<S: MailService + ?Sized>(
        &self,
        service: &S,
        config: &MailServerConfig,
        requirements: &[Requirement],
        files: &[ConfigFile],
    ) -> Result<ReconcileReport> {
        config.validate(requirements)?;

        let mut report = ReconcileReport::new(service.name());

        for file in files {
            let outcome = match self.reconcile_file(service, config, file) {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.restart_for_aborted(service, &report);
                    return Err(e);
                }
            };

            if outcome.outcome.is_written() && self.restart_policy == RestartPolicy::PerFile {
                restart(service)?;
                report.restarts += 1;
            }
            report.files.push(outcome);
        }

        if report.changed() && self.restart_policy == RestartPolicy::Once {
            restart(service)?;
            report.restarts += 1;
        }

        if !report.changed() {
            tracing::info!(service = service.name(), "configuration is up to date");
        }
        Ok(report)
    }

    /// Under [`RestartPolicy::Once`], restart for files written before an
    /// abort so the service does not keep running the old configuration.
    ///
    /// The abort error is what the caller sees; a failed restart is logged.
    fn restart_for_aborted<S: MailService + ?Sized>(
        &self,
        service: &S,
        report: &ReconcileReport,
    ) {
        if self.restart_policy != RestartPolicy::Once || !report.changed() {
            return;
        }

        let written: Vec<_> = report.written().map(|f| f.path.display().to_string()).collect();
        tracing::warn!(
            service = service.name(),
            files = ?written,
            "aborting; restarting for files already written"
        );
        if let Err(e) = restart(service) {
            tracing::error!(service = service.name(), error = %e, "restart after abort failed");
        }
    }

    fn reconcile_file<S: MailService + ?Sized>(
        &self,
        service: &S,
        config: &MailServerConfig,
        file: &ConfigFile,
    ) -> Result<FileReport> {
        file.validate()?;

        let path = self.destination(file);
        tracing::info!(
            service = service.name(),
            template = %file.template_name,
            file = %file.file_name,
            "applying template"
        );

        let rendered = self.renderer.render(&file.template_name, config)?;
        let outcome = write_if_different(&path, &rendered)?;

        Ok(FileReport {
            template: file.template_name.clone(),
            path,
            outcome,
        })
    }

    /// Report the drift of every file without writing or restarting.
    ///
    /// Validation and rendering failures are reported the same way
    /// [`reconcile`](Self::reconcile) reports them.
    pub fn check(
        &self,
        service: &str,
        config: &MailServerConfig,
        requirements: &[Requirement],
        files: &[ConfigFile],
    ) -> Result<CheckReport> {
        config.validate(requirements)?;

        let mut report = CheckReport {
            service: service.to_string(),
            files: Vec::with_capacity(files.len()),
        };

        for file in files {
            file.validate()?;
            let path = self.destination(file);
            let rendered = self.renderer.render(&file.template_name, config)?;
            let drift = has_drifted(&path, &rendered)?;

            tracing::debug!(service, file = %path.display(), %drift, "checked file");
            report.files.push(FileDrift {
                template: file.template_name.clone(),
                path,
                drift,
            });
        }

        Ok(report)
    }
}

fn restart<S: MailService + ?Sized>(service: &S) -> Result<()> {
    service.restart().map_err(|source| Error::RestartFailed {
        service: service.name().to_string(),
        source: Box::new(source),
    })
}
