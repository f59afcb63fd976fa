//! Cross-crate deployment scenarios
//!
//! Every scenario runs the real services against the shipped templates, with
//! the deployment root redirected into a temporary directory and all OS
//! commands answered by a scripted runner.

use std::fs;
use std::sync::Arc;

use mailconf_core::{CommandRunner, MailService, ServiceContext, ServiceKind, VirtualMailbox};
use mailconf_fs::{Drift, WriteOutcome, has_drifted};
use mailconf_meta::{RestartPolicy, Settings, SettingsStore};
use mailconf_test_utils::{
    ScriptedRunner, TestDeployment, example_config, example_config_with_sql,
    shipped_templates_dir,
};
use pretty_assertions::assert_eq;

// =============================================================================
// Test Infrastructure
// =============================================================================

/// A deployment wired the way the CLI wires it: settings, `systemctl`
/// control and host provisioning all going through one scripted runner.
struct Site {
    deployment: TestDeployment,
    runner: Arc<ScriptedRunner>,
    settings: Settings,
}

impl Site {
    fn new() -> Self {
        Self::with_restart(RestartPolicy::Once)
    }

    fn with_restart(restart: RestartPolicy) -> Self {
        let deployment = TestDeployment::with_shipped_templates();
        let settings = Settings {
            templates_dir: shipped_templates_dir(),
            root: deployment.root(),
            restart,
            server: example_config_with_sql(),
            ..Settings::default()
        };
        let runner = Arc::new(
            ScriptedRunner::new()
                .respond("hostname -s", 0, "mx1\n")
                .respond("getent", 2, ""),
        );
        Self {
            deployment,
            runner,
            settings,
        }
    }

    fn context(&self) -> ServiceContext {
        let runner: Arc<dyn CommandRunner> = self.runner.clone();
        ServiceContext::from_settings(&self.settings, runner)
    }

    fn services(&self) -> Vec<Box<dyn MailService>> {
        let ctx = self.context();
        ServiceKind::ALL
            .into_iter()
            .map(|kind| kind.build(ctx.clone()))
            .collect()
    }

    fn restarts(&self, unit: &str) -> usize {
        let command = format!("systemctl restart {}", unit);
        self.runner.calls().iter().filter(|c| **c == command).count()
    }

    /// Provision, init and configure every service the way `apply` does.
    fn apply(&self) -> Vec<mailconf_core::ReconcileReport> {
        VirtualMailbox::new(self.context().provisioner.clone())
            .setup()
            .unwrap();
        self.services()
            .iter()
            .map(|service| {
                service.init().unwrap();
                service.configure(&self.settings.server).unwrap()
            })
            .collect()
    }
}

// =============================================================================
// End-to-end
// =============================================================================

#[test]
fn test_postfix_end_to_end() {
    let site = Site::new();
    let postfix = ServiceKind::Postfix.build(site.context());

    let report = postfix.configure(&example_config()).unwrap();

    assert_eq!(report.files.len(), 3);
    assert!(report.files.iter().all(|f| f.outcome == WriteOutcome::Written));
    assert_eq!(site.restarts("postfix"), 1);

    let main_cf = site.deployment.read("/etc/postfix/main.cf");
    assert!(main_cf.contains("mydomain = example.com"), "got:\n{}", main_cf);
    assert!(main_cf.contains("myhostname = mail.example.com"));
    assert!(main_cf.contains("lb.example.com"));
    for file in ["header_checks", "main.cf", "master.cf"] {
        let content = site.deployment.read(&format!("/etc/postfix/{}", file));
        assert!(!content.contains("{{"), "{} left a placeholder", file);
    }
}

#[test]
fn test_full_apply_configures_every_service_once() {
    let site = Site::new();

    let reports = site.apply();

    let services: Vec<_> = reports.iter().map(|r| r.service.as_str()).collect();
    assert_eq!(services, vec!["Postfix", "Dovecot", "OpenDKIM", "OpenDMARC"]);
    for unit in ["postfix", "dovecot", "opendkim", "opendmarc"] {
        assert_eq!(site.restarts(unit), 1, "{} restarts", unit);
    }

    assert!(site.deployment.exists("/etc/dovecot/conf.d/10-ssl.conf"));
    assert!(site.deployment.exists("/etc/opendkim.conf"));
    assert!(site.deployment.exists("/etc/opendmarc.conf"));
    assert!(site.deployment.path("/var/mail/vhosts").is_dir());
    assert!(site.runner.ran("groupadd -g 5000 vmail"));
    assert!(
        site.deployment
            .read("/etc/opendkim/trusted.hosts")
            .ends_with("mx1\n")
    );
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_second_apply_is_a_no_op() {
    let site = Site::new();
    site.apply();

    let reports = site.apply();

    for report in &reports {
        assert!(!report.changed(), "{} changed on rerun", report.service);
        assert_eq!(report.restarts, 0);
    }
    for unit in ["postfix", "dovecot", "opendkim", "opendmarc"] {
        assert_eq!(site.restarts(unit), 1, "{} restarted again", unit);
    }
}

#[test]
fn test_check_after_apply_reports_no_drift() {
    let site = Site::new();
    site.apply();
    let ctx = site.context();

    for service in site.services() {
        let report = ctx
            .reconciler
            .check(
                service.name(),
                &site.settings.server,
                service.requirements(),
                &service.config_files(),
            )
            .unwrap();
        assert!(report.is_in_sync(), "{} drifted", service.name());
    }
}

// =============================================================================
// Drift detection
// =============================================================================

#[test]
fn test_drift_against_deployed_file() {
    let site = Site::new();
    let postfix = ServiceKind::Postfix.build(site.context());
    let main_cf = site.deployment.path("/etc/postfix/main.cf");

    assert_eq!(has_drifted(&main_cf, b"anything").unwrap(), Drift::Absent);

    postfix.configure(&example_config()).unwrap();
    let deployed = fs::read(&main_cf).unwrap();
    assert_eq!(has_drifted(&main_cf, &deployed).unwrap(), Drift::Same);

    let mut edited = deployed.clone();
    edited.push(b'\n');
    assert_eq!(has_drifted(&main_cf, &edited).unwrap(), Drift::Different);
}

#[test]
fn test_hand_edit_is_reverted_with_one_restart() {
    let site = Site::new();
    let postfix = ServiceKind::Postfix.build(site.context());
    postfix.configure(&example_config()).unwrap();
    let original = site.deployment.read("/etc/postfix/master.cf");

    site.deployment.deploy("/etc/postfix/master.cf", "# emptied by hand\n");
    let report = postfix.configure(&example_config()).unwrap();

    assert_eq!(report.written().count(), 1);
    assert_eq!(site.deployment.read("/etc/postfix/master.cf"), original);
    assert_eq!(site.restarts("postfix"), 2);
}

// =============================================================================
// Validation and restart policy
// =============================================================================

#[test]
fn test_dovecot_without_sql_writes_nothing() {
    let site = Site::new();
    let dovecot = ServiceKind::Dovecot.build(site.context());

    let err = dovecot.configure(&example_config()).unwrap_err();

    assert!(err.is_validation());
    assert!(!site.deployment.exists("/etc/dovecot"));
    assert_eq!(site.restarts("dovecot"), 0);
}

#[test]
fn test_per_file_policy_restarts_for_every_written_file() {
    let site = Site::with_restart(RestartPolicy::PerFile);
    let dovecot = ServiceKind::Dovecot.build(site.context());

    let report = dovecot.configure(&example_config_with_sql()).unwrap();

    assert_eq!(report.restarts, 7);
    assert_eq!(site.restarts("dovecot"), 7);
}

// =============================================================================
// Settings
// =============================================================================

#[test]
fn test_settings_file_drives_a_run() {
    let site = Site::new();
    let settings_path = site.deployment.root().join("..").join("mailconf.json");
    let json = serde_json::json!({
        "templates_dir": shipped_templates_dir(),
        "root": site.deployment.root(),
        "restart": "once",
        "server": {
            "domain": "example.net",
            "sub_domain": "smtp",
            "load_balancer": { "hostname": "lb.example.net", "ipv4": "198.51.100.7" }
        }
    });
    fs::write(&settings_path, serde_json::to_vec_pretty(&json).unwrap()).unwrap();

    let settings = SettingsStore::new().load(&settings_path).unwrap();
    let runner: Arc<dyn CommandRunner> = site.runner.clone();
    let ctx = ServiceContext::from_settings(&settings, runner);
    let opendmarc = ServiceKind::OpenDmarc.build(ctx);

    opendmarc.configure(&settings.server).unwrap();

    let conf = site.deployment.read("/etc/opendmarc.conf");
    assert!(conf.contains("AuthservID              smtp.example.net"), "got:\n{}", conf);
}
