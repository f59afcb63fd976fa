//! [`TestDeployment`] fixture for reconciliation scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mailconf_core::{
    CommandRunner, Provisioner, Reconciler, ServiceContext, ServiceControl, TemplateRenderer,
};
use mailconf_meta::{LoadBalancer, MailServerConfig, RestartPolicy, SqlServer, StopPolicy};
use tempfile::TempDir;

/// The `templates/` directory shipped at the workspace root.
pub fn shipped_templates_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("templates")
}

/// A temporary directory holding a `templates/` folder and a `root/`
/// folder that stands in for `/`.
///
/// # Example
///
/// ```rust,no_run
/// use mailconf_test_utils::TestDeployment;
///
/// let deployment = TestDeployment::new();
/// deployment.write_template("main.cf.tpl", "myhostname = {{ hostname }}\n");
/// let reconciler = deployment.reconciler();
/// ```
pub struct TestDeployment {
    temp_dir: TempDir,
    templates: PathBuf,
}

impl Default for TestDeployment {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDeployment {
    /// Empty templates directory and empty root.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let templates = temp_dir.path().join("templates");
        fs::create_dir_all(&templates).unwrap();
        fs::create_dir_all(temp_dir.path().join("root")).unwrap();
        Self {
            temp_dir,
            templates,
        }
    }

    /// Use the templates shipped with the workspace instead of an empty
    /// directory.
    pub fn with_shipped_templates() -> Self {
        let mut deployment = Self::new();
        deployment.templates = shipped_templates_dir();
        deployment
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates
    }

    /// The directory standing in for `/`.
    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join("root")
    }

    pub fn write_template(&self, name: &str, content: &str) {
        fs::write(self.templates.join(name), content).unwrap();
    }

    /// Resolve an absolute daemon path inside the fake root.
    pub fn path(&self, absolute: &str) -> PathBuf {
        self.root().join(absolute.trim_start_matches('/'))
    }

    /// Put a file in place as if it had been deployed earlier.
    pub fn deploy(&self, absolute: &str, content: &str) {
        let path = self.path(absolute);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn read(&self, absolute: &str) -> String {
        fs::read_to_string(self.path(absolute))
            .unwrap_or_else(|e| panic!("reading deployed {}: {}", absolute, e))
    }

    pub fn exists(&self, absolute: &str) -> bool {
        self.path(absolute).exists()
    }

    pub fn reconciler(&self) -> Reconciler {
        self.reconciler_with(RestartPolicy::Once)
    }

    pub fn reconciler_with(&self, policy: RestartPolicy) -> Reconciler {
        Reconciler::new(TemplateRenderer::new(&self.templates), self.root())
            .with_restart_policy(policy)
    }

    pub fn context(
        &self,
        control: Arc<dyn ServiceControl>,
        runner: Arc<dyn CommandRunner>,
        stop_policy: StopPolicy,
    ) -> ServiceContext {
        ServiceContext::new(
            self.reconciler(),
            control,
            Provisioner::new(runner, self.root()),
            stop_policy,
        )
    }
}

/// Descriptor used throughout the scenario tests.
pub fn example_config() -> MailServerConfig {
    MailServerConfig::new("example.com", "mail").with_load_balancer(LoadBalancer {
        hostname: "lb.example.com".into(),
        ..LoadBalancer::default()
    })
}

/// [`example_config`] plus a complete SQL server block.
pub fn example_config_with_sql() -> MailServerConfig {
    example_config().with_sql_server(SqlServer {
        server_name: "db.internal".into(),
        database_name: "mailserver".into(),
        username: "mailuser".into(),
        password: "s3cret".into(),
    })
}
