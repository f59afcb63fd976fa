//! Recording fakes for the engine's external capabilities.

use std::collections::HashMap;
use std::sync::Mutex;

use mailconf_core::{
    CommandOutput, CommandRunner, Error, MailService, ReconcileReport, Reconciler, Result,
    ServiceControl, ServiceState,
};
use mailconf_meta::{ConfigFile, MailServerConfig, Requirement};

/// A [`MailService`] that records every lifecycle call.
///
/// `configure` reconciles the files given at construction through the given
/// [`Reconciler`], so restarts issued by the engine show up in [`calls`].
///
/// [`calls`]: FakeService::calls
pub struct FakeService {
    name: String,
    reconciler: Reconciler,
    files: Vec<ConfigFile>,
    requirements: &'static [Requirement],
    state: Mutex<ServiceState>,
    fail_restart: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeService {
    pub fn new(name: &str, reconciler: Reconciler, files: Vec<ConfigFile>) -> Self {
        Self {
            name: name.to_string(),
            reconciler,
            files,
            requirements: &[],
            state: Mutex::new(ServiceState::Stopped),
            fail_restart: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_requirements(mut self, requirements: &'static [Requirement]) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn with_state(self, state: ServiceState) -> Self {
        *self.state.lock().unwrap() = state;
        self
    }

    /// Make every `restart` fail like a broken unit would.
    pub fn failing_restart(mut self) -> Self {
        self.fail_restart = true;
        self
    }

    /// Lifecycle calls in order: `start`, `stop`, `restart`, `status`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

impl MailService for FakeService {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self) -> Result<()> {
        self.record("start");
        *self.state.lock().unwrap() = ServiceState::Running;
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.record("stop");
        *self.state.lock().unwrap() = ServiceState::Stopped;
        Ok(())
    }

    fn restart(&self) -> Result<()> {
        self.record("restart");
        if self.fail_restart {
            return Err(Error::CommandFailed {
                command: format!("systemctl restart {}", self.name),
                code: 1,
                stderr: "unit failed".into(),
            });
        }
        *self.state.lock().unwrap() = ServiceState::Running;
        Ok(())
    }

    fn status(&self) -> ServiceState {
        self.record("status");
        *self.state.lock().unwrap()
    }

    fn init(&self) -> Result<()> {
        Ok(())
    }

    fn configure(&self, config: &MailServerConfig) -> Result<ReconcileReport> {
        self.reconciler
            .reconcile(self, config, self.requirements, &self.files)
    }

    fn config_files(&self) -> Vec<ConfigFile> {
        self.files.clone()
    }

    fn requirements(&self) -> &'static [Requirement] {
        self.requirements
    }
}

/// A [`ServiceControl`] that records `verb unit` strings.
#[derive(Default)]
pub struct RecordingControl {
    states: Mutex<HashMap<String, ServiceState>>,
    calls: Mutex<Vec<String>>,
}

impl RecordingControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(self, unit: &str, state: ServiceState) -> Self {
        self.states.lock().unwrap().insert(unit.to_string(), state);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    fn record(&self, verb: &str, unit: &str) {
        self.calls.lock().unwrap().push(format!("{} {}", verb, unit));
    }
}

impl ServiceControl for RecordingControl {
    fn start(&self, unit: &str) -> Result<()> {
        self.record("start", unit);
        Ok(())
    }

    fn stop(&self, unit: &str) -> Result<()> {
        self.record("stop", unit);
        Ok(())
    }

    fn restart(&self, unit: &str) -> Result<()> {
        self.record("restart", unit);
        Ok(())
    }

    fn status(&self, unit: &str) -> ServiceState {
        self.states
            .lock()
            .unwrap()
            .get(unit)
            .copied()
            .unwrap_or(ServiceState::Unknown)
    }
}

/// A [`CommandRunner`] that records command lines and answers from a script.
///
/// Responses are matched by command-line prefix, most recently added first.
/// Unmatched commands succeed with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: Mutex<Vec<(String, CommandOutput)>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix` with `stdout` and exit `code`.
    pub fn respond(self, prefix: &str, code: i32, stdout: &str) -> Self {
        self.responses.lock().unwrap().push((
            prefix.to_string(),
            CommandOutput {
                code: Some(code),
                stdout: stdout.to_string(),
                stderr: if code == 0 { String::new() } else { format!("{} failed", prefix) },
            },
        ));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ran(&self, command: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c == command)
    }
}

impl CommandRunner for ScriptedRunner {
    fn output(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let line = if args.is_empty() {
            program.to_string()
        } else {
            format!("{} {}", program, args.join(" "))
        };
        self.calls.lock().unwrap().push(line.clone());

        let responses = self.responses.lock().unwrap();
        let output = responses
            .iter()
            .rev()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or(CommandOutput {
                code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            });
        Ok(output)
    }
}
