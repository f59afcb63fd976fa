//! External command execution
//!
//! Everything the engine does to the host beyond reading and writing
//! configuration files goes through [`CommandRunner`], so tests can script
//! the host instead of touching it.

use std::process::Command;

use crate::{Error, Result};

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Capability to run a program with arguments and wait for it.
pub trait CommandRunner: Send + Sync {
    /// Run the command and return its output whatever the exit status.
    fn output(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;

    /// Run the command, failing on a non-zero exit status.
    ///
    /// Returns stdout on success.
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let output = self.output(program, args)?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(Error::CommandFailed {
                command: command_line(program, args),
                code: output.code.unwrap_or(-1),
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs commands on the local host via `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn output(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        tracing::debug!(command = %command_line(program, args), "running command");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| Error::CommandSpawn {
                program: program.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

pub(crate) fn command_line(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
