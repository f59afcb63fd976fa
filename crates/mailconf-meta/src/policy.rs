//! Policies controlling how services are stopped and restarted

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Whether `init` stops a service before it is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopPolicy {
    /// Always issue a stop
    Always,
    /// Stop only a service that reports itself running
    IfRunning,
    /// Leave the service as it is
    #[default]
    Never,
}

impl FromStr for StopPolicy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "if-running" | "if_running" => Ok(Self::IfRunning),
            "never" => Ok(Self::Never),
            _ => Err(Error::InvalidPolicy {
                kind: "stop",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for StopPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::IfRunning => write!(f, "if-running"),
            Self::Never => write!(f, "never"),
        }
    }
}

/// When a service is restarted after its files were written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    /// At most once, after every file of the service reconciled cleanly
    #[default]
    Once,
    /// Right after each file that was written
    PerFile,
}

impl FromStr for RestartPolicy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "once" => Ok(Self::Once),
            "per-file" | "per_file" => Ok(Self::PerFile),
            _ => Err(Error::InvalidPolicy {
                kind: "restart",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Once => write!(f, "once"),
            Self::PerFile => write!(f, "per-file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("always", StopPolicy::Always)]
    #[case("if-running", StopPolicy::IfRunning)]
    #[case("IF_RUNNING", StopPolicy::IfRunning)]
    #[case("never", StopPolicy::Never)]
    fn stop_policy_parses(#[case] input: &str, #[case] expected: StopPolicy) {
        assert_eq!(input.parse::<StopPolicy>().unwrap(), expected);
    }

    #[test]
    fn stop_policy_display_round_trips() {
        for policy in [StopPolicy::Always, StopPolicy::IfRunning, StopPolicy::Never] {
            assert_eq!(policy.to_string().parse::<StopPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn unknown_restart_policy_is_rejected() {
        let err = "sometimes".parse::<RestartPolicy>().unwrap_err();
        assert!(err.to_string().contains("sometimes"));
    }

    #[test]
    fn defaults_are_conservative() {
        assert_eq!(StopPolicy::default(), StopPolicy::Never);
        assert_eq!(RestartPolicy::default(), RestartPolicy::Once);
    }
}
