//! CLI argument parsing using clap derive

use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mailconf_core::ServiceKind;
use mailconf_meta::{RestartPolicy, StopPolicy};

/// mailconf - Keep mail daemon configuration in sync with a descriptor
#[derive(Parser, Debug)]
#[command(name = "mailconf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (TOML, JSON or YAML). Defaults to ./mailconf.toml when present
    #[arg(short, long, global = true, env = "MAILCONF_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Values that take precedence over the settings file
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Mail domain, e.g. example.com
    #[arg(long, global = true)]
    pub domain: Option<String>,

    /// Mail server label under the domain, e.g. mail
    #[arg(long, global = true)]
    pub sub_domain: Option<String>,

    /// Public hostname of the load balancer in front of the server
    #[arg(long, global = true)]
    pub lb_hostname: Option<String>,

    #[arg(long, global = true)]
    pub lb_ipv4: Option<Ipv4Addr>,

    #[arg(long, global = true)]
    pub lb_ipv6: Option<Ipv6Addr>,

    /// Directory holding the templates
    #[arg(long, global = true)]
    pub templates: Option<PathBuf>,

    /// Filesystem root every service path is resolved beneath
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Stop services before configuring them (always, if-running, never)
    #[arg(long, global = true)]
    pub stop_before_configure: Option<StopPolicy>,

    /// When to restart a service after writing its files (once, per-file)
    #[arg(long, global = true)]
    pub restart: Option<RestartPolicy>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Provision, initialize and configure services
    ///
    /// A failing service is reported and the remaining services still run.
    ///
    /// Examples:
    ///   mailconf apply                        # Every service
    ///   mailconf apply -s postfix -s dovecot  # Selected services
    Apply {
        /// Service to configure (repeatable; default: all)
        #[arg(short = 's', long = "service")]
        services: Vec<ServiceKind>,

        /// Skip the virtual mailbox user and folder setup
        #[arg(long)]
        skip_provision: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Report configuration drift without writing anything
    Check {
        /// Service to check (repeatable; default: all)
        #[arg(short = 's', long = "service")]
        services: Vec<ServiceKind>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Run only the per-service initialization step
    Init {
        /// Service to initialize (repeatable; default: all)
        #[arg(short = 's', long = "service")]
        services: Vec<ServiceKind>,
    },

    /// Show the state of each service
    Status {
        /// Service to query (repeatable; default: all)
        #[arg(short = 's', long = "service")]
        services: Vec<ServiceKind>,
    },

    /// Create the virtual mailbox folders, user and group
    Provision,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeated_services_and_overrides() {
        let cli = Cli::try_parse_from([
            "mailconf",
            "apply",
            "-s",
            "postfix",
            "--service",
            "opendkim",
            "--domain",
            "example.com",
            "--restart",
            "per-file",
        ])
        .unwrap();

        assert_eq!(cli.overrides.domain.as_deref(), Some("example.com"));
        assert_eq!(cli.overrides.restart, Some(RestartPolicy::PerFile));
        match cli.command {
            Commands::Apply { services, .. } => {
                assert_eq!(services, vec![ServiceKind::Postfix, ServiceKind::OpenDkim]);
            }
            other => panic!("expected apply, got {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_service() {
        assert!(Cli::try_parse_from(["mailconf", "check", "-s", "exim"]).is_err());
    }

    #[test]
    fn rejects_bad_address() {
        assert!(Cli::try_parse_from(["mailconf", "check", "--lb-ipv4", "300.1.1.1"]).is_err());
    }
}
