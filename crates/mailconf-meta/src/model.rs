//! The mail server descriptor and config file targets

use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::validation::{Requirement, ValidationError, require};

/// Front-end load balancer the mail server is published behind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancer {
    #[serde(default)]
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<Ipv6Addr>,
}

/// Relational store holding virtual mailbox mappings.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlServer {
    pub server_name: String,
    pub database_name: String,
    pub username: String,
    pub password: String,
}

// Keep the password out of logs.
impl std::fmt::Debug for SqlServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlServer")
            .field("server_name", &self.server_name)
            .field("database_name", &self.database_name)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Descriptor driving every service template.
///
/// Owned by the caller and only ever borrowed by the reconciliation engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailServerConfig {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub sub_domain: String,
    #[serde(default)]
    pub load_balancer: LoadBalancer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_server: Option<SqlServer>,
}

impl MailServerConfig {
    pub fn new(domain: impl Into<String>, sub_domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            sub_domain: sub_domain.into(),
            ..Self::default()
        }
    }

    pub fn with_load_balancer(mut self, load_balancer: LoadBalancer) -> Self {
        self.load_balancer = load_balancer;
        self
    }

    pub fn with_sql_server(mut self, sql_server: SqlServer) -> Self {
        self.sql_server = Some(sql_server);
        self
    }

    /// Fully qualified host name of the mail server, `<sub_domain>.<domain>`.
    pub fn hostname(&self) -> String {
        format!("{}.{}", self.sub_domain, self.domain)
    }

    /// Check the always-required fields, then each extra requirement.
    ///
    /// Reports the first missing field in declaration order.
    pub fn validate(&self, requirements: &[Requirement]) -> Result<(), ValidationError> {
        require("domain", &self.domain)?;
        require("sub_domain", &self.sub_domain)?;

        for requirement in requirements {
            match requirement {
                Requirement::LoadBalancerHostname => {
                    require("load_balancer.hostname", &self.load_balancer.hostname)?;
                }
                Requirement::SqlServer => {
                    let sql = self
                        .sql_server
                        .as_ref()
                        .ok_or_else(|| ValidationError::missing("sql_server"))?;
                    require("sql_server.server_name", &sql.server_name)?;
                    require("sql_server.database_name", &sql.database_name)?;
                    require("sql_server.username", &sql.username)?;
                    require("sql_server.password", &sql.password)?;
                }
            }
        }

        Ok(())
    }
}

/// One rendering target: which template produces which file where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Template identifier, looked up under the templates root
    pub template_name: String,
    /// Absolute directory the daemon reads its configuration from
    pub destination_dir: String,
    /// File name within `destination_dir`
    pub file_name: String,
}

impl ConfigFile {
    pub fn new(
        template_name: impl Into<String>,
        destination_dir: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            template_name: template_name.into(),
            destination_dir: destination_dir.into(),
            file_name: file_name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("template_name", &self.template_name)?;
        require("destination_dir", &self.destination_dir)?;
        require("file_name", &self.file_name)?;
        Ok(())
    }

    /// Destination path as the daemon sees it, e.g. `/etc/postfix/main.cf`.
    pub fn destination(&self) -> PathBuf {
        PathBuf::from(&self.destination_dir).join(&self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sql() -> SqlServer {
        SqlServer {
            server_name: "db.internal".into(),
            database_name: "mailserver".into(),
            username: "mailuser".into(),
            password: "s3cret".into(),
        }
    }

    #[test]
    fn hostname_joins_sub_domain_and_domain() {
        let config = MailServerConfig::new("example.com", "mail");
        assert_eq!(config.hostname(), "mail.example.com");
    }

    #[test]
    fn domain_is_checked_before_sub_domain() {
        let config = MailServerConfig::new("", "");
        assert_eq!(
            config.validate(&[]),
            Err(ValidationError::missing("domain"))
        );
    }

    #[test]
    fn load_balancer_requirement_needs_hostname() {
        let config = MailServerConfig::new("example.com", "mail");
        assert_eq!(
            config.validate(&[Requirement::LoadBalancerHostname]),
            Err(ValidationError::missing("load_balancer.hostname"))
        );
    }

    #[test]
    fn sql_requirement_names_missing_block() {
        let config = MailServerConfig::new("example.com", "mail");
        assert_eq!(
            config.validate(&[Requirement::SqlServer]),
            Err(ValidationError::missing("sql_server"))
        );
    }

    #[test]
    fn sql_requirement_names_missing_password() {
        let config = MailServerConfig::new("example.com", "mail").with_sql_server(SqlServer {
            password: String::new(),
            ..sql()
        });
        assert_eq!(
            config.validate(&[Requirement::SqlServer]),
            Err(ValidationError::missing("sql_server.password"))
        );
    }

    #[test]
    fn complete_descriptor_passes_all_requirements() {
        let config = MailServerConfig::new("example.com", "mail")
            .with_load_balancer(LoadBalancer {
                hostname: "lb.example.com".into(),
                ..LoadBalancer::default()
            })
            .with_sql_server(sql());
        assert!(
            config
                .validate(&[Requirement::LoadBalancerHostname, Requirement::SqlServer])
                .is_ok()
        );
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", sql());
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn config_file_validation_names_field() {
        let file = ConfigFile::new("postfix_main.cf.tpl", "/etc/postfix", "");
        assert_eq!(file.validate(), Err(ValidationError::missing("file_name")));
    }

    #[test]
    fn config_file_destination() {
        let file = ConfigFile::new("dovecot_conf.d_10-auth.conf.tpl", "/etc/dovecot/conf.d", "10-auth.conf");
        assert_eq!(file.destination(), PathBuf::from("/etc/dovecot/conf.d/10-auth.conf"));
    }
}
