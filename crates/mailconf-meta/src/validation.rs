//! Required-field validation for descriptors and config file targets

/// A required field was empty or missing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required field: {field}")]
pub struct ValidationError {
    /// Dotted name of the offending field, e.g. `load_balancer.hostname`
    pub field: String,
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

/// Service-specific descriptor requirements on top of `domain` and
/// `sub_domain`, which are always required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// The mail transfer agent advertises the load balancer's hostname
    LoadBalancerHostname,
    /// Virtual mailbox lookups need a complete SQL server block
    SqlServer,
}

/// Fail with the field name when `value` is blank.
pub(crate) fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::missing(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_counts_as_missing() {
        assert_eq!(
            require("domain", "  "),
            Err(ValidationError::missing("domain"))
        );
        assert!(require("domain", "example.com").is_ok());
    }

    #[test]
    fn error_names_the_field() {
        let err = ValidationError::missing("sql_server.password");
        assert_eq!(err.to_string(), "missing required field: sql_server.password");
    }
}
