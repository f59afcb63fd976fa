//! Descriptor model and settings for mailconf.
//!
//! This crate holds the data that drives reconciliation: the
//! [`MailServerConfig`] descriptor every template is rendered against, the
//! [`ConfigFile`] targets each service owns, and the [`Settings`] a run is
//! configured with.

pub mod error;
pub mod model;
pub mod policy;
pub mod settings;
pub mod validation;

pub use error::{Error, Result};
pub use model::{ConfigFile, LoadBalancer, MailServerConfig, SqlServer};
pub use policy::{RestartPolicy, StopPolicy};
pub use settings::{Settings, SettingsStore};
pub use validation::{Requirement, ValidationError};
