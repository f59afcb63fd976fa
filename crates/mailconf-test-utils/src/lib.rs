//! Shared test utilities for the mailconf workspace.
//!
//! This crate provides fakes for the capabilities the engine depends on and
//! a scratch deployment fixture. It is a dev-dependency only - never
//! published.
//!
//! # Modules
//!
//! - [`fakes`] - recording [`MailService`](mailconf_core::MailService),
//!   [`ServiceControl`](mailconf_core::ServiceControl) and
//!   [`CommandRunner`](mailconf_core::CommandRunner) implementations
//! - [`deployment`] - [`TestDeployment`] with a templates directory and a
//!   deployment root in one temporary directory

pub mod deployment;
pub mod fakes;

pub use deployment::{TestDeployment, example_config, example_config_with_sql, shipped_templates_dir};
pub use fakes::{FakeService, RecordingControl, ScriptedRunner};
