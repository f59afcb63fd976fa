//! Reconciliation of a service's configuration files
//!
//! - **engine**: the [`Reconciler`] that renders, compares, writes and restarts
//! - **report**: what a reconciliation or a dry-run check found

mod engine;
mod report;

pub use engine::Reconciler;
pub use report::{CheckReport, FileDrift, FileReport, ReconcileReport};
