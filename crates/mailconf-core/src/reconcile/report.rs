//! Reports produced by reconciliation and drift checks

use std::path::PathBuf;

use mailconf_fs::{Drift, WriteOutcome};
use serde::{Deserialize, Serialize};

/// What happened to one configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// Template the file was rendered from
    pub template: String,
    /// Destination the file was reconciled at
    pub path: PathBuf,
    pub outcome: WriteOutcome,
}

/// Result of reconciling every file of one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub service: String,
    /// Files in the order they were processed
    pub files: Vec<FileReport>,
    /// Number of restarts issued for this service
    pub restarts: usize,
}

impl ReconcileReport {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            files: Vec::new(),
            restarts: 0,
        }
    }

    /// Whether at least one file was written.
    pub fn changed(&self) -> bool {
        self.files.iter().any(|f| f.outcome.is_written())
    }

    pub fn written(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.outcome.is_written())
    }
}

/// Drift of one configuration file, found without writing anything
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDrift {
    pub template: String,
    pub path: PathBuf,
    pub drift: Drift,
}

/// Result of a dry-run check of one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub service: String,
    pub files: Vec<FileDrift>,
}

impl CheckReport {
    /// Whether every file is deployed with exactly the rendered content.
    pub fn is_in_sync(&self) -> bool {
        self.files.iter().all(|f| f.drift == Drift::Same)
    }

    pub fn drifted(&self) -> impl Iterator<Item = &FileDrift> {
        self.files.iter().filter(|f| f.drift != Drift::Same)
    }
}
