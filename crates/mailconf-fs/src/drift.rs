//! Drift detection between a rendered candidate and the deployed file
//!
//! The candidate is staged to a sibling temporary file and fingerprinted from
//! disk, so both sides of the comparison are produced the same way.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Fingerprint, Result, io};

/// Relationship between a candidate configuration and the deployed one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Drift {
    /// Nothing is deployed at the target path yet
    Absent,
    /// The deployed bytes match the candidate exactly
    Same,
    /// The deployed bytes differ from the candidate
    Different,
}

impl Drift {
    /// Whether the target needs to be (re)written.
    pub fn needs_write(self) -> bool {
        !matches!(self, Self::Same)
    }
}

impl std::fmt::Display for Drift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Absent => "absent",
            Self::Same => "same",
            Self::Different => "different",
        };
        f.write_str(s)
    }
}

/// Compare `candidate` against the file at `existing`.
///
/// Returns [`Drift::Absent`] without touching the disk when nothing exists at
/// `existing`. Otherwise the candidate is written to a sibling temp file, both
/// files are fingerprinted, and the temp file is deleted before returning.
///
/// # Errors
///
/// Returns an error if the existing file cannot be read or the staging file
/// cannot be written.
pub fn has_drifted(existing: &Path, candidate: &[u8]) -> Result<Drift> {
    if !existing.exists() {
        return Ok(Drift::Absent);
    }

    let existing_fp = Fingerprint::of_file(existing)?;

    let staged = io::sibling_temp_path(existing)?;
    let staged_fp = io::write_synced(&staged, candidate).and_then(|()| Fingerprint::of_file(&staged));
    io::remove_quietly(&staged);
    let staged_fp = staged_fp?;

    tracing::debug!(
        path = %existing.display(),
        existing = %existing_fp,
        candidate = %staged_fp,
        "compared fingerprints"
    );

    if staged_fp == existing_fp {
        Ok(Drift::Same)
    } else {
        Ok(Drift::Different)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_same_skips_write() {
        assert!(Drift::Absent.needs_write());
        assert!(Drift::Different.needs_write());
        assert!(!Drift::Same.needs_write());
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(Drift::Different.to_string(), "different");
    }
}
