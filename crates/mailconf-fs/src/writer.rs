//! Conditional config writer
//!
//! Writes a candidate to its destination only when drift is detected, and
//! tells the caller whether a write happened so it can decide on a restart.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Drift, Result, has_drifted, io};

/// Outcome of [`write_if_different`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOutcome {
    /// The destination was created or replaced
    Written,
    /// The destination already held the candidate bytes
    Unchanged,
}

impl WriteOutcome {
    pub fn is_written(self) -> bool {
        matches!(self, Self::Written)
    }
}

/// Write `candidate` to `dest` if it is absent or differs.
///
/// The replacement goes through [`io::write_atomic`], so a failed write
/// leaves the previous configuration in place.
pub fn write_if_different(dest: &Path, candidate: &[u8]) -> Result<WriteOutcome> {
    let drift = has_drifted(dest, candidate)?;

    match drift {
        Drift::Same => {
            tracing::debug!(path = %dest.display(), "configuration is up to date");
            Ok(WriteOutcome::Unchanged)
        }
        Drift::Absent | Drift::Different => {
            tracing::info!(path = %dest.display(), %drift, "writing configuration");
            io::write_atomic(dest, candidate)?;
            Ok(WriteOutcome::Written)
        }
    }
}
