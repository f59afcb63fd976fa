//! SHA-256 content fingerprints
//!
//! A [`Fingerprint`] is only ever compared for equality. It answers "are these
//! two byte sequences the same configuration?" and is not an integrity
//! guarantee against tampering.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Prefix for all fingerprints produced by this module
const PREFIX: &str = "sha256:";

/// Content fingerprint in the canonical `sha256:<hex>` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint an in-memory byte sequence.
    pub fn of_bytes(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self(format!("{}{:x}", PREFIX, hasher.finalize()))
    }

    /// Fingerprint the current contents of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn of_file(path: &Path) -> Result<Self> {
        let content = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::of_bytes(&content))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
