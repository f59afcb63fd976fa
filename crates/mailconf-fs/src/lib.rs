//! Filesystem layer for mailconf
//!
//! Provides the pieces of configuration reconciliation that touch the disk:
//!
//! - [`checksum`]: content fingerprints used for equality comparison
//! - [`drift`]: staging a rendered candidate next to its target and comparing
//! - [`writer`]: writing a candidate only when it differs from what is deployed
//! - [`io`]: atomic write and read primitives

pub mod checksum;
pub mod drift;
pub mod error;
pub mod io;
pub mod writer;

pub use checksum::Fingerprint;
pub use drift::{Drift, has_drifted};
pub use error::{Error, Result};
pub use writer::{WriteOutcome, write_if_different};
