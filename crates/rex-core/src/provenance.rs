//! Provenance and schema descriptors shared across REX artifacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic version of a serialized payload layout.
///
/// Checkpoints and manifests embed this so older readers can refuse payloads
/// they do not understand instead of misparsing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Incremented for breaking layout changes.
    pub major: u32,
    /// Incremented for additive changes.
    pub minor: u32,
    /// Incremented for fixes that do not affect the layout.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Provenance information attached to every serialized run artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Hash of the input configuration used to produce the data.
    pub config_hash: String,
    /// Canonical hash of the parameter ladder the run was executed against.
    pub ladder_hash: String,
    /// Master deterministic seed used for all randomness.
    pub seed: u64,
    /// ISO-8601 timestamp recording when the artifact was generated.
    pub created_at: String,
    /// Version map for all tools involved in the run.
    pub tool_versions: BTreeMap<String, String>,
}
