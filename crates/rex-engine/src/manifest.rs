use std::fs;
use std::path::{Path, PathBuf};

use rex_core::errors::ErrorInfo;
use rex_core::{RexError, RunProvenance, SchemaVersion};
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::summary::{DegradedReplica, RunState};

/// Structured manifest describing a completed replica-exchange run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Schema version of the manifest layout.
    #[serde(default)]
    pub schema: SchemaVersion,
    /// Configuration used for the run.
    pub config: RunConfig,
    /// Master seed used to derive all substreams.
    pub master_seed: u64,
    /// Optional seed label captured from the configuration.
    pub seed_label: Option<String>,
    /// Terminal state of the scheduler.
    pub state: RunState,
    /// Rounds actually completed.
    pub rounds_completed: usize,
    /// Final replica-to-rung assignment, indexed by replica.
    pub assignment: Vec<usize>,
    /// Replicas degraded during the run, with the round of degradation.
    pub degraded: Vec<DegradedReplica>,
    /// SHA-256 hash over the terminal assignment and energies.
    pub state_hash: String,
    /// Provenance descriptor for the artifacts.
    pub provenance: RunProvenance,
    /// Metrics file produced during the run (relative to run directory).
    pub metrics_file: Option<PathBuf>,
    /// Checkpoint files generated during the run (relative order preserved).
    pub checkpoints: Vec<PathBuf>,
    /// Snapshot files generated during the run.
    pub snapshots: Vec<PathBuf>,
}

impl RunManifest {
    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), RexError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                RexError::Serde(
                    ErrorInfo::new("manifest-mkdir", err.to_string())
                        .with_context("path", parent.display().to_string()),
                )
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            RexError::Serde(
                ErrorInfo::new("manifest-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            RexError::Serde(
                ErrorInfo::new("manifest-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, RexError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            RexError::Serde(
                ErrorInfo::new("manifest-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            RexError::Serde(
                ErrorInfo::new("manifest-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}
