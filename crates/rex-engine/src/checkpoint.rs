use std::fs;
use std::path::{Path, PathBuf};

use rex_core::errors::ErrorInfo;
use rex_core::{Microstate, RexError, SchemaVersion};
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::exchange::ExchangeAttempt;
use crate::replica::Replica;
use crate::summary::DegradedReplica;

/// Serializable state of one checkpointed replica.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicaCheckpoint {
    /// Stable replica identity.
    pub index: usize,
    /// Rung the replica occupied when the checkpoint was written.
    pub rung: usize,
    /// Cumulative completed epochs.
    pub epochs: u64,
    /// Full microstate, including the integrator stream position.
    pub microstate: Microstate,
    /// Bounded energy history, oldest first.
    #[serde(default)]
    pub recent_energies: Vec<f64>,
}

/// Aggregated checkpoint payload; sufficient to resume a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointPayload {
    /// Schema version of the payload layout.
    #[serde(default)]
    pub schema: SchemaVersion,
    /// Round count completed when the checkpoint was written.
    pub round: usize,
    /// Configuration snapshot associated with the run.
    pub config: RunConfig,
    /// Master seed used to derive all substreams.
    pub master_seed: u64,
    /// Replica states stored in the checkpoint, ordered by replica index.
    pub replicas: Vec<ReplicaCheckpoint>,
    /// Complete exchange log up to the checkpointed round; the audit trail
    /// must survive a resume intact.
    pub exchange_log: Vec<ExchangeAttempt>,
    /// Lanes already degraded when the checkpoint was written. A resumed
    /// run must not revive them.
    #[serde(default)]
    pub degraded: Vec<DegradedReplica>,
}

impl CheckpointPayload {
    /// Restores the payload from disk.
    pub fn load(path: &Path) -> Result<Self, RexError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            RexError::Serde(
                ErrorInfo::new("checkpoint-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            RexError::Serde(
                ErrorInfo::new("checkpoint-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Writes the payload to disk.
    pub fn store(&self, path: &Path) -> Result<(), RexError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                RexError::Serde(
                    ErrorInfo::new("checkpoint-mkdir", err.to_string())
                        .with_context("path", parent.display().to_string()),
                )
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            RexError::Serde(
                ErrorInfo::new("checkpoint-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            RexError::Serde(
                ErrorInfo::new("checkpoint-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}

/// Constructs a checkpoint payload from live replica states.
pub fn build_payload(
    round: usize,
    config: &RunConfig,
    master_seed: u64,
    replicas: &[Replica],
    exchange_log: &[ExchangeAttempt],
    degraded: &[DegradedReplica],
) -> CheckpointPayload {
    CheckpointPayload {
        schema: SchemaVersion::default(),
        round,
        config: config.clone(),
        master_seed,
        replicas: replicas
            .iter()
            .map(|replica| ReplicaCheckpoint {
                index: replica.index(),
                rung: replica.rung(),
                epochs: replica.epochs(),
                microstate: replica.microstate.clone(),
                recent_energies: replica.recent_energies().collect(),
            })
            .collect(),
        exchange_log: exchange_log.to_vec(),
        degraded: degraded.to_vec(),
    }
}

/// Determines the next checkpoint file path using a deterministic numbering scheme.
pub fn checkpoint_path(root: &Path, round: usize) -> PathBuf {
    root.join(format!("ckpt_{round:05}.json"))
}

/// Deletes the oldest checkpoints beyond the retention limit.
pub fn enforce_retention(paths: &mut Vec<PathBuf>, max_to_keep: usize) -> Result<(), RexError> {
    while paths.len() > max_to_keep {
        let removed = paths.remove(0);
        fs::remove_file(&removed).map_err(|err| {
            RexError::Serde(
                ErrorInfo::new("checkpoint-remove", err.to_string())
                    .with_context("path", removed.display().to_string()),
            )
        })?;
    }
    Ok(())
}
