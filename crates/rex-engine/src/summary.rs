use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::diagnostics::MetricSample;
use crate::exchange::ExchangeAttempt;

/// Terminal state of a finished run.
///
/// A run that returns a summary finished either `Completed` (every lane
/// healthy) or `Degraded` (at least one replica diverged and was excluded
/// while the rest continued). Unrecoverable configuration or resource errors
/// abort before or during the run and surface as an `Err` instead of a
/// summary, so an aborted run never carries a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunState {
    /// All requested rounds finished with every replica healthy.
    Completed,
    /// Finished with at least one degraded replica lane.
    Degraded,
}

/// Record of one replica lane's degradation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedReplica {
    /// Replica identity.
    pub replica: usize,
    /// Round at which the lane degraded.
    pub round: usize,
    /// Diagnostic reason extracted from the divergence error.
    pub reason: String,
}

/// Summary returned to callers after a run completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Terminal scheduler state (`Completed` or `Degraded`).
    pub state: RunState,
    /// Rounds actually completed (may be short of the configured total when
    /// the run was cancelled at a round boundary).
    pub rounds_completed: usize,
    /// Final replica-to-rung assignment, indexed by replica.
    pub assignment: Vec<usize>,
    /// Acceptance rate per adjacent pair, indexed by lower rung.
    pub exchange_acceptance: Vec<f64>,
    /// Energy-histogram overlap per adjacent pair, indexed by lower rung.
    pub neighbor_overlap: Vec<f64>,
    /// Replicas degraded during the run, with the round of degradation.
    pub degraded: Vec<DegradedReplica>,
    /// SHA-256 hash over the terminal assignment and energies.
    pub state_hash: String,
    /// Full exchange log (useful for tests and diagnostics).
    pub exchange_log: Vec<ExchangeAttempt>,
    /// Metrics rows collected during the run.
    pub samples: Vec<MetricSample>,
    /// Metrics CSV written during the run.
    pub metrics_path: Option<PathBuf>,
    /// Manifest path, if emitted.
    pub manifest_path: Option<PathBuf>,
    /// Checkpoint files produced during the run.
    pub checkpoints: Vec<PathBuf>,
    /// Snapshot files produced during the run.
    pub snapshots: Vec<PathBuf>,
}
