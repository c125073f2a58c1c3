use std::fs;
use std::path::{Path, PathBuf};

use rex_core::errors::ErrorInfo;
use rex_core::{ControlParameter, RexError};
use serde::{Deserialize, Serialize};

use crate::diagnostics::HistogramSummary;
use crate::exchange::ExchangeAttempt;

/// Reporting snapshot emitted at configurable intervals.
///
/// The content contract is fixed: the ladder, the per-replica rung
/// assignment, per-rung histogram summaries, and the tail of the exchange
/// log. Consumers (dashboards, ladder-tuning tools) rely on these fields;
/// the JSON carrier format is incidental.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSnapshot {
    /// Round count completed when the snapshot was taken.
    pub round: usize,
    /// Ladder parameters, one per rung.
    pub ladder: Vec<ControlParameter>,
    /// Replica-to-rung assignment, indexed by replica.
    pub assignment: Vec<usize>,
    /// Per-rung energy histogram summaries.
    pub histograms: Vec<HistogramSummary>,
    /// Trailing exchange attempts, oldest first.
    pub exchange_tail: Vec<ExchangeAttempt>,
}

impl RunSnapshot {
    /// Writes the snapshot to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), RexError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                RexError::Serde(
                    ErrorInfo::new("snapshot-mkdir", err.to_string())
                        .with_context("path", parent.display().to_string()),
                )
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            RexError::Serde(ErrorInfo::new("snapshot-serialize", err.to_string()))
        })?;
        fs::write(path, json).map_err(|err| {
            RexError::Serde(
                ErrorInfo::new("snapshot-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Loads a snapshot from disk.
    pub fn load(path: &Path) -> Result<Self, RexError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            RexError::Serde(
                ErrorInfo::new("snapshot-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            RexError::Serde(
                ErrorInfo::new("snapshot-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}

/// Determines the snapshot file path for a given round.
pub fn snapshot_path(root: &Path, round: usize) -> PathBuf {
    root.join(format!("snap_{round:05}.json"))
}
