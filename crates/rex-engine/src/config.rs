use std::path::PathBuf;

use rex_core::errors::ErrorInfo;
use rex_core::{ControlParameter, RexError};
use serde::{Deserialize, Serialize};

/// YAML-configurable parameters governing a replica-exchange run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of rounds to execute. Each round is one parallel sampling
    /// epoch for every replica followed by a serialized exchange phase.
    pub rounds: usize,
    /// Integration steps per sampling epoch.
    #[serde(default = "default_epoch_length")]
    pub epoch_length: u64,
    /// Ladder specification.
    #[serde(default)]
    pub ladder: LadderConfig,
    /// Which adjacent rung pairs attempt an exchange each round.
    #[serde(default)]
    pub pairing: PairingScheme,
    /// Whether accepted temperature swaps rescale momenta by sqrt(T_new/T_old).
    #[serde(default = "default_momentum_rescale")]
    pub momentum_rescale: bool,
    /// Which energy quantity feeds the exchange acceptance test.
    #[serde(default)]
    pub energy_reporting: EnergyReporting,
    /// Wall-clock budget per epoch in seconds; overruns degrade the lane.
    ///
    /// The budget is checked after the integrator call returns. An advance
    /// that never returns is a collaborator defect the coordinator cannot
    /// preempt.
    #[serde(default)]
    pub epoch_timeout_secs: Option<f64>,
    /// Number of worker threads for the parallel advance phase (0 = one).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Master seed and substream policy.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Diagnostics collection behaviour.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    /// Checkpointing behaviour.
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
    /// Output directory configuration.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_epoch_length() -> u64 {
    100
}

fn default_momentum_rescale() -> bool {
    true
}

fn default_concurrency() -> usize {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            rounds: 16,
            epoch_length: default_epoch_length(),
            ladder: LadderConfig::default(),
            pairing: PairingScheme::default(),
            momentum_rescale: default_momentum_rescale(),
            energy_reporting: EnergyReporting::default(),
            epoch_timeout_secs: None,
            concurrency: default_concurrency(),
            seed_policy: SeedPolicy::default(),
            diagnostics: DiagnosticsConfig::default(),
            checkpoint: CheckpointConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl RunConfig {
    /// Validates the static configuration surface before any run work.
    pub fn validate(&self) -> Result<(), RexError> {
        if self.epoch_length == 0 {
            return Err(RexError::Config(
                ErrorInfo::new("epoch-length-zero", "epoch_length must be at least 1")
                    .with_hint("configure a positive number of steps per epoch"),
            ));
        }
        if self.diagnostics.bin_width <= 0.0 || !self.diagnostics.bin_width.is_finite() {
            return Err(RexError::Config(
                ErrorInfo::new("bin-width-invalid", "diagnostics.bin_width must be positive")
                    .with_context("bin_width", self.diagnostics.bin_width.to_string()),
            ));
        }
        if let Some(timeout) = self.epoch_timeout_secs {
            if timeout <= 0.0 || !timeout.is_finite() {
                return Err(RexError::Config(
                    ErrorInfo::new("timeout-invalid", "epoch_timeout_secs must be positive")
                        .with_context("timeout", timeout.to_string()),
                ));
            }
        }
        Ok(())
    }
}

/// Ladder construction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LadderConfig {
    /// Policy used to generate the rung parameters.
    #[serde(default)]
    pub policy: LadderPolicy,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            policy: LadderPolicy::default(),
        }
    }
}

/// Supported ladder construction strategies.
///
/// Ladder spacing is an open tuning problem; both policies are provided so
/// operators can iterate between runs using the overlap diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LadderPolicy {
    /// Geometric temperature progression with a fixed ratio between rungs.
    Geometric {
        /// Temperature of the coldest rung.
        #[serde(default = "default_base_temperature")]
        base_temperature: f64,
        /// Multiplicative spacing ratio between adjacent rungs.
        #[serde(default = "default_ratio")]
        ratio: f64,
        /// Number of rungs (and therefore replicas).
        #[serde(default = "default_rungs")]
        rungs: usize,
    },
    /// Explicit ordered list of control parameters supplied by the user.
    Manual {
        /// Ordered rung parameters, strictly monotonic in the tempered value.
        parameters: Vec<ControlParameter>,
    },
}

fn default_base_temperature() -> f64 {
    1.0
}

fn default_ratio() -> f64 {
    1.2
}

fn default_rungs() -> usize {
    4
}

impl Default for LadderPolicy {
    fn default() -> Self {
        LadderPolicy::Geometric {
            base_temperature: default_base_temperature(),
            ratio: default_ratio(),
            rungs: default_rungs(),
        }
    }
}

/// Which adjacent rung pairs attempt an exchange within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PairingScheme {
    /// Every adjacent pair, in ascending rung order.
    AllPairs,
    /// Even pairs (0-1, 2-3, ...) on even rounds, odd pairs on odd rounds.
    Alternating,
}

impl Default for PairingScheme {
    fn default() -> Self {
        PairingScheme::Alternating
    }
}

impl PairingScheme {
    /// Returns the lower rung index of every pair attempted in `round`.
    pub fn pairs(&self, rungs: usize, round: usize) -> Vec<usize> {
        if rungs < 2 {
            return Vec::new();
        }
        match self {
            PairingScheme::AllPairs => (0..rungs - 1).collect(),
            PairingScheme::Alternating => {
                let start = round % 2;
                (start..rungs - 1).step_by(2).collect()
            }
        }
    }
}

/// Energy quantity fed to the exchange acceptance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnergyReporting {
    /// Instantaneous potential energy at the epoch boundary.
    InstantaneousPotential,
    /// Potential energy averaged over the epoch.
    EpochMeanPotential,
    /// Instantaneous total (potential + kinetic) energy.
    Total,
}

impl Default for EnergyReporting {
    fn default() -> Self {
        EnergyReporting::InstantaneousPotential
    }
}

impl EnergyReporting {
    /// Selects the configured scalar from an energy sample.
    pub fn select(&self, sample: &rex_core::EnergySample) -> f64 {
        match self {
            EnergyReporting::InstantaneousPotential => sample.potential,
            EnergyReporting::EpochMeanPotential => sample.epoch_mean_potential,
            EnergyReporting::Total => sample.total(),
        }
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed used for the run.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label used when deriving substream seeds (documented in manifests).
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x05EE_D5EE_DD15_5EED_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

/// Diagnostics collection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Energy histogram bin width.
    #[serde(default = "default_bin_width")]
    pub bin_width: f64,
    /// Per-replica energy ring buffer capacity.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Interval in rounds between snapshot writes (0 disables snapshots).
    #[serde(default)]
    pub snapshot_interval: usize,
    /// Number of trailing exchange attempts included in each snapshot.
    #[serde(default = "default_log_tail")]
    pub log_tail: usize,
}

fn default_bin_width() -> f64 {
    0.5
}

fn default_history_capacity() -> usize {
    256
}

fn default_log_tail() -> usize {
    64
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            bin_width: default_bin_width(),
            history_capacity: default_history_capacity(),
            snapshot_interval: 0,
            log_tail: default_log_tail(),
        }
    }
}

/// Checkpointing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Interval in rounds between checkpoint writes (0 disables checkpoints).
    #[serde(default)]
    pub interval: usize,
    /// Maximum number of checkpoints to retain.
    #[serde(default = "default_checkpoint_retention")]
    pub max_to_keep: usize,
}

fn default_checkpoint_retention() -> usize {
    4
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            interval: 0,
            max_to_keep: default_checkpoint_retention(),
        }
    }
}

/// Output directory layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for run artefacts. Created if it does not exist.
    #[serde(default)]
    pub run_directory: Option<PathBuf>,
    /// Metrics filename relative to `run_directory`.
    #[serde(default = "default_metrics_filename")]
    pub metrics_file: PathBuf,
    /// Manifest filename relative to `run_directory`.
    #[serde(default = "default_manifest_filename")]
    pub manifest_file: PathBuf,
    /// Subdirectory used for checkpoint files.
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: PathBuf,
    /// Subdirectory used for snapshot files.
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
}

fn default_metrics_filename() -> PathBuf {
    PathBuf::from("metrics.csv")
}

fn default_manifest_filename() -> PathBuf {
    PathBuf::from("manifest.json")
}

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from("checkpoints")
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("snapshots")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            run_directory: None,
            metrics_file: default_metrics_filename(),
            manifest_file: default_manifest_filename(),
            checkpoint_dir: default_checkpoint_dir(),
            snapshot_dir: default_snapshot_dir(),
        }
    }
}
