//! Replica-exchange run engine.
//!
//! The engine coordinates a fixed population of replicas across a ladder of
//! control parameters. Each round every replica advances one sampling epoch
//! in parallel, then adjacent rungs attempt Metropolis swaps in a serialized
//! exchange phase. Runs are bit-reproducible for a fixed master seed and
//! configuration, independent of thread scheduling.

#![deny(missing_docs)]

/// Checkpoint serialization helpers and payload structures.
pub mod checkpoint;
/// YAML configuration schema and defaults.
pub mod config;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Energy histograms, overlap estimates, and metrics export.
pub mod diagnostics;
/// Metropolis exchange engine and attempt log.
pub mod exchange;
/// Reference integrator implementations.
pub mod integrators;
/// Validated ladder construction.
pub mod ladder;
/// Run manifest serialization helpers.
pub mod manifest;
/// Replica state and its sampling epoch wrapper.
pub mod replica;
/// Round loop and public `run`/`resume` entry points.
pub mod scheduler;
/// Periodic reporting snapshots.
pub mod snapshot;
/// Run summaries and terminal run states.
pub mod summary;

pub use checkpoint::{CheckpointPayload, ReplicaCheckpoint};
pub use config::{
    CheckpointConfig, DiagnosticsConfig, EnergyReporting, LadderConfig, LadderPolicy,
    OutputConfig, PairingScheme, RunConfig, SeedPolicy,
};
pub use diagnostics::{DiagnosticsCollector, Histogram, HistogramSummary, MetricSample};
pub use exchange::{exchange_acceptance, ExchangeAttempt, ExchangeEngine};
pub use integrators::{HarmonicIntegrator, HarmonicParams};
pub use ladder::Ladder;
pub use manifest::RunManifest;
pub use replica::Replica;
pub use scheduler::{resume, run, run_with_cancel};
pub use snapshot::RunSnapshot;
pub use summary::{DegradedReplica, RunState, RunSummary};
