use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rayon::prelude::*;
use rex_core::errors::ErrorInfo;
use rex_core::{EnergySample, Integrator, Microstate, RexError, RunProvenance};
use sha2::{Digest, Sha256};

use crate::checkpoint::{self, CheckpointPayload};
use crate::config::RunConfig;
use crate::diagnostics::{DiagnosticsCollector, MetricSample};
use crate::exchange::ExchangeEngine;
use crate::ladder::Ladder;
use crate::manifest::RunManifest;
use crate::replica::Replica;
use crate::snapshot::{self, RunSnapshot};
use crate::summary::{DegradedReplica, RunState, RunSummary};

/// Runs the coordinator from scratch with the provided configuration.
///
/// `initial_states` supplies one microstate per ladder rung; replica `i`
/// starts at rung `i`. Configuration and ladder errors abort before any
/// simulation work begins; per-replica divergence degrades the lane and the
/// run continues.
pub fn run(
    config: &RunConfig,
    integrator: &dyn Integrator,
    initial_states: Vec<Microstate>,
) -> Result<RunSummary, RexError> {
    let cancel = AtomicBool::new(false);
    run_with_cancel(config, integrator, initial_states, &cancel)
}

/// Same as [`run`], with a cooperative cancellation flag checked at round
/// boundaries. Mid-epoch cancellation is not supported because partial
/// integrator state is not guaranteed consistent.
pub fn run_with_cancel(
    config: &RunConfig,
    integrator: &dyn Integrator,
    initial_states: Vec<Microstate>,
    cancel: &AtomicBool,
) -> Result<RunSummary, RexError> {
    config.validate()?;
    let ladder = Ladder::from_config(&config.ladder)?;
    if initial_states.len() != ladder.len() {
        return Err(RexError::Config(
            ErrorInfo::new("replica-ladder-mismatch", "one initial state per rung is required")
                .with_context("rungs", ladder.len().to_string())
                .with_context("states", initial_states.len().to_string()),
        ));
    }
    let replicas: Vec<Replica> = initial_states
        .into_iter()
        .enumerate()
        .map(|(index, state)| {
            Replica::new(index, index, state, config.diagnostics.history_capacity)
        })
        .collect();
    let engine = ExchangeEngine::new(config.seed_policy.master_seed, replicas.len());
    run_rounds(config, integrator, ladder, replicas, engine, 0, Vec::new(), cancel)
}

/// Resumes a run from a checkpoint file.
pub fn resume(path: &Path, integrator: &dyn Integrator) -> Result<RunSummary, RexError> {
    let payload = CheckpointPayload::load(path)?;
    payload.config.validate()?;
    let ladder = Ladder::from_config(&payload.config.ladder)?;
    if payload.replicas.len() != ladder.len() {
        return Err(RexError::Config(
            ErrorInfo::new("checkpoint-ladder-mismatch", "checkpoint replica count does not match ladder")
                .with_context("rungs", ladder.len().to_string())
                .with_context("replicas", payload.replicas.len().to_string())
                .with_context("path", path.display().to_string()),
        ));
    }
    let mut assignment = vec![0usize; payload.replicas.len()];
    let mut replicas = Vec::with_capacity(payload.replicas.len());
    for stored in &payload.replicas {
        if stored.index >= payload.replicas.len() {
            return Err(RexError::Serde(
                ErrorInfo::new("checkpoint-replica-index", "replica index out of range")
                    .with_context("index", stored.index.to_string())
                    .with_context("path", path.display().to_string()),
            ));
        }
        assignment[stored.index] = stored.rung;
        let mut replica = Replica::restore(
            stored.index,
            stored.rung,
            stored.epochs,
            stored.microstate.clone(),
            payload.config.diagnostics.history_capacity,
        );
        for &energy in &stored.recent_energies {
            replica.record_energy(energy);
        }
        replicas.push(replica);
    }
    replicas.sort_by_key(Replica::index);
    let engine = ExchangeEngine::from_assignment(
        payload.config.seed_policy.master_seed,
        assignment,
        payload.exchange_log.clone(),
    )?;
    let cancel = AtomicBool::new(false);
    run_rounds(
        &payload.config,
        integrator,
        ladder,
        replicas,
        engine,
        payload.round,
        payload.degraded.clone(),
        &cancel,
    )
}

#[allow(clippy::too_many_arguments)]
fn run_rounds(
    config: &RunConfig,
    integrator: &dyn Integrator,
    ladder: Ladder,
    mut replicas: Vec<Replica>,
    mut engine: ExchangeEngine,
    start_round: usize,
    mut degraded: Vec<DegradedReplica>,
    cancel: &AtomicBool,
) -> Result<RunSummary, RexError> {
    let seed = config.seed_policy.master_seed;
    let timeout = config.epoch_timeout_secs.map(Duration::from_secs_f64);
    let mut collector = DiagnosticsCollector::new(ladder.len(), config.diagnostics.bin_width);
    // A resumed engine already carries the checkpointed exchange log; replay
    // it so acceptance counters cover the whole run, not just the tail after
    // the checkpoint. On a fresh run the log is empty and this is a no-op.
    for attempt in engine.log() {
        collector.record_attempt(attempt);
    }
    let mut healthy = vec![true; replicas.len()];
    for lane in &degraded {
        healthy[lane.replica] = false;
    }
    let mut energies = vec![0.0f64; replicas.len()];
    let mut checkpoints: Vec<PathBuf> = Vec::new();
    let mut snapshots: Vec<PathBuf> = Vec::new();
    let mut rounds_completed = start_round;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.concurrency.max(1))
        .build()
        .map_err(|err| RexError::Config(ErrorInfo::new("thread-pool", err.to_string())))?;

    if let Some(run_dir) = &config.output.run_directory {
        fs::create_dir_all(run_dir).map_err(|err| {
            RexError::Serde(
                ErrorInfo::new("run-dir-create", err.to_string())
                    .with_context("path", run_dir.display().to_string()),
            )
        })?;
    }

    for round in start_round..config.rounds {
        if cancel.load(Ordering::Relaxed) {
            break;
        }

        // Parallel sampling phase. The collect is the synchronization
        // barrier: no exchange may look at energies measured at different
        // epoch boundaries.
        let epoch_results: Vec<Option<Result<EnergySample, RexError>>> = pool.install(|| {
            replicas
                .par_iter_mut()
                .enumerate()
                .map(|(index, replica)| {
                    if !healthy[index] {
                        return None;
                    }
                    let parameter = ladder.value_at(replica.rung());
                    Some(replica.advance(integrator, parameter, config.epoch_length, timeout))
                })
                .collect()
        });

        for (index, outcome) in epoch_results.into_iter().enumerate() {
            let Some(result) = outcome else { continue };
            match result {
                Ok(sample) => {
                    let energy = config.energy_reporting.select(&sample);
                    energies[index] = energy;
                    let rung = replicas[index].rung();
                    replicas[index].record_energy(energy);
                    collector.record_energy(rung, energy);
                    collector.push_sample(MetricSample {
                        round,
                        replica: index,
                        rung,
                        parameter: ladder.value_at(rung).tempered_value(),
                        energy,
                        epoch_mean: sample.epoch_mean_potential,
                    });
                }
                Err(err) if err.is_divergence() => {
                    healthy[index] = false;
                    degraded.push(DegradedReplica {
                        replica: index,
                        round,
                        reason: err.info().message.clone(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        // Serialized exchange phase, ascending rung order. Pairs touching a
        // degraded lane are skipped; their replicas keep their rungs so the
        // bijection holds for the survivors.
        for pair in config.pairing.pairs(ladder.len(), round) {
            let replica_low = engine.replica_at(pair);
            let replica_high = engine.replica_at(pair + 1);
            if !healthy[replica_low] || !healthy[replica_high] {
                continue;
            }
            let attempt = engine.attempt(
                round,
                pair,
                pair + 1,
                &ladder,
                &mut replicas,
                &energies,
                integrator,
                config.momentum_rescale,
            )?;
            collector.record_attempt(&attempt);
        }

        rounds_completed = round + 1;

        if let Some(run_dir) = &config.output.run_directory {
            if config.checkpoint.interval > 0 && rounds_completed % config.checkpoint.interval == 0
            {
                let dir = run_dir.join(&config.output.checkpoint_dir);
                let path = checkpoint::checkpoint_path(&dir, rounds_completed);
                checkpoint::build_payload(
                    rounds_completed,
                    config,
                    seed,
                    &replicas,
                    engine.log(),
                    &degraded,
                )
                .store(&path)?;
                checkpoints.push(path);
                checkpoint::enforce_retention(&mut checkpoints, config.checkpoint.max_to_keep)?;
            }
            if config.diagnostics.snapshot_interval > 0
                && rounds_completed % config.diagnostics.snapshot_interval == 0
            {
                let dir = run_dir.join(&config.output.snapshot_dir);
                let path = snapshot::snapshot_path(&dir, rounds_completed);
                RunSnapshot {
                    round: rounds_completed,
                    ladder: ladder.rungs().to_vec(),
                    assignment: engine.assignment().to_vec(),
                    histograms: collector.histogram_summaries(),
                    exchange_tail: engine.log_tail(config.diagnostics.log_tail).to_vec(),
                }
                .write(&path)?;
                snapshots.push(path);
            }
        }
    }

    let state = if degraded.is_empty() {
        RunState::Completed
    } else {
        RunState::Degraded
    };
    let state_hash = terminal_state_hash(engine.assignment(), &energies);

    let metrics_path = if let Some(run_dir) = &config.output.run_directory {
        let path = run_dir.join(&config.output.metrics_file);
        collector.write_csv(&path).map_err(|err| {
            RexError::Serde(
                ErrorInfo::new("metrics-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Some(path)
    } else {
        None
    };

    let manifest_path = if let Some(run_dir) = &config.output.run_directory {
        let path = run_dir.join(&config.output.manifest_file);
        let manifest = RunManifest {
            schema: rex_core::SchemaVersion::default(),
            config: config.clone(),
            master_seed: seed,
            seed_label: config.seed_policy.label.clone(),
            state,
            rounds_completed,
            assignment: engine.assignment().to_vec(),
            degraded: degraded.clone(),
            state_hash: state_hash.clone(),
            provenance: build_provenance(config, &ladder)?,
            metrics_file: metrics_path
                .as_ref()
                .and_then(|path| path.strip_prefix(run_dir).ok())
                .map(Path::to_path_buf),
            checkpoints: relative_paths(&checkpoints, run_dir),
            snapshots: relative_paths(&snapshots, run_dir),
        };
        manifest.write(&path)?;
        Some(path)
    } else {
        None
    };

    Ok(RunSummary {
        state,
        rounds_completed,
        assignment: engine.assignment().to_vec(),
        exchange_acceptance: collector.acceptance_rates(),
        neighbor_overlap: collector.neighbor_overlaps(),
        degraded,
        state_hash,
        exchange_log: engine.log().to_vec(),
        samples: collector.samples().to_vec(),
        metrics_path,
        manifest_path,
        checkpoints,
        snapshots,
    })
}

fn relative_paths(paths: &[PathBuf], run_dir: &Path) -> Vec<PathBuf> {
    paths
        .iter()
        .filter_map(|path| path.strip_prefix(run_dir).ok().map(Path::to_path_buf))
        .collect()
}

fn terminal_state_hash(assignment: &[usize], energies: &[f64]) -> String {
    let mut hasher = Sha256::new();
    for &rung in assignment {
        hasher.update((rung as u64).to_le_bytes());
    }
    for &energy in energies {
        hasher.update(energy.to_le_bytes());
    }
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

fn build_provenance(config: &RunConfig, ladder: &Ladder) -> Result<RunProvenance, RexError> {
    let config_json = serde_json::to_vec(config)
        .map_err(|err| RexError::Serde(ErrorInfo::new("config-hash", err.to_string())))?;
    let ladder_json = serde_json::to_vec(ladder.rungs())
        .map_err(|err| RexError::Serde(ErrorInfo::new("ladder-hash", err.to_string())))?;
    let mut tool_versions = BTreeMap::new();
    tool_versions.insert(
        "rex-engine".to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    Ok(RunProvenance {
        config_hash: hex_digest(&config_json),
        ladder_hash: hex_digest(&ladder_json),
        seed: config.seed_policy.master_seed,
        created_at: chrono::Utc::now().to_rfc3339(),
        tool_versions,
    })
}

fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
