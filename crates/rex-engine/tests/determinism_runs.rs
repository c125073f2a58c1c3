use rex_core::ControlParameter;
use rex_engine::config::{LadderConfig, LadderPolicy, RunConfig};
use rex_engine::{determinism, scheduler, HarmonicIntegrator, HarmonicParams, Ladder, RunState};

fn small_config(rounds: usize, concurrency: usize) -> RunConfig {
    RunConfig {
        rounds,
        epoch_length: 20,
        ladder: LadderConfig {
            policy: LadderPolicy::Manual {
                parameters: vec![
                    ControlParameter::Temperature { value: 1.0 },
                    ControlParameter::Temperature { value: 1.2 },
                    ControlParameter::Temperature { value: 1.5 },
                ],
            },
        },
        concurrency,
        ..RunConfig::default()
    }
}

fn small_integrator() -> HarmonicIntegrator {
    HarmonicIntegrator::new(HarmonicParams {
        particles: 8,
        ..HarmonicParams::default()
    })
}

fn execute(config: &RunConfig) -> rex_engine::RunSummary {
    let integrator = small_integrator();
    let ladder = Ladder::from_config(&config.ladder).unwrap();
    let states = (0..ladder.len())
        .map(|index| {
            integrator.initial_microstate(
                determinism::replica_seed(config.seed_policy.master_seed, index),
                ladder.value_at(index),
            )
        })
        .collect();
    scheduler::run(config, &integrator, states).unwrap()
}

#[test]
fn identical_seeds_produce_identical_summaries() {
    let config = small_config(8, 1);
    let first = execute(&config);
    let second = execute(&config);
    assert_eq!(first, second);
    assert_eq!(first.state, RunState::Completed);
    assert_eq!(first.rounds_completed, 8);
}

#[test]
fn reproducibility_is_independent_of_thread_count() {
    let serial = execute(&small_config(8, 1));
    let parallel = execute(&small_config(8, 4));
    assert_eq!(serial.state_hash, parallel.state_hash);
    assert_eq!(serial.assignment, parallel.assignment);
    assert_eq!(serial.exchange_log, parallel.exchange_log);
    assert_eq!(serial.samples, parallel.samples);
}

#[test]
fn different_seeds_diverge() {
    let base = small_config(8, 1);
    let mut reseeded = small_config(8, 1);
    reseeded.seed_policy.master_seed = base.seed_policy.master_seed.wrapping_add(1);
    let first = execute(&base);
    let second = execute(&reseeded);
    assert_ne!(first.state_hash, second.state_hash);
}

#[test]
fn every_round_records_one_sample_per_replica() {
    let summary = execute(&small_config(5, 2));
    assert_eq!(summary.samples.len(), 5 * 3);
    for round in 0..5 {
        let replicas: Vec<usize> = summary
            .samples
            .iter()
            .filter(|sample| sample.round == round)
            .map(|sample| sample.replica)
            .collect();
        assert_eq!(replicas, vec![0, 1, 2]);
    }
}

#[test]
fn cancellation_stops_at_a_round_boundary() {
    use std::sync::atomic::AtomicBool;

    let config = small_config(8, 1);
    let integrator = small_integrator();
    let ladder = Ladder::from_config(&config.ladder).unwrap();
    let states: Vec<_> = (0..ladder.len())
        .map(|index| {
            integrator.initial_microstate(
                determinism::replica_seed(config.seed_policy.master_seed, index),
                ladder.value_at(index),
            )
        })
        .collect();

    let cancel = AtomicBool::new(true);
    let summary = scheduler::run_with_cancel(&config, &integrator, states, &cancel).unwrap();
    assert_eq!(summary.rounds_completed, 0);
    assert_eq!(summary.state, RunState::Completed);
    assert!(summary.exchange_log.is_empty());
}
