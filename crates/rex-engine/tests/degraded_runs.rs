use rex_core::errors::ErrorInfo;
use rex_core::{ControlParameter, EnergySample, Integrator, Microstate, RexError};
use rex_engine::config::{LadderConfig, LadderPolicy, PairingScheme, RunConfig};
use rex_engine::{determinism, scheduler, RunState};

/// Integrator that diverges for one stream at a scripted epoch and otherwise
/// reports a fixed energy derived from the stream seed.
struct ScriptedIntegrator {
    divergent_seed: u64,
    divergent_epoch: u64,
}

impl Integrator for ScriptedIntegrator {
    fn advance(
        &self,
        state: &mut Microstate,
        _parameter: &ControlParameter,
        _epoch_length: u64,
    ) -> Result<EnergySample, RexError> {
        if state.stream_seed == self.divergent_seed && state.stream_epoch == self.divergent_epoch {
            return Err(RexError::IntegratorDivergence(ErrorInfo::new(
                "scripted-blowup",
                "scripted divergence for lane-exclusion testing",
            )));
        }
        state.stream_epoch += 1;
        let energy = 1.0 + (state.stream_seed % 7) as f64;
        Ok(EnergySample {
            potential: energy,
            kinetic: 0.5,
            epoch_mean_potential: energy,
        })
    }

    fn reduced_potential(
        &self,
        _state: &Microstate,
        parameter: &ControlParameter,
    ) -> Result<f64, RexError> {
        Ok(parameter.tempered_value())
    }
}

fn config(rounds: usize) -> RunConfig {
    RunConfig {
        rounds,
        epoch_length: 10,
        ladder: LadderConfig {
            policy: LadderPolicy::Manual {
                parameters: vec![
                    ControlParameter::Temperature { value: 1.0 },
                    ControlParameter::Temperature { value: 1.2 },
                    ControlParameter::Temperature { value: 1.5 },
                ],
            },
        },
        pairing: PairingScheme::AllPairs,
        ..RunConfig::default()
    }
}

fn initial_states(config: &RunConfig, count: usize) -> Vec<Microstate> {
    (0..count)
        .map(|index| {
            Microstate::at_rest(
                4,
                determinism::replica_seed(config.seed_policy.master_seed, index),
            )
        })
        .collect()
}

#[test]
fn divergence_degrades_one_lane_and_the_run_continues() {
    let config = config(10);
    let divergent_replica = 1usize;
    let divergent_seed =
        determinism::replica_seed(config.seed_policy.master_seed, divergent_replica);
    // stream_epoch counts completed advances, so epoch 4 fails in the fifth
    // round (round index 4) and the lane sits out rounds 5 through 9.
    let integrator = ScriptedIntegrator {
        divergent_seed,
        divergent_epoch: 4,
    };

    let summary = scheduler::run(&config, &integrator, initial_states(&config, 3)).unwrap();

    assert_eq!(summary.state, RunState::Degraded);
    assert_eq!(summary.rounds_completed, 10);
    assert_eq!(summary.degraded.len(), 1);
    let lane = &summary.degraded[0];
    assert_eq!(lane.replica, divergent_replica);
    assert_eq!(lane.round, 4);
    assert_eq!(lane.reason, "scripted divergence for lane-exclusion testing");

    // No sample and no exchange involve the lane after it degraded.
    let last_sample_round = summary
        .samples
        .iter()
        .filter(|sample| sample.replica == divergent_replica)
        .map(|sample| sample.round)
        .max()
        .unwrap();
    assert_eq!(last_sample_round, 3);
    for attempt in &summary.exchange_log {
        if attempt.round >= 4 {
            assert_ne!(attempt.replica_low, divergent_replica);
            assert_ne!(attempt.replica_high, divergent_replica);
        }
    }

    // Healthy lanes keep sampling through the final round.
    for replica in [0usize, 2] {
        let rounds = summary
            .samples
            .iter()
            .filter(|sample| sample.replica == replica)
            .count();
        assert_eq!(rounds, 10);
    }
}

#[test]
fn degraded_lane_keeps_its_rung() {
    let config = config(6);
    let divergent_seed = determinism::replica_seed(config.seed_policy.master_seed, 0);
    let integrator = ScriptedIntegrator {
        divergent_seed,
        divergent_epoch: 0,
    };

    let summary = scheduler::run(&config, &integrator, initial_states(&config, 3)).unwrap();

    assert_eq!(summary.degraded.len(), 1);
    assert_eq!(summary.degraded[0].round, 0);
    // Replica 0 diverged before any exchange, so it stays parked at rung 0
    // and every surviving attempt is restricted to the 1-2 pair.
    assert_eq!(summary.assignment[0], 0);
    for attempt in &summary.exchange_log {
        assert_eq!((attempt.rung_low, attempt.rung_high), (1, 2));
    }
}

#[test]
fn all_lanes_degrading_still_returns_a_summary() {
    let config = config(4);
    // Every stream diverges on its first advance.
    struct AlwaysDiverges;
    impl Integrator for AlwaysDiverges {
        fn advance(
            &self,
            _state: &mut Microstate,
            _parameter: &ControlParameter,
            _epoch_length: u64,
        ) -> Result<EnergySample, RexError> {
            Err(RexError::IntegratorDivergence(ErrorInfo::new(
                "scripted-blowup",
                "every lane diverges",
            )))
        }

        fn reduced_potential(
            &self,
            _state: &Microstate,
            _parameter: &ControlParameter,
        ) -> Result<f64, RexError> {
            Ok(0.0)
        }
    }

    let summary = scheduler::run(&config, &AlwaysDiverges, initial_states(&config, 3)).unwrap();
    assert_eq!(summary.state, RunState::Degraded);
    assert_eq!(summary.degraded.len(), 3);
    assert!(summary.exchange_log.is_empty());
    assert!(summary.samples.is_empty());
}
