use rex_engine::config::{EnergyReporting, LadderPolicy, PairingScheme, RunConfig};

#[test]
fn minimal_yaml_fills_every_default() {
    let config: RunConfig = serde_yaml::from_str("rounds: 12\n").unwrap();
    assert_eq!(config.rounds, 12);
    assert_eq!(config.epoch_length, 100);
    assert!(config.momentum_rescale);
    assert_eq!(config.energy_reporting, EnergyReporting::InstantaneousPotential);
    assert_eq!(config.pairing, PairingScheme::Alternating);
    assert_eq!(config.epoch_timeout_secs, None);
    assert_eq!(config.concurrency, 1);
    assert_eq!(config.seed_policy.master_seed, 0x05EE_D5EE_DD15_5EED);
    assert_eq!(config.diagnostics.bin_width, 0.5);
    assert_eq!(config.diagnostics.history_capacity, 256);
    assert_eq!(config.diagnostics.snapshot_interval, 0);
    assert_eq!(config.checkpoint.interval, 0);
    assert_eq!(config.checkpoint.max_to_keep, 4);
    assert!(config.output.run_directory.is_none());
    match config.ladder.policy {
        LadderPolicy::Geometric {
            base_temperature,
            ratio,
            rungs,
        } => {
            assert_eq!(base_temperature, 1.0);
            assert_eq!(ratio, 1.2);
            assert_eq!(rungs, 4);
        }
        other => panic!("unexpected default policy: {other:?}"),
    }
    config.validate().unwrap();
}

#[test]
fn nested_sections_override_selectively() {
    let yaml = r"
rounds: 3
epoch_length: 50
pairing: all-pairs
energy_reporting: epoch-mean-potential
ladder:
  policy:
    type: manual
    parameters:
      - kind: temperature
        value: 1.0
      - kind: temperature
        value: 1.3
checkpoint:
  interval: 2
diagnostics:
  bin_width: 0.25
";
    let config: RunConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.epoch_length, 50);
    assert_eq!(config.pairing, PairingScheme::AllPairs);
    assert_eq!(config.energy_reporting, EnergyReporting::EpochMeanPotential);
    assert_eq!(config.checkpoint.interval, 2);
    assert_eq!(config.checkpoint.max_to_keep, 4);
    assert_eq!(config.diagnostics.bin_width, 0.25);
    match &config.ladder.policy {
        LadderPolicy::Manual { parameters } => assert_eq!(parameters.len(), 2),
        other => panic!("unexpected policy: {other:?}"),
    }
}

#[test]
fn validation_rejects_zero_epoch_length() {
    let config: RunConfig = serde_yaml::from_str("rounds: 1\nepoch_length: 0\n").unwrap();
    let err = config.validate().unwrap_err();
    assert_eq!(err.info().code, "epoch-length-zero");
}

#[test]
fn validation_rejects_non_positive_timeout() {
    let config: RunConfig =
        serde_yaml::from_str("rounds: 1\nepoch_timeout_secs: -2.0\n").unwrap();
    let err = config.validate().unwrap_err();
    assert_eq!(err.info().code, "timeout-invalid");
}

#[test]
fn alternating_pairing_covers_all_pairs_over_two_rounds() {
    let pairing = PairingScheme::Alternating;
    assert_eq!(pairing.pairs(5, 0), vec![0, 2]);
    assert_eq!(pairing.pairs(5, 1), vec![1, 3]);
    assert_eq!(PairingScheme::AllPairs.pairs(4, 7), vec![0, 1, 2]);
    assert!(pairing.pairs(1, 0).is_empty());
}
