use rex_core::{ControlParameter, RexError};
use rex_engine::config::{LadderConfig, LadderPolicy};
use rex_engine::Ladder;

fn temp(value: f64) -> ControlParameter {
    ControlParameter::Temperature { value }
}

fn epsilon(value: f64) -> ControlParameter {
    ControlParameter::PotentialParameter {
        name: "epsilon".into(),
        value,
    }
}

#[test]
fn rejects_single_rung() {
    let err = Ladder::new(vec![temp(1.0)]).unwrap_err();
    match err {
        RexError::InvalidLadder(info) => assert_eq!(info.code, "ladder-too-short"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_mixed_variants() {
    let err = Ladder::new(vec![
        temp(1.0),
        ControlParameter::PotentialParameter {
            name: "epsilon".into(),
            value: 1.2,
        },
    ])
    .unwrap_err();
    match err {
        RexError::InvalidLadder(info) => assert_eq!(info.code, "ladder-mixed-variants"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_non_monotonic_values() {
    let err = Ladder::new(vec![temp(1.0), temp(1.5), temp(1.2)]).unwrap_err();
    match err {
        RexError::InvalidLadder(info) => assert_eq!(info.code, "ladder-not-monotonic"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_repeated_values() {
    assert!(Ladder::new(vec![temp(1.0), temp(1.0)]).is_err());
}

#[test]
fn rejects_non_positive_values() {
    let err = Ladder::new(vec![temp(-1.0), temp(1.0)]).unwrap_err();
    match err {
        RexError::InvalidLadder(info) => assert_eq!(info.code, "ladder-value-invalid"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_non_finite_values() {
    let err = Ladder::new(vec![temp(1.0), temp(f64::INFINITY)]).unwrap_err();
    match err {
        RexError::InvalidLadder(info) => assert_eq!(info.code, "ladder-value-invalid"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn accepts_negative_potential_parameter_ladders() {
    // A deepening well: strictly monotonic, all values negative.
    let ladder = Ladder::new(vec![epsilon(-0.5), epsilon(-1.0), epsilon(-2.0)]).unwrap();
    assert_eq!(ladder.len(), 3);
    assert!(!ladder.is_temperature());
    assert_eq!(ladder.beta_at(0), None);
}

#[test]
fn rejects_non_finite_potential_parameters() {
    assert!(Ladder::new(vec![epsilon(-1.0), epsilon(f64::NEG_INFINITY)]).is_err());
}

#[test]
fn accepts_decreasing_ladders() {
    let ladder = Ladder::new(vec![temp(1.5), temp(1.2), temp(1.0)]).unwrap();
    assert_eq!(ladder.len(), 3);
    assert!(ladder.is_temperature());
}

#[test]
fn geometric_policy_generates_expected_rungs() {
    let config = LadderConfig {
        policy: LadderPolicy::Geometric {
            base_temperature: 1.0,
            ratio: 1.2,
            rungs: 4,
        },
    };
    let ladder = Ladder::from_config(&config).unwrap();
    assert_eq!(ladder.len(), 4);
    let values: Vec<f64> = ladder.rungs().iter().map(|r| r.tempered_value()).collect();
    assert!((values[0] - 1.0).abs() < 1e-12);
    assert!((values[1] - 1.2).abs() < 1e-12);
    assert!((values[2] - 1.44).abs() < 1e-12);
    assert!((values[3] - 1.728).abs() < 1e-12);
}

#[test]
fn geometric_policy_rejects_ratio_at_or_below_one() {
    let config = LadderConfig {
        policy: LadderPolicy::Geometric {
            base_temperature: 1.0,
            ratio: 1.0,
            rungs: 4,
        },
    };
    let err = Ladder::from_config(&config).unwrap_err();
    match err {
        RexError::InvalidLadder(info) => assert_eq!(info.code, "ladder-ratio-invalid"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn neighbors_are_clamped_at_the_boundaries() {
    let ladder = Ladder::new(vec![temp(1.0), temp(1.2), temp(1.5)]).unwrap();
    assert_eq!(ladder.neighbors(0), (None, Some(1)));
    assert_eq!(ladder.neighbors(1), (Some(0), Some(2)));
    assert_eq!(ladder.neighbors(2), (Some(1), None));
}
