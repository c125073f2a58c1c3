use rex_core::errors::ErrorInfo;
use rex_core::{ControlParameter, RexError};
use serde::{Deserialize, Serialize};

use crate::config::{LadderConfig, LadderPolicy};

/// Validated ordered sequence of control parameters, one per rung.
///
/// The parameter values are fixed for the whole run; only the replica-to-rung
/// assignment changes. Construction enforces at least two rungs, a single
/// tempered variant (and a single parameter name for the potential case), and
/// strict monotonicity of the tempered value in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ladder {
    rungs: Vec<ControlParameter>,
}

impl Ladder {
    /// Validates and builds a ladder from explicit rung parameters.
    pub fn new(rungs: Vec<ControlParameter>) -> Result<Self, RexError> {
        if rungs.len() < 2 {
            return Err(RexError::InvalidLadder(
                ErrorInfo::new("ladder-too-short", "a ladder needs at least two rungs")
                    .with_context("rungs", rungs.len().to_string())
                    .with_hint("exchange is only defined between distinct rungs"),
            ));
        }
        let first = &rungs[0];
        for (index, rung) in rungs.iter().enumerate().skip(1) {
            if rung.is_temperature() != first.is_temperature() {
                return Err(RexError::InvalidLadder(
                    ErrorInfo::new("ladder-mixed-variants", "all rungs must temper the same quantity")
                        .with_context("rung", index.to_string()),
                ));
            }
            if rung.label() != first.label() {
                return Err(RexError::InvalidLadder(
                    ErrorInfo::new("ladder-mixed-names", "all rungs must temper the same parameter")
                        .with_context("expected", first.label())
                        .with_context("found", rung.label()),
                ));
            }
        }
        let increasing = rungs
            .windows(2)
            .all(|pair| pair[1].tempered_value() > pair[0].tempered_value());
        let decreasing = rungs
            .windows(2)
            .all(|pair| pair[1].tempered_value() < pair[0].tempered_value());
        if !(increasing || decreasing) {
            return Err(RexError::InvalidLadder(
                ErrorInfo::new("ladder-not-monotonic", "rung values must be strictly monotonic")
                    .with_context(
                        "values",
                        rungs
                            .iter()
                            .map(|rung| rung.tempered_value().to_string())
                            .collect::<Vec<_>>()
                            .join(","),
                    ),
            ));
        }
        if rungs.iter().any(|rung| !rung.tempered_value().is_finite()) {
            return Err(RexError::InvalidLadder(ErrorInfo::new(
                "ladder-value-invalid",
                "rung values must be finite",
            )));
        }
        // Positivity is a temperature constraint (beta is its reciprocal).
        // Tempered potential parameters may legitimately be negative, a
        // well-depth epsilon for instance.
        if first.is_temperature() && rungs.iter().any(|rung| rung.tempered_value() <= 0.0) {
            return Err(RexError::InvalidLadder(ErrorInfo::new(
                "ladder-value-invalid",
                "temperatures must be positive",
            )));
        }
        Ok(Self { rungs })
    }

    /// Builds a ladder following the configured policy.
    pub fn from_config(config: &LadderConfig) -> Result<Self, RexError> {
        match &config.policy {
            LadderPolicy::Geometric {
                base_temperature,
                ratio,
                rungs,
            } => {
                if *ratio <= 1.0 {
                    return Err(RexError::InvalidLadder(
                        ErrorInfo::new("ladder-ratio-invalid", "geometric ratio must exceed 1")
                            .with_context("ratio", ratio.to_string()),
                    ));
                }
                let mut parameters = Vec::with_capacity(*rungs);
                let mut temperature = *base_temperature;
                for _ in 0..*rungs {
                    parameters.push(ControlParameter::Temperature { value: temperature });
                    temperature *= ratio;
                }
                Self::new(parameters)
            }
            LadderPolicy::Manual { parameters } => Self::new(parameters.clone()),
        }
    }

    /// Number of rungs (equals the replica count).
    pub fn len(&self) -> usize {
        self.rungs.len()
    }

    /// True when the ladder holds no rungs. Construction forbids this; the
    /// method exists for the conventional `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.rungs.is_empty()
    }

    /// Returns the control parameter assigned to `rung`.
    pub fn value_at(&self, rung: usize) -> &ControlParameter {
        &self.rungs[rung]
    }

    /// Returns the neighbouring rung indices; boundary rungs have one.
    pub fn neighbors(&self, rung: usize) -> (Option<usize>, Option<usize>) {
        let below = rung.checked_sub(1);
        let above = if rung + 1 < self.rungs.len() {
            Some(rung + 1)
        } else {
            None
        };
        (below, above)
    }

    /// Inverse temperature at `rung`; defined only for temperature ladders.
    pub fn beta_at(&self, rung: usize) -> Option<f64> {
        self.rungs[rung].beta()
    }

    /// True when the ladder tempers temperature.
    pub fn is_temperature(&self) -> bool {
        self.rungs[0].is_temperature()
    }

    /// Immutable view over all rung parameters.
    pub fn rungs(&self) -> &[ControlParameter] {
        &self.rungs
    }
}
