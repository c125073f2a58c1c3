use rex_core::errors::ErrorInfo;
use rex_core::{Integrator, RexError, RngHandle};
use serde::{Deserialize, Serialize};

use crate::determinism;
use crate::ladder::Ladder;
use crate::replica::Replica;

/// Immutable record of one exchange trial, appended to the run's exchange log.
///
/// The log is append-only and totally ordered by (round, lower rung); it is
/// the audit trail behind reproducible replay and the acceptance-rate
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeAttempt {
    /// Round in which the attempt was made.
    pub round: usize,
    /// Lower rung of the pair.
    pub rung_low: usize,
    /// Upper rung of the pair.
    pub rung_high: usize,
    /// Replica occupying the lower rung when the attempt was made.
    pub replica_low: usize,
    /// Replica occupying the upper rung when the attempt was made.
    pub replica_high: usize,
    /// Energy of the lower-rung replica under its own parameter.
    pub energy_low: f64,
    /// Energy of the upper-rung replica under its own parameter.
    pub energy_high: f64,
    /// Exponent of the Metropolis criterion.
    pub delta: f64,
    /// Acceptance probability min(1, exp(-delta)).
    pub acceptance: f64,
    /// Uniform draw compared against the acceptance probability.
    pub draw: f64,
    /// Whether the swap was executed.
    pub accepted: bool,
}

/// Decides and executes swaps between replicas at adjacent rungs.
///
/// The engine is the sole owner of the two synchronized assignment maps
/// (rung to replica and replica to rung) and of the exchange log; both are
/// mutated only inside [`ExchangeEngine::attempt`] during the serialized
/// exchange phase.
#[derive(Debug, Clone)]
pub struct ExchangeEngine {
    master_seed: u64,
    rung_to_replica: Vec<usize>,
    replica_to_rung: Vec<usize>,
    log: Vec<ExchangeAttempt>,
}

impl ExchangeEngine {
    /// Creates an engine with the identity assignment (replica i at rung i).
    pub fn new(master_seed: u64, replica_count: usize) -> Self {
        Self {
            master_seed,
            rung_to_replica: (0..replica_count).collect(),
            replica_to_rung: (0..replica_count).collect(),
            log: Vec::new(),
        }
    }

    /// Rebuilds an engine from a checkpointed assignment and log.
    pub fn from_assignment(
        master_seed: u64,
        replica_to_rung: Vec<usize>,
        log: Vec<ExchangeAttempt>,
    ) -> Result<Self, RexError> {
        let count = replica_to_rung.len();
        let mut rung_to_replica = vec![usize::MAX; count];
        for (replica, &rung) in replica_to_rung.iter().enumerate() {
            if rung >= count || rung_to_replica[rung] != usize::MAX {
                return Err(RexError::Config(
                    ErrorInfo::new("assignment-not-bijective", "rung assignment is not a bijection")
                        .with_context("replica", replica.to_string())
                        .with_context("rung", rung.to_string()),
                ));
            }
            rung_to_replica[rung] = replica;
        }
        Ok(Self {
            master_seed,
            rung_to_replica,
            replica_to_rung,
            log,
        })
    }

    /// Replica currently occupying `rung`.
    pub fn replica_at(&self, rung: usize) -> usize {
        self.rung_to_replica[rung]
    }

    /// Rung currently assigned to `replica`.
    pub fn rung_of(&self, replica: usize) -> usize {
        self.replica_to_rung[replica]
    }

    /// Replica-to-rung assignment, indexed by replica.
    pub fn assignment(&self) -> &[usize] {
        &self.replica_to_rung
    }

    /// Full exchange log, ordered by (round, lower rung).
    pub fn log(&self) -> &[ExchangeAttempt] {
        &self.log
    }

    /// Last `n` exchange attempts, oldest first.
    pub fn log_tail(&self, n: usize) -> &[ExchangeAttempt] {
        let start = self.log.len().saturating_sub(n);
        &self.log[start..]
    }

    /// Attempts a swap between the replicas at rungs `rung_a` and `rung_b`.
    ///
    /// `energies` holds the per-replica energy measured at the epoch boundary
    /// immediately preceding this attempt, indexed by replica identity. On
    /// accept the rung assignments are swapped and, when the ladder tempers
    /// temperature and `rescale_momenta` is on, each replica's momenta are
    /// scaled by sqrt(T_new/T_old). Rejections mutate nothing besides the
    /// log. Non-adjacent rungs fail with no state change at all.
    #[allow(clippy::too_many_arguments)]
    pub fn attempt(
        &mut self,
        round: usize,
        rung_a: usize,
        rung_b: usize,
        ladder: &Ladder,
        replicas: &mut [Replica],
        energies: &[f64],
        integrator: &dyn Integrator,
        rescale_momenta: bool,
    ) -> Result<ExchangeAttempt, RexError> {
        if rung_a >= ladder.len() || rung_b >= ladder.len() {
            return Err(RexError::NonAdjacentExchange(
                ErrorInfo::new("rung-out-of-range", "exchange rungs must index into the ladder")
                    .with_context("rung_a", rung_a.to_string())
                    .with_context("rung_b", rung_b.to_string())
                    .with_context("rungs", ladder.len().to_string()),
            ));
        }
        if rung_a.abs_diff(rung_b) != 1 {
            return Err(RexError::NonAdjacentExchange(
                ErrorInfo::new("rungs-not-adjacent", "exchange is defined between nearest neighbours only")
                    .with_context("rung_a", rung_a.to_string())
                    .with_context("rung_b", rung_b.to_string()),
            ));
        }
        let rung_low = rung_a.min(rung_b);
        let rung_high = rung_a.max(rung_b);
        let replica_low = self.rung_to_replica[rung_low];
        let replica_high = self.rung_to_replica[rung_high];
        let energy_low = energies[replica_low];
        let energy_high = energies[replica_high];

        let delta = if ladder.is_temperature() {
            // Generalized Metropolis exponent for a temperature exchange.
            let beta_low = ladder.beta_at(rung_low).unwrap_or(0.0);
            let beta_high = ladder.beta_at(rung_high).unwrap_or(0.0);
            (beta_high - beta_low) * (energy_low - energy_high)
        } else {
            // Cross-wise reduced-potential difference for a tempered
            // potential parameter.
            let param_low = ladder.value_at(rung_low);
            let param_high = ladder.value_at(rung_high);
            let state_low = &replicas[replica_low].microstate;
            let state_high = &replicas[replica_high].microstate;
            let crossed = integrator.reduced_potential(state_high, param_low)?
                + integrator.reduced_potential(state_low, param_high)?;
            let straight = integrator.reduced_potential(state_low, param_low)?
                + integrator.reduced_potential(state_high, param_high)?;
            crossed - straight
        };

        let acceptance = (-delta).exp().min(1.0);
        let mut rng = RngHandle::from_seed(determinism::exchange_seed(
            self.master_seed,
            round,
            rung_low,
        ));
        let draw = rng.uniform();
        let accepted = draw < acceptance;

        if accepted {
            self.rung_to_replica.swap(rung_low, rung_high);
            self.replica_to_rung.swap(replica_low, replica_high);
            replicas[replica_low].set_rung(rung_high);
            replicas[replica_high].set_rung(rung_low);
            if rescale_momenta && ladder.is_temperature() {
                let temp_low = ladder.value_at(rung_low).tempered_value();
                let temp_high = ladder.value_at(rung_high).tempered_value();
                replicas[replica_low].rescale_momenta((temp_high / temp_low).sqrt());
                replicas[replica_high].rescale_momenta((temp_low / temp_high).sqrt());
            }
        }

        let record = ExchangeAttempt {
            round,
            rung_low,
            rung_high,
            replica_low,
            replica_high,
            energy_low,
            energy_high,
            delta,
            acceptance,
            draw,
            accepted,
        };
        self.log.push(record.clone());
        Ok(record)
    }
}

/// Computes the Metropolis acceptance probability for a temperature exchange.
///
/// Exposed separately so ladder-tuning tools can evaluate candidate spacings
/// against recorded energies without constructing an engine.
pub fn exchange_acceptance(energy_low: f64, temp_low: f64, energy_high: f64, temp_high: f64) -> f64 {
    let beta_low = 1.0 / temp_low.max(1e-12);
    let beta_high = 1.0 / temp_high.max(1e-12);
    let delta = (beta_high - beta_low) * (energy_low - energy_high);
    (-delta).exp().min(1.0)
}
