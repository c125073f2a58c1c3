use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rex_core::errors::ErrorInfo;
use rex_core::{ControlParameter, EnergySample, Integrator, Microstate, RexError};
use serde::{Deserialize, Serialize};

/// One simulated copy of the system, assigned to one ladder rung.
///
/// The microstate is owned exclusively by the replica. It is mutated in two
/// places only: [`Replica::advance`] during the parallel sampling phase, and
/// the exchange engine's momentum rescale during the serialized exchange
/// phase. The rung field is written by the exchange engine alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replica {
    index: usize,
    rung: usize,
    /// Microscopic state propagated by the integrator.
    pub microstate: Microstate,
    epochs: u64,
    recent_energies: VecDeque<f64>,
    history_capacity: usize,
}

impl Replica {
    /// Creates a replica at `rung` with the provided initial microstate.
    pub fn new(index: usize, rung: usize, microstate: Microstate, history_capacity: usize) -> Self {
        Self {
            index,
            rung,
            microstate,
            epochs: 0,
            recent_energies: VecDeque::with_capacity(history_capacity.min(1024)),
            history_capacity: history_capacity.max(1),
        }
    }

    /// Rebuilds a replica from checkpointed state.
    pub(crate) fn restore(
        index: usize,
        rung: usize,
        epochs: u64,
        microstate: Microstate,
        history_capacity: usize,
    ) -> Self {
        let mut replica = Self::new(index, rung, microstate, history_capacity);
        replica.epochs = epochs;
        replica
    }

    /// Stable identity of the replica.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Rung the replica currently occupies.
    pub fn rung(&self) -> usize {
        self.rung
    }

    /// Reassigns the rung. Called by the exchange engine only.
    pub(crate) fn set_rung(&mut self, rung: usize) {
        self.rung = rung;
    }

    /// Cumulative number of completed epochs.
    pub fn epochs(&self) -> u64 {
        self.epochs
    }

    /// Recent energy samples, oldest first.
    pub fn recent_energies(&self) -> impl Iterator<Item = f64> + '_ {
        self.recent_energies.iter().copied()
    }

    /// Advances the microstate by one sampling epoch under `parameter`.
    ///
    /// Non-finite energies and wall-clock overruns both surface as
    /// [`RexError::IntegratorDivergence`]; the scheduler degrades the lane
    /// and the rest of the run continues.
    pub fn advance(
        &mut self,
        integrator: &dyn Integrator,
        parameter: &ControlParameter,
        epoch_length: u64,
        timeout: Option<Duration>,
    ) -> Result<EnergySample, RexError> {
        let started = Instant::now();
        let sample = integrator.advance(&mut self.microstate, parameter, epoch_length)?;
        if let Some(budget) = timeout {
            let elapsed = started.elapsed();
            if elapsed > budget {
                return Err(RexError::IntegratorDivergence(
                    ErrorInfo::new("epoch-timeout", "epoch exceeded its wall-clock budget")
                        .with_context("replica", self.index.to_string())
                        .with_context("elapsed_secs", elapsed.as_secs_f64().to_string())
                        .with_context("budget_secs", budget.as_secs_f64().to_string()),
                ));
            }
        }
        if !sample.is_finite() {
            return Err(RexError::IntegratorDivergence(
                ErrorInfo::new("non-finite-energy", "integrator reported a non-finite energy")
                    .with_context("replica", self.index.to_string())
                    .with_context("potential", sample.potential.to_string()),
            ));
        }
        self.epochs += 1;
        Ok(sample)
    }

    /// Records an energy sample in the bounded history ring buffer.
    pub fn record_energy(&mut self, energy: f64) {
        if self.recent_energies.len() == self.history_capacity {
            self.recent_energies.pop_front();
        }
        self.recent_energies.push_back(energy);
    }

    /// Multiplies every momentum component by `factor`.
    pub(crate) fn rescale_momenta(&mut self, factor: f64) {
        self.microstate.rescale_momenta(factor);
    }
}
