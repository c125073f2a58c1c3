//! Control parameters, microstates, and the integrator collaborator trait.

use serde::{Deserialize, Serialize};

use crate::errors::RexError;

/// Tagged value identifying what a ladder rung tempers.
///
/// A ladder is a strictly monotonic sequence of values of a single variant:
/// either temperatures or values of one named potential parameter (for
/// example a pair-potential epsilon or a cutoff radius). The variant decides
/// which acceptance rule the exchange engine applies and whether momenta are
/// rescaled on an accepted swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ControlParameter {
    /// Temperature tempering; `value` is the target temperature in reduced
    /// units (Boltzmann constant folded in, so beta = 1/value).
    Temperature {
        /// Target temperature of the rung.
        value: f64,
    },
    /// Tempering of a named potential parameter with no direct momentum
    /// coupling; momenta are never rescaled for this variant.
    PotentialParameter {
        /// Name of the tempered parameter (e.g. "epsilon", "r_cut").
        name: String,
        /// Value the parameter takes at this rung.
        value: f64,
    },
}

impl ControlParameter {
    /// Returns the scalar that must be strictly monotonic along a ladder.
    pub fn tempered_value(&self) -> f64 {
        match self {
            ControlParameter::Temperature { value } => *value,
            ControlParameter::PotentialParameter { value, .. } => *value,
        }
    }

    /// Returns the inverse temperature for the temperature variant.
    pub fn beta(&self) -> Option<f64> {
        match self {
            ControlParameter::Temperature { value } => Some(1.0 / value.max(1e-12)),
            ControlParameter::PotentialParameter { .. } => None,
        }
    }

    /// True when this parameter tempers temperature.
    pub fn is_temperature(&self) -> bool {
        matches!(self, ControlParameter::Temperature { .. })
    }

    /// Stable label used in metrics exports and error contexts.
    pub fn label(&self) -> String {
        match self {
            ControlParameter::Temperature { .. } => "temperature".to_string(),
            ControlParameter::PotentialParameter { name, .. } => name.clone(),
        }
    }
}

/// Full microscopic state of one replica.
///
/// Owned exclusively by its replica: the scheduler mutates it only through
/// [`Integrator::advance`] during the parallel phase, and the exchange engine
/// only rescales `momenta` during the serialized phase. The integrator's own
/// randomness is carried inside the state (`stream_seed` plus the epoch
/// counter) so that a checkpointed microstate resumes bit-identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Microstate {
    /// Particle positions.
    pub positions: Vec<[f64; 3]>,
    /// Particle momenta.
    pub momenta: Vec<[f64; 3]>,
    /// Seed of the integrator-internal random stream for this replica.
    pub stream_seed: u64,
    /// Number of epochs the stream has been consumed for (stream position).
    pub stream_epoch: u64,
    /// Thermostat accumulator carried between epochs.
    pub thermostat: f64,
}

impl Microstate {
    /// Creates an empty microstate for `particles` particles at rest.
    pub fn at_rest(particles: usize, stream_seed: u64) -> Self {
        Self {
            positions: vec![[0.0; 3]; particles],
            momenta: vec![[0.0; 3]; particles],
            stream_seed,
            stream_epoch: 0,
            thermostat: 0.0,
        }
    }

    /// Multiplies every momentum component by `factor`.
    pub fn rescale_momenta(&mut self, factor: f64) {
        for momentum in &mut self.momenta {
            for component in momentum.iter_mut() {
                *component *= factor;
            }
        }
    }
}

/// Energies measured by the integrator at an epoch boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergySample {
    /// Instantaneous potential energy at the epoch boundary.
    pub potential: f64,
    /// Instantaneous kinetic energy at the epoch boundary.
    pub kinetic: f64,
    /// Potential energy averaged over the whole epoch.
    pub epoch_mean_potential: f64,
}

impl EnergySample {
    /// Instantaneous total energy at the epoch boundary.
    pub fn total(&self) -> f64 {
        self.potential + self.kinetic
    }

    /// True when every recorded quantity is finite.
    pub fn is_finite(&self) -> bool {
        self.potential.is_finite() && self.kinetic.is_finite() && self.epoch_mean_potential.is_finite()
    }
}

/// Opaque stepping collaborator that advances a single replica.
///
/// The coordinator never inspects how the state is propagated; it only
/// requires that `advance` is deterministic given the microstate (including
/// its embedded stream position) and that divergence is reported as
/// [`RexError::IntegratorDivergence`] rather than silently producing
/// non-finite energies.
pub trait Integrator: Send + Sync {
    /// Propagates `state` for `epoch_length` steps under `parameter` and
    /// returns the energies measured at the epoch boundary.
    fn advance(
        &self,
        state: &mut Microstate,
        parameter: &ControlParameter,
        epoch_length: u64,
    ) -> Result<EnergySample, RexError>;

    /// Evaluates the reduced potential of `state` under `parameter` without
    /// advancing it. Used for the generalized cross-wise acceptance rule when
    /// a potential parameter is tempered.
    fn reduced_potential(
        &self,
        state: &Microstate,
        parameter: &ControlParameter,
    ) -> Result<f64, RexError>;
}
