use rex_core::errors::ErrorInfo;
use rex_core::{ControlParameter, EnergySample, Integrator, Microstate, RexError, RngHandle};
use serde::{Deserialize, Serialize};

use crate::determinism;

/// Parameters of the reference harmonic integrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarmonicParams {
    /// Number of independent particles.
    #[serde(default = "default_particles")]
    pub particles: usize,
    /// Spring constant of each harmonic well.
    #[serde(default = "default_spring_constant")]
    pub spring_constant: f64,
    /// Particle mass.
    #[serde(default = "default_mass")]
    pub mass: f64,
    /// Integration timestep.
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Steps between thermostat kicks.
    #[serde(default = "default_thermostat_interval")]
    pub thermostat_interval: u64,
    /// Thermostat mixing strength in (0, 1].
    #[serde(default = "default_friction")]
    pub friction: f64,
    /// Per-component force magnitude beyond which the run is divergent.
    #[serde(default = "default_force_bound")]
    pub force_bound: f64,
}

fn default_particles() -> usize {
    32
}

fn default_spring_constant() -> f64 {
    1.0
}

fn default_mass() -> f64 {
    1.0
}

fn default_dt() -> f64 {
    0.005
}

fn default_thermostat_interval() -> u64 {
    10
}

fn default_friction() -> f64 {
    0.1
}

fn default_force_bound() -> f64 {
    1e6
}

impl Default for HarmonicParams {
    fn default() -> Self {
        Self {
            particles: default_particles(),
            spring_constant: default_spring_constant(),
            mass: default_mass(),
            dt: default_dt(),
            thermostat_interval: default_thermostat_interval(),
            friction: default_friction(),
            force_bound: default_force_bound(),
        }
    }
}

/// Reference integrator: independent harmonic wells propagated by velocity
/// Verlet with a stochastic velocity-mixing thermostat.
///
/// All randomness comes from the microstate's own stream seed and epoch
/// counter, so an advance is bit-reproducible and checkpoint/resume safe.
/// A `PotentialParameter` named `epsilon` scales the spring constant, which
/// makes the potential-tempering acceptance path exercisable end to end.
#[derive(Debug, Clone)]
pub struct HarmonicIntegrator {
    params: HarmonicParams,
}

impl HarmonicIntegrator {
    /// Creates an integrator with the given well parameters.
    pub fn new(params: HarmonicParams) -> Self {
        Self { params }
    }

    /// Builds a thermalized initial microstate for one replica.
    pub fn initial_microstate(&self, stream_seed: u64, parameter: &ControlParameter) -> Microstate {
        let temperature = target_temperature(parameter);
        let mut rng = RngHandle::from_seed(stream_seed);
        let mut state = Microstate::at_rest(self.params.particles, stream_seed);
        let momentum_scale = (self.params.mass * temperature).sqrt();
        for index in 0..self.params.particles {
            for axis in 0..3 {
                state.positions[index][axis] = rng.uniform() - 0.5;
                state.momenta[index][axis] = momentum_scale * gaussian(&mut rng);
            }
        }
        state
    }

    fn effective_spring(&self, parameter: &ControlParameter) -> f64 {
        match parameter {
            ControlParameter::Temperature { .. } => self.params.spring_constant,
            ControlParameter::PotentialParameter { value, .. } => {
                self.params.spring_constant * value
            }
        }
    }

    fn potential_energy(&self, state: &Microstate, spring: f64) -> f64 {
        state
            .positions
            .iter()
            .map(|position| {
                position
                    .iter()
                    .map(|&x| 0.5 * spring * x * x)
                    .sum::<f64>()
            })
            .sum()
    }

    fn kinetic_energy(&self, state: &Microstate) -> f64 {
        state
            .momenta
            .iter()
            .map(|momentum| {
                momentum
                    .iter()
                    .map(|&p| p * p / (2.0 * self.params.mass))
                    .sum::<f64>()
            })
            .sum()
    }
}

fn target_temperature(parameter: &ControlParameter) -> f64 {
    match parameter {
        ControlParameter::Temperature { value } => *value,
        ControlParameter::PotentialParameter { .. } => 1.0,
    }
}

/// Standard normal draw via Box-Muller.
fn gaussian(rng: &mut RngHandle) -> f64 {
    let u1 = rng.uniform().max(f64::MIN_POSITIVE);
    let u2 = rng.uniform();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

impl Integrator for HarmonicIntegrator {
    fn advance(
        &self,
        state: &mut Microstate,
        parameter: &ControlParameter,
        epoch_length: u64,
    ) -> Result<EnergySample, RexError> {
        let spring = self.effective_spring(parameter);
        let temperature = target_temperature(parameter);
        let dt = self.params.dt;
        let mass = self.params.mass;
        let mut rng = RngHandle::from_seed(determinism::epoch_seed(
            state.stream_seed,
            state.stream_epoch,
        ));

        let keep = (1.0 - self.params.friction).max(0.0).sqrt();
        let kick = (self.params.friction * mass * temperature).sqrt();
        let mut potential_sum = 0.0;

        for step in 0..epoch_length {
            for index in 0..state.positions.len() {
                for axis in 0..3 {
                    let x = state.positions[index][axis];
                    let force = -spring * x;
                    if force.abs() > self.params.force_bound || !force.is_finite() {
                        return Err(RexError::IntegratorDivergence(
                            ErrorInfo::new("force-blowup", "force exceeded the divergence bound")
                                .with_context("force", force.to_string())
                                .with_context("step", step.to_string()),
                        ));
                    }
                    let half_momentum = state.momenta[index][axis] + 0.5 * dt * force;
                    let new_x = x + dt * half_momentum / mass;
                    let new_force = -spring * new_x;
                    state.positions[index][axis] = new_x;
                    state.momenta[index][axis] = half_momentum + 0.5 * dt * new_force;
                }
            }
            if self.params.thermostat_interval > 0 && (step + 1) % self.params.thermostat_interval == 0
            {
                let mut reservoir = 0.0;
                for momentum in &mut state.momenta {
                    for component in momentum.iter_mut() {
                        let before = *component;
                        *component = keep * before + kick * gaussian(&mut rng);
                        reservoir += (before * before - *component * *component) / (2.0 * mass);
                    }
                }
                state.thermostat += reservoir;
            }
            potential_sum += self.potential_energy(state, spring);
        }

        state.stream_epoch += 1;
        let potential = self.potential_energy(state, spring);
        let kinetic = self.kinetic_energy(state);
        let sample = EnergySample {
            potential,
            kinetic,
            epoch_mean_potential: potential_sum / epoch_length.max(1) as f64,
        };
        if !sample.is_finite() {
            return Err(RexError::IntegratorDivergence(ErrorInfo::new(
                "non-finite-energy",
                "harmonic integrator produced a non-finite energy",
            )));
        }
        Ok(sample)
    }

    fn reduced_potential(
        &self,
        state: &Microstate,
        parameter: &ControlParameter,
    ) -> Result<f64, RexError> {
        let spring = self.effective_spring(parameter);
        let potential = self.potential_energy(state, spring);
        let reduced = match parameter.beta() {
            Some(beta) => beta * potential,
            None => potential,
        };
        if !reduced.is_finite() {
            return Err(RexError::IntegratorDivergence(ErrorInfo::new(
                "non-finite-energy",
                "reduced potential evaluation produced a non-finite value",
            )));
        }
        Ok(reduced)
    }
}
