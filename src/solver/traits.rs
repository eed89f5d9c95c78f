//! Solver trait, run configuration and simulation result
//!
//! # Design
//!
//! - `SolverType` says what kind of run is requested and carries its parameters
//! - `SolverConfiguration` wraps it with run-level policies (recording
//!   interval, bounds handling, target energy)
//! - `SimulationResult` holds the recorded trajectory plus free-form metadata
//!
//! `Solver` is the stable seam: a new integrator implements it and is usable
//! wherever a scenario is solved.

use crate::error::{MechanicsError, Result};
use crate::solver::Scenario;
use nalgebra::DVector;
use std::collections::HashMap;

// ============================================================================
// Solver Type
// ============================================================================

/// Kind of numerical run and its parameters
///
/// # Examples
///
/// ```rust
/// use lagrange_rs::solver::SolverType;
///
/// let solver_type = SolverType::TimeEvolution {
///     total_time: 10.0,
///     time_steps: 1000,
/// };
/// assert!(solver_type.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SolverType {
    /// Fixed-step time integration
    ///
    /// # Parameters
    /// - `total_time`: simulated time span
    /// - `time_steps`: number of steps, dt = total_time / time_steps
    TimeEvolution { total_time: f64, time_steps: usize },
}

impl SolverType {
    /// Get name identifier
    pub fn name(&self) -> &str {
        match self {
            SolverType::TimeEvolution { .. } => "TimeEvolution",
        }
    }

    /// Validate that parameters are physically meaningful
    pub fn validate(&self) -> Result<()> {
        match self {
            SolverType::TimeEvolution {
                total_time,
                time_steps,
            } => {
                if !(total_time.is_finite() && *total_time > 0.0) {
                    return Err(MechanicsError::invalid_config(format!(
                        "total time must be positive and finite, got {}",
                        total_time
                    )));
                }
                if *time_steps == 0 {
                    return Err(MechanicsError::invalid_config("time steps must be greater than 0"));
                }
                Ok(())
            }
        }
    }
}

// =================================================================================================
// Solver configuration
// =================================================================================================

/// What to do when a step leaves the coordinate bounds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BoundsPolicy {
    /// Keep integrating silently
    Ignore,
    /// Log a warning and keep integrating
    #[default]
    Warn,
    /// Record the offending state and end the run
    Stop,
}

/// Configuration for a solver run
///
/// # Examples
///
/// ```rust
/// use lagrange_rs::solver::{BoundsPolicy, SolverConfiguration};
///
/// let config = SolverConfiguration::time_evolution(10.0, 1000)
///     .with_record_every(10)
///     .with_bounds_policy(BoundsPolicy::Stop);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfiguration {
    /// Type of run and its parameters
    pub solver_type: SolverType,

    /// Record one state every `record_every` steps (the final state is always recorded)
    pub record_every: usize,

    /// Reaction to coordinates leaving their bounds
    pub bounds_policy: BoundsPolicy,

    /// Rescale the initial velocities to this total energy before integrating
    pub target_energy: Option<f64>,
}

impl SolverConfiguration {
    /// Create a new configuration with a given solver type
    pub fn new(solver_type: SolverType) -> Self {
        Self {
            solver_type,
            record_every: 1,
            bounds_policy: BoundsPolicy::default(),
            target_energy: None,
        }
    }

    /// Create a time evolution configuration
    pub fn time_evolution(total_time: f64, time_steps: usize) -> Self {
        Self::new(SolverType::TimeEvolution {
            total_time,
            time_steps,
        })
    }

    pub fn with_record_every(mut self, record_every: usize) -> Self {
        self.record_every = record_every;
        self
    }

    pub fn with_bounds_policy(mut self, bounds_policy: BoundsPolicy) -> Self {
        self.bounds_policy = bounds_policy;
        self
    }

    pub fn with_target_energy(mut self, energy: f64) -> Self {
        self.target_energy = Some(energy);
        self
    }

    /// Time step implied by the solver type
    pub fn dt(&self) -> f64 {
        match self.solver_type {
            SolverType::TimeEvolution {
                total_time,
                time_steps,
            } => total_time / time_steps as f64,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.solver_type.validate()?;

        if self.record_every == 0 {
            return Err(MechanicsError::invalid_config("record_every must be at least 1"));
        }
        if let Some(energy) = self.target_energy
            && !energy.is_finite()
        {
            return Err(MechanicsError::invalid_config(format!(
                "target energy must be finite, got {}",
                energy
            )));
        }
        Ok(())
    }
}

// =================================================================================================
// Solver trait
// =================================================================================================

/// Numerical method applied to a [`Scenario`]
pub trait Solver {
    /// Integrate the scenario according to `config`
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<SimulationResult>;

    /// Human-readable method name
    fn name(&self) -> &str;
}

// =================================================================================================
// Simulation result
// =================================================================================================

/// Recorded trajectory of a run
///
/// All vectors share one index: entry k is the state at `time_points[k]`.
#[derive(Clone, Debug, Default)]
pub struct SimulationResult {
    pub time_points: Vec<f64>,
    pub positions: Vec<DVector<f64>>,
    pub velocities: Vec<DVector<f64>>,
    pub kinetic_energies: Vec<f64>,
    pub potential_energies: Vec<f64>,

    /// Free-form run information (solver name, dt, ...)
    pub metadata: HashMap<String, String>,
}

impl SimulationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty result with room for `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            time_points: Vec::with_capacity(capacity),
            positions: Vec::with_capacity(capacity),
            velocities: Vec::with_capacity(capacity),
            kinetic_energies: Vec::with_capacity(capacity),
            potential_energies: Vec::with_capacity(capacity),
            metadata: HashMap::new(),
        }
    }

    /// Append one recorded state
    pub fn push(&mut self, t: f64, q: DVector<f64>, qp: DVector<f64>, kinetic: f64, potential: f64) {
        self.time_points.push(t);
        self.positions.push(q);
        self.velocities.push(qp);
        self.kinetic_energies.push(kinetic);
        self.potential_energies.push(potential);
    }

    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    /// Number of recorded states
    pub fn len(&self) -> usize {
        self.time_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_points.is_empty()
    }

    /// Last recorded (q, q̇)
    pub fn final_state(&self) -> Option<(&DVector<f64>, &DVector<f64>)> {
        Some((self.positions.last()?, self.velocities.last()?))
    }

    /// T + U of every recorded state
    pub fn total_energies(&self) -> Vec<f64> {
        self.kinetic_energies
            .iter()
            .zip(&self.potential_energies)
            .map(|(t, u)| t + u)
            .collect()
    }

    /// Largest deviation of T + U from its initial value
    ///
    /// Relative to |E₀| when E₀ ≠ 0, absolute otherwise. `None` when nothing
    /// was recorded.
    pub fn energy_drift(&self) -> Option<f64> {
        let energies = self.total_energies();
        let e0 = *energies.first()?;
        let max_dev = energies.iter().map(|e| (e - e0).abs()).fold(0.0, f64::max);
        Some(if e0 != 0.0 { max_dev / e0.abs() } else { max_dev })
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_type_validation() {
        assert!(SolverType::TimeEvolution { total_time: 1.0, time_steps: 10 }.validate().is_ok());
        assert!(SolverType::TimeEvolution { total_time: 0.0, time_steps: 10 }.validate().is_err());
        assert!(SolverType::TimeEvolution { total_time: f64::NAN, time_steps: 10 }.validate().is_err());
        assert!(SolverType::TimeEvolution { total_time: 1.0, time_steps: 0 }.validate().is_err());
    }

    #[test]
    fn test_configuration_builders() {
        let config = SolverConfiguration::time_evolution(2.0, 400)
            .with_record_every(4)
            .with_bounds_policy(BoundsPolicy::Ignore)
            .with_target_energy(-1.5);

        assert_eq!(config.record_every, 4);
        assert_eq!(config.bounds_policy, BoundsPolicy::Ignore);
        assert_eq!(config.target_energy, Some(-1.5));
        assert_eq!(config.dt(), 0.005);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_configuration_defaults_and_errors() {
        let config = SolverConfiguration::time_evolution(1.0, 10);
        assert_eq!(config.record_every, 1);
        assert_eq!(config.bounds_policy, BoundsPolicy::Warn);
        assert_eq!(config.target_energy, None);

        assert!(config.clone().with_record_every(0).validate().is_err());
        assert!(config.with_target_energy(f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_result_bookkeeping() {
        let mut result = SimulationResult::new();
        assert!(result.is_empty());
        assert_eq!(result.final_state(), None);
        assert_eq!(result.energy_drift(), None);

        result.push(0.0, DVector::zeros(1), DVector::from_element(1, 1.0), 1.0, 1.0);
        result.push(0.1, DVector::zeros(1), DVector::from_element(1, 2.0), 1.5, 0.25);
        result.add_metadata("solver", "test");

        assert_eq!(result.len(), 2);
        assert_eq!(result.total_energies(), vec![2.0, 1.75]);
        assert_eq!(result.energy_drift(), Some(0.125));
        assert_eq!(result.final_state().unwrap().1[0], 2.0);
        assert_eq!(result.metadata["solver"], "test");
    }

    #[test]
    fn test_drift_is_absolute_at_zero_energy() {
        let mut result = SimulationResult::new();
        result.push(0.0, DVector::zeros(1), DVector::zeros(1), 1.0, -1.0);
        result.push(1.0, DVector::zeros(1), DVector::zeros(1), 1.25, -1.0);
        assert_eq!(result.energy_drift(), Some(0.25));
    }
}
