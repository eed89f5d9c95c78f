//! Simulation scenario definition
//!
//! A scenario bundles a Lagrangian, the shared generalized coordinates it is
//! expressed in and the initial state.
use crate::error::{ensure_len, MechanicsError, Result};
use crate::physics::{GeneralizedCoordinates, Lagrangian};
use nalgebra::DVector;
use std::sync::Arc;

/// Simulation scenario
///
/// The initial positions are snapshotted from the coordinates at
/// construction; every solve restarts from them, so the same scenario can be
/// solved repeatedly or with different configurations.
///
/// # Examples
///
/// ```rust,ignore
/// let scenario = Scenario::new(lagrangian, coordinates, initial_velocities)?;
///
/// let coarse = RK4Solver::new().solve(&scenario, &SolverConfiguration::time_evolution(1.0, 100))?;
/// let fine = RK4Solver::new().solve(&scenario, &SolverConfiguration::time_evolution(1.0, 1000))?;
/// ```
#[derive(Clone)]
pub struct Scenario {
    /// Dynamics (T − U)
    pub lagrangian: Lagrangian,

    /// Coordinates the solver publishes to after each step
    pub coordinates: Arc<GeneralizedCoordinates>,

    /// q at t = 0
    pub initial_positions: DVector<f64>,

    /// q̇ at t = 0
    pub initial_velocities: DVector<f64>,
}

impl Scenario {
    /// Create a scenario starting at the coordinates' current values
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn new(
        lagrangian: Lagrangian,
        coordinates: Arc<GeneralizedCoordinates>,
        initial_velocities: DVector<f64>,
    ) -> Result<Self> {
        let initial_positions = coordinates.values();
        let scenario = Self {
            lagrangian,
            coordinates,
            initial_positions,
            initial_velocities,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check dimensions and the initial state
    pub fn validate(&self) -> Result<()> {
        let n = self.lagrangian.no_of_dofs();
        ensure_len("Scenario::validate (coordinates)", n, self.coordinates.len())?;
        ensure_len("Scenario::validate (positions)", n, self.initial_positions.len())?;
        ensure_len("Scenario::validate (velocities)", n, self.initial_velocities.len())?;

        if self.initial_positions.iter().chain(self.initial_velocities.iter()).any(|x| !x.is_finite()) {
            return Err(MechanicsError::invalid_config("initial state must be finite"));
        }
        if let Some(violation) = self.coordinates.first_out_of_bounds(&self.initial_positions) {
            return Err(violation);
        }
        Ok(())
    }

    pub fn no_of_dofs(&self) -> usize {
        self.lagrangian.no_of_dofs()
    }

    /// Get potential energy surface name
    pub fn potential_name(&self) -> &str {
        self.lagrangian.potential().name()
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("potential", &self.potential_name())
            .field("dofs", &self.no_of_dofs())
            .field("initial positions", &self.initial_positions)
            .field("initial velocities", &self.initial_velocities)
            .finish()
    }
}

// ================================================================================================
// Tests
// ================================================================================================
