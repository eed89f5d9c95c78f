//! Runge-Kutta 4 integration of the Euler-Lagrange equations
//!
//! # Equations of motion
//!
//! For a Lagrangian without explicit time dependency the Euler-Lagrange
//! equations d/dt ∂L/∂q̇_i = ∂L/∂q_i expand into a linear system for q̈:
//!
//! ```text
//! Σ_j ∂²L/∂q̇_i∂q̇_j · q̈_j = ∂L/∂q_i − Σ_j ∂²L/∂q̇_i∂q_j · q̇_j
//!        A_ij                          rhs_i
//! ```
//!
//! Every derivative is a central finite difference of L (see
//! [`FiniteDifferences`]); A is the kinetic matrix seen through L and becomes
//! singular where the coordinates degenerate (e.g. a bending angle of 0 or
//! 180 degrees in internal coordinates).
//!
//! # RK4 on (q, q̇)
//!
//! ```text
//! k₀ = dt·q̇                  k'₀ = dt·q̈(q, q̇)
//! k₁ = dt·(q̇ + k'₀/2)        k'₁ = dt·q̈(q + k₀/2, q̇ + k'₀/2)
//! k₂ = dt·(q̇ + k'₁/2)        k'₂ = dt·q̈(q + k₁/2, q̇ + k'₁/2)
//! k₃ = dt·(q̇ + k'₂)          k'₃ = dt·q̈(q + k₂,   q̇ + k'₂)
//!
//! q ← q + (k₀ + 2k₁ + 2k₂ + k₃)/6      q̇ ← q̇ + (k'₀ + 2k'₁ + 2k'₂ + k'₃)/6
//! ```
//!
//! # Failure semantics
//!
//! A step either completes or leaves (q, q̇, t) untouched: stages only write
//! scratch buffers, and the new state is committed after every check passed.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use lagrange_rs::models::{HarmonicAnchor, LinearEntity};
//! use lagrange_rs::physics::{Entity, GeneralizedCoordinates, KineticOperator, Lagrangian};
//! use lagrange_rs::resources::ResourceManager;
//! use lagrange_rs::solver::SolverLagrangian;
//! use nalgebra::DVector;
//!
//! let resources = Arc::new(ResourceManager::new());
//! let entity: Arc<dyn Entity> = Arc::new(LinearEntity::axis_aligned(DVector::from_vec(vec![1.0, 1.0]))?);
//! let coords = Arc::new(GeneralizedCoordinates::unbounded(DVector::from_vec(vec![1.0, 0.0]), 1e-5, 1e-3)?);
//!
//! let kinetic = Arc::new(KineticOperator::new(Arc::clone(&coords), Arc::clone(&entity), Arc::clone(&resources))?);
//! let springs = Arc::new(HarmonicAnchor::at_rest(entity, resources, 1.0)?);
//! let lagrangian = Lagrangian::new(kinetic, springs);
//!
//! let mut solver = SolverLagrangian::new(lagrangian, coords, DVector::zeros(2))?;
//! for _ in 0..10 {
//!     solver.step(0.01)?;
//! }
//!
//! // q₀(t) = cos t
//! assert!((solver.q()[0] - 0.1_f64.cos()).abs() < 1e-6);
//! # Ok::<(), lagrange_rs::error::MechanicsError>(())
//! ```

use crate::error::{ensure_len, MechanicsError, Result, ResultExt};
use crate::physics::{GeneralizedCoordinates, Lagrangian};
use crate::solver::derivatives::FiniteDifferences;
use crate::solver::{
    linear, validate_state, BoundsPolicy, Scenario, SimulationResult, Solver, SolverConfiguration,
    SolverType,
};
use log::{debug, info, trace, warn};
use nalgebra::{DMatrix, DVector};
use std::sync::Arc;

/// Position of the RK4 stage k_s relative to the start of the step
const STAGE_OFFSETS: [f64; 4] = [0.0, 0.5, 0.5, 1.0];

/// Simpson weights of the four stages
const STAGE_WEIGHTS: [f64; 4] = [1.0 / 6.0, 2.0 / 6.0, 2.0 / 6.0, 1.0 / 6.0];

// =================================================================================================
// Euler-Lagrange linear system
// =================================================================================================

/// Preallocated A, rhs and perturbation scratch for one q̈ evaluation
#[derive(Debug, Clone)]
struct EulerLagrangeSystem {
    a: DMatrix<f64>,
    rhs: DVector<f64>,
    rows: Vec<usize>,
    q_work: DVector<f64>,
    qp_work: DVector<f64>,
}

impl EulerLagrangeSystem {
    fn new(n: usize) -> Self {
        Self {
            a: DMatrix::zeros(n, n),
            rhs: DVector::zeros(n),
            rows: vec![0; n],
            q_work: DVector::zeros(n),
            qp_work: DVector::zeros(n),
        }
    }

    /// Fill A and rhs at (q, q̇), then solve A·q̈ = rhs into `qpp`
    fn accelerations(
        &mut self,
        fd: &FiniteDifferences<'_>,
        q: &DVector<f64>,
        qp: &DVector<f64>,
        qpp: &mut DVector<f64>,
    ) -> Result<()> {
        let n = q.len();
        self.q_work.copy_from(q);
        self.qp_work.copy_from(qp);

        for i in 0..n {
            self.rhs[i] = fd.diffq(i, &mut self.q_work, &self.qp_work)?;

            // A is symmetric: fill the upper triangle and mirror it
            for j in i..n {
                let aij = fd.diffpp(i, j, &self.q_work, &mut self.qp_work)?;
                self.a[(i, j)] = aij;
                self.a[(j, i)] = aij;
            }

            for j in 0..n {
                self.rhs[i] -= fd.diffqp(j, i, &mut self.q_work, &mut self.qp_work)? * qp[j];
            }
        }

        trace!("Euler-Lagrange system: A = {}, rhs = {}", self.a, self.rhs);

        linear::solve(&mut self.a, &mut self.rhs, &mut self.rows, qpp)
    }
}

// =================================================================================================
// SolverLagrangian
// =================================================================================================

/// Lifecycle of a [`SolverLagrangian`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    /// Constructed, no successful step yet
    Idle,
    /// At least one step succeeded
    Stepping,
}

/// RK4 stage buffers, allocated once
#[derive(Debug, Clone)]
struct Stages {
    k: [DVector<f64>; 4],
    kp: [DVector<f64>; 4],
    q_tmp: DVector<f64>,
    qp_tmp: DVector<f64>,
    qpp: DVector<f64>,
}

impl Stages {
    fn new(n: usize) -> Self {
        let zeros = || DVector::zeros(n);
        Self {
            k: [zeros(), zeros(), zeros(), zeros()],
            kp: [zeros(), zeros(), zeros(), zeros()],
            q_tmp: zeros(),
            qp_tmp: zeros(),
            qpp: zeros(),
        }
    }
}

/// Integrator of the Euler-Lagrange equations of a [`Lagrangian`]
///
/// Owns the dynamic state (t, q, q̇) and every buffer a step needs. After each
/// successful step the new q is published to the shared
/// [`GeneralizedCoordinates`].
pub struct SolverLagrangian {
    lagrangian: Lagrangian,
    coordinates: Arc<GeneralizedCoordinates>,

    state: SolverState,
    time: f64,
    steps: usize,
    q: DVector<f64>,
    qp: DVector<f64>,

    epsilon: DVector<f64>,
    epsilonp: DVector<f64>,

    system: EulerLagrangeSystem,
    stages: Stages,
}

impl SolverLagrangian {
    /// Create a solver starting at the coordinates' current values with velocity `qp`
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when the Lagrangian, the coordinates and `qp` do not
    /// share one dof count.
    pub fn new(
        lagrangian: Lagrangian,
        coordinates: Arc<GeneralizedCoordinates>,
        qp: DVector<f64>,
    ) -> Result<Self> {
        let n = lagrangian.no_of_dofs();
        ensure_len("SolverLagrangian::new (coordinates)", n, coordinates.len())?;
        ensure_len("SolverLagrangian::new (velocities)", n, qp.len())?;

        let q = coordinates.values();
        let epsilon = coordinates.dqs().clone();
        let epsilonp = coordinates.dqps().clone();

        debug!(
            "SolverLagrangian created: {} dofs, kinetic {:?}, potential '{}'",
            n,
            lagrangian.kinetic(),
            lagrangian.potential().name()
        );

        Ok(Self {
            lagrangian,
            coordinates,
            state: SolverState::Idle,
            time: 0.0,
            steps: 0,
            q,
            qp,
            epsilon,
            epsilonp,
            system: EulerLagrangeSystem::new(n),
            stages: Stages::new(n),
        })
    }

    // ========================================= accessors =========================================

    pub fn state(&self) -> SolverState {
        self.state
    }

    /// Elapsed simulated time
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of successful steps
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Current generalized coordinates
    pub fn q(&self) -> &DVector<f64> {
        &self.q
    }

    /// Current generalized velocities
    pub fn qp(&self) -> &DVector<f64> {
        &self.qp
    }

    pub fn lagrangian(&self) -> &Lagrangian {
        &self.lagrangian
    }

    pub fn coordinates(&self) -> &Arc<GeneralizedCoordinates> {
        &self.coordinates
    }

    pub fn kinetic_energy(&self) -> Result<f64> {
        self.lagrangian.kinetic_energy(&self.q, &self.qp)
    }

    pub fn potential_energy(&self) -> Result<f64> {
        self.lagrangian.potential_energy(&self.q)
    }

    pub fn total_energy(&self) -> Result<f64> {
        self.lagrangian.total_energy(&self.q, &self.qp)
    }

    // ========================================= dynamics ==========================================

    /// Generalized accelerations q̈ at (q, q̇)
    ///
    /// # Errors
    ///
    /// `SingularSystem` when A has a zero pivot; Lagrangian failures are
    /// propagated with context.
    pub fn calc_qpp(&mut self, q: &DVector<f64>, qp: &DVector<f64>) -> Result<&DVector<f64>> {
        const OP: &str = "SolverLagrangian::calc_qpp";
        let n = self.q.len();
        ensure_len(OP, n, q.len())?;
        ensure_len(OP, n, qp.len())?;

        let fd = FiniteDifferences::new(&self.lagrangian, &self.epsilon, &self.epsilonp);
        self.system
            .accelerations(&fd, q, qp, &mut self.stages.qpp)
            .context(OP)?;
        Ok(&self.stages.qpp)
    }

    /// Advance (q, q̇) by one RK4 step of length `dt`
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` when `dt` is not positive and finite
    /// - `SingularSystem` when a stage meets a singular A
    /// - `Diverged` when the new state holds NaN or infinite values
    ///
    /// On error the solver state is left exactly as before the call.
    pub fn step(&mut self, dt: f64) -> Result<()> {
        const OP: &str = "SolverLagrangian::step";

        if !(dt.is_finite() && dt > 0.0) {
            return Err(MechanicsError::invalid_config(format!(
                "time step must be positive and finite, got {}",
                dt
            )));
        }

        if let Err(e) = self.run_stages(dt) {
            if e.is_singular() {
                warn!("step {} at t = {} hit a singular system: {}", self.steps + 1, self.time, e);
            }
            return Err(e.with_context(OP));
        }

        // Candidate state in the stage scratch buffers
        let Stages {
            k,
            kp,
            q_tmp,
            qp_tmp,
            ..
        } = &mut self.stages;

        q_tmp.copy_from(&self.q);
        qp_tmp.copy_from(&self.qp);
        for s in 0..4 {
            q_tmp.axpy(STAGE_WEIGHTS[s], &k[s], 1.0);
            qp_tmp.axpy(STAGE_WEIGHTS[s], &kp[s], 1.0);
        }

        validate_state(q_tmp, qp_tmp, self.steps + 1).context(OP)?;
        self.coordinates.set_values(q_tmp).context(OP)?;

        std::mem::swap(&mut self.q, q_tmp);
        std::mem::swap(&mut self.qp, qp_tmp);
        self.time += dt;
        self.steps += 1;
        self.state = SolverState::Stepping;

        trace!("step {}: t = {}, q = {}, qp = {}", self.steps, self.time, self.q, self.qp);
        Ok(())
    }

    /// Fill k and k' for the four stages
    fn run_stages(&mut self, dt: f64) -> Result<()> {
        let fd = FiniteDifferences::new(&self.lagrangian, &self.epsilon, &self.epsilonp);
        let Stages {
            k,
            kp,
            q_tmp,
            qp_tmp,
            qpp,
        } = &mut self.stages;

        for s in 0..4 {
            q_tmp.copy_from(&self.q);
            qp_tmp.copy_from(&self.qp);
            if s > 0 {
                q_tmp.axpy(STAGE_OFFSETS[s], &k[s - 1], 1.0);
                qp_tmp.axpy(STAGE_OFFSETS[s], &kp[s - 1], 1.0);
            }

            self.system.accelerations(&fd, q_tmp, qp_tmp, qpp)?;

            k[s].copy_from(qp_tmp);
            k[s] *= dt;
            kp[s].copy_from(qpp);
            kp[s] *= dt;
        }
        Ok(())
    }

    /// Rescale q̇ so that T + U equals `energy`
    ///
    /// T is quadratic in q̇, so the direction of motion is kept and only its
    /// magnitude changes.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` when `energy` is below the current potential energy
    /// - `Logic` when q̇ is zero (no direction to scale)
    pub fn set_total_energy(&mut self, energy: f64) -> Result<()> {
        const OP: &str = "SolverLagrangian::set_total_energy";

        let u = self.potential_energy().context(OP)?;
        let t = self.kinetic_energy().context(OP)?;

        if !(energy.is_finite() && energy >= u) {
            warn!("target energy {} is below the potential energy {}", energy, u);
            return Err(MechanicsError::invalid_config(format!(
                "target energy {} is below the potential energy {}",
                energy, u
            )));
        }
        if t <= 0.0 {
            warn!("cannot reach energy {} from a state at rest", energy);
            return Err(MechanicsError::logic(
                "kinetic energy is zero, velocities have no direction to rescale",
            ));
        }

        self.qp *= ((energy - u) / t).sqrt();
        debug!("velocities rescaled to total energy {} (T = {}, U = {})", energy, energy - u, u);
        Ok(())
    }
}

impl std::fmt::Debug for SolverLagrangian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverLagrangian")
            .field("state", &self.state)
            .field("time", &self.time)
            .field("steps", &self.steps)
            .field("q", &self.q)
            .field("qp", &self.qp)
            .finish()
    }
}

// =================================================================================================
// RK4 Solver (whole-run driver)
// =================================================================================================

/// Fixed-step RK4 driver over a [`Scenario`]
///
/// Resets the scenario's coordinates to their initial values, optionally
/// rescales the velocities to the configured energy, then steps
/// `time_steps` times, recording every `record_every` steps and applying the
/// bounds policy after each step.
#[derive(Debug, Clone, Copy, Default)]
pub struct RK4Solver;

impl RK4Solver {
    pub fn new() -> Self {
        Self
    }

    fn record(solver: &SolverLagrangian, result: &mut SimulationResult) -> Result<()> {
        let t = solver.kinetic_energy()?;
        let u = solver.potential_energy()?;
        result.push(solver.time(), solver.q().clone(), solver.qp().clone(), t, u);
        Ok(())
    }
}

impl Solver for RK4Solver {
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<SimulationResult> {
        const OP: &str = "RK4Solver::solve";

        // ====== Step 1: Validation ======

        config.validate().context(OP)?;
        scenario.validate().context(OP)?;

        let SolverType::TimeEvolution {
            total_time,
            time_steps,
        } = config.solver_type;

        // ====== Step 2: Setup ======

        let dt = total_time / (time_steps as f64);

        scenario
            .coordinates
            .set_values(&scenario.initial_positions)
            .context(OP)?;
        let mut solver = SolverLagrangian::new(
            scenario.lagrangian.clone(),
            Arc::clone(&scenario.coordinates),
            scenario.initial_velocities.clone(),
        )
        .context(OP)?;

        if let Some(energy) = config.target_energy {
            solver.set_total_energy(energy).context(OP)?;
        }

        info!(
            "{}: {} dofs, {} steps of dt = {} (total time {})",
            self.name(),
            scenario.lagrangian.no_of_dofs(),
            time_steps,
            dt,
            total_time
        );

        let mut result = SimulationResult::with_capacity(time_steps / config.record_every + 2);
        Self::record(&solver, &mut result).context(OP)?;

        // ====== Step 3: Time Integration ======

        let mut stopped = None;
        for step in 0..time_steps {
            solver.step(dt).context(OP)?;

            let violation = scenario.coordinates.first_out_of_bounds(solver.q());
            if let Some(violation) = violation {
                match config.bounds_policy {
                    BoundsPolicy::Ignore => {}
                    BoundsPolicy::Warn => warn!("step {}: {}", step + 1, violation),
                    BoundsPolicy::Stop => {
                        warn!("step {}: {}, stopping", step + 1, violation);
                        Self::record(&solver, &mut result).context(OP)?;
                        stopped = Some(violation.to_string());
                        break;
                    }
                }
            }

            if (step + 1) % config.record_every == 0 || step + 1 == time_steps {
                Self::record(&solver, &mut result).context(OP)?;
            }
        }

        // ====== Step 4: Build Result ======

        result.add_metadata("solver", "Runge-Kutta 4 (Euler-Lagrange)");
        result.add_metadata("time steps", &solver.steps().to_string());
        result.add_metadata("dt", &dt.to_string());
        result.add_metadata("total time", &total_time.to_string());
        result.add_metadata("q evaluations", &(4 * solver.steps()).to_string());
        if let Some(reason) = &stopped {
            result.add_metadata("stopped", reason);
        }

        info!(
            "{}: finished at t = {} after {} steps, energy drift {:e}",
            self.name(),
            solver.time(),
            solver.steps(),
            result.energy_drift().unwrap_or(0.0)
        );

        Ok(result)
    }

    fn name(&self) -> &str {
        "Runge Kutta (RK4)"
    }
}

// =================================================================================================
// Tests
// =================================================================================================
