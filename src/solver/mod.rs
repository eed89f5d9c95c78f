//! Numerical solvers
//!
//! Integration of the Euler-Lagrange equations of a
//! [`Lagrangian`](crate::physics::Lagrangian) in generalized coordinates.
//!
//! # Core Concepts
//!
//! ## The Architecture (WHAT vs HOW)
//!
//! 1. **Scenario** (`Scenario`) - WHAT to solve
//!    - Lagrangian (kinetic operator + potential energy surface)
//!    - shared generalized coordinates
//!    - initial (q, q̇)
//!
//! 2. **Configuration** (`SolverConfiguration`) - HOW to solve
//!    - total time and step count
//!    - recording interval, bounds policy, target energy
//!
//! 3. **Solver** (`Solver` trait) - the numerical method
//!    - `RK4Solver` drives a [`SolverLagrangian`] over the whole run
//!
//! `SolverLagrangian` can also be stepped by hand when the caller needs
//! control between steps (adaptive dt, custom stopping criteria).
//!
//! # Module Organization
//!
//! - **`derivatives`**: central finite differences of L
//! - **`linear`**: 2×2 closed form and pivoted elimination for A·q̈ = rhs
//! - **`traits`**: `Solver`, `SolverType`, `SolverConfiguration`, `SimulationResult`
//! - **`scenario`**: problem definition
//! - **`methods`**: `SolverLagrangian` and `RK4Solver`
//!
//! # Quick Start Example
//!
//! ```rust
//! use std::sync::Arc;
//! use lagrange_rs::models::{PlanarChain, UniformGravity};
//! use lagrange_rs::physics::{Entity, GeneralizedCoordinates, KineticOperator, Lagrangian};
//! use lagrange_rs::resources::ResourceManager;
//! use lagrange_rs::solver::{RK4Solver, Scenario, Solver, SolverConfiguration};
//! use nalgebra::DVector;
//!
//! let resources = Arc::new(ResourceManager::new());
//! let chain: Arc<dyn Entity> = Arc::new(PlanarChain::new(
//!     DVector::from_vec(vec![1.0, 1.0]),
//!     DVector::from_vec(vec![1.0, 1.0]),
//! )?);
//! let coords = Arc::new(GeneralizedCoordinates::unbounded(
//!     DVector::from_vec(vec![0.5, -0.2]),
//!     1e-5,
//!     1e-3,
//! )?);
//!
//! let kinetic = Arc::new(KineticOperator::new(Arc::clone(&coords), Arc::clone(&chain), Arc::clone(&resources))?);
//! let gravity = Arc::new(UniformGravity::new(chain, resources, 9.81));
//! let scenario = Scenario::new(Lagrangian::new(kinetic, gravity), coords, DVector::zeros(2))?;
//!
//! let config = SolverConfiguration::time_evolution(1.0, 500).with_record_every(50);
//! let result = RK4Solver::new().solve(&scenario, &config)?;
//!
//! assert_eq!(result.len(), 11);
//! assert!(result.energy_drift().unwrap() < 1e-4);
//! # Ok::<(), lagrange_rs::error::MechanicsError>(())
//! ```
//!
//! # Error Handling
//!
//! Every operation returns [`Result`](crate::error::Result). Common errors:
//! - invalid configuration (non-positive time, zero steps, dt ≤ 0)
//! - singular Euler-Lagrange system (degenerate coordinates), retryable
//! - divergence (NaN or Inf in the state)

// =================================================================================================
// Module Declarations
// =================================================================================================
pub mod derivatives;
pub mod linear;
mod methods;
mod scenario;
mod traits;

// =================================================================================================
// Parallel Execution Threshold
// =================================================================================================
//
// Stored in an AtomicUsize so it can be changed at runtime (benchmarks,
// tests) without a lock on every evaluation. Relaxed ordering is enough: the
// value is a performance hint, not a synchronisation point.
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of elements above which pair sums switch to parallel iteration.
///
/// Pair interactions are O(M²), so the crossover is much lower than for
/// element-wise work.
const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Runtime-configurable parallel-execution threshold.
///
/// Read via [`parallel_threshold()`], written via [`set_parallel_threshold()`].
static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Return the current parallel-execution threshold.
///
/// Surfaces with per-element row sums (e.g.
/// [`PairForceField`](crate::models::PairForceField)) iterate sequentially
/// when the entity has at most this many elements, and switch to Rayon above
/// it, but only when the crate is compiled with the `parallel` feature.
///
/// # Example
///
/// ```rust
/// use lagrange_rs::solver::parallel_threshold;
///
/// assert!(parallel_threshold() > 0);
/// ```
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Relaxed)
}

/// Set the parallel-execution threshold to a new value.
///
/// # Panics
///
/// Panics when `threshold == 0`.
///
/// # Example
///
/// ```rust
/// use lagrange_rs::solver::{parallel_threshold, set_parallel_threshold};
///
/// let previous = parallel_threshold();
/// set_parallel_threshold(2048);
/// assert_eq!(parallel_threshold(), 2048);
///
/// // Restore so other tests are not affected.
/// set_parallel_threshold(previous);
/// ```
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    PARALLEL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// RAII guard that saves the current threshold on construction and restores
/// it on drop.
///
/// Only compiled in test builds.
///
/// ```rust,ignore
/// let _guard = crate::solver::ThresholdGuard::save(50);
/// // threshold is now 50 …
/// // … and is automatically restored when _guard is dropped.
/// ```
#[cfg(test)]
pub(crate) struct ThresholdGuard {
    previous: usize,
}

#[cfg(test)]
impl ThresholdGuard {
    /// Set the threshold to `new_value` and return a guard that will
    /// restore the previous value on drop.
    pub(crate) fn save(new_value: usize) -> Self {
        let previous = parallel_threshold();
        set_parallel_threshold(new_value);
        Self { previous }
    }
}

#[cfg(test)]
impl Drop for ThresholdGuard {
    fn drop(&mut self) {
        PARALLEL_THRESHOLD.store(self.previous, Ordering::Relaxed);
    }
}

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use derivatives::FiniteDifferences;
pub use methods::{RK4Solver, SolverLagrangian, SolverState};
pub use scenario::Scenario;
pub use traits::{BoundsPolicy, SimulationResult, Solver, SolverConfiguration, SolverType};

// =================================================================================================
// Helper Functions
// =================================================================================================

use crate::error::{MechanicsError, Result};
use nalgebra::DVector;

/// Validate a dynamic state for numerical issues
///
/// # Arguments
///
/// * `q`, `qp` - candidate state
/// * `step` - step index (for error reporting)
///
/// # Example
///
/// ```rust,ignore
/// validate_state(&q, &qp, 42)?;  // Validates state at step 42
/// ```
pub(crate) fn validate_state(q: &DVector<f64>, qp: &DVector<f64>, step: usize) -> Result<()> {
    for (name, values) in [("q", q), ("qp", qp)] {
        // NaN arises from 0/0, Inf - Inf
        if let Some(i) = values.iter().position(|x| x.is_nan()) {
            return Err(MechanicsError::Diverged {
                step,
                reason: format!("NaN in {}[{}], try a smaller time step", name, i),
            });
        }

        if let Some(i) = values.iter().position(|x| x.is_infinite()) {
            return Err(MechanicsError::Diverged {
                step,
                reason: format!("infinity in {}[{}], numerical overflow", name, i),
            });
        }
    }

    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold_value() {
        assert_eq!(DEFAULT_PARALLEL_THRESHOLD, 64);
    }

    #[test]
    fn test_get_and_set_threshold() {
        let _guard = ThresholdGuard::save(500);
        assert_eq!(parallel_threshold(), 500);
    }

    #[test]
    #[should_panic(expected = "parallel threshold must be at least 1")]
    fn test_zero_threshold_panics() {
        set_parallel_threshold(0);
    }

    #[test]
    fn test_threshold_guard_restores_previous_value() {
        let before = parallel_threshold();
        {
            let _guard = ThresholdGuard::save(42);
            assert_eq!(parallel_threshold(), 42);
        }
        assert_eq!(parallel_threshold(), before);
    }

    #[test]
    fn test_validate_state() {
        let q = DVector::from_vec(vec![1.0, 2.0]);
        assert!(validate_state(&q, &q, 1).is_ok());

        let bad = DVector::from_vec(vec![1.0, f64::NAN]);
        match validate_state(&q, &bad, 7).unwrap_err() {
            MechanicsError::Diverged { step, reason } => {
                assert_eq!(step, 7);
                assert!(reason.contains("qp[1]"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let inf = DVector::from_vec(vec![f64::NEG_INFINITY, 0.0]);
        assert!(matches!(validate_state(&inf, &q, 3), Err(MechanicsError::Diverged { step: 3, .. })));
    }
}
