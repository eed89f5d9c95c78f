//! Numerical methods for the Euler-Lagrange equations
//!
//! This module contains concrete implementations of the [`Solver`](crate::solver::Solver) trait.
//!
//! # Available Methods
//!
//! - **[`SolverLagrangian`]**: stateful RK4 stepper owning (t, q, q̇)
//!   - Order: fourth-order O(dt⁴)
//!   - Cost per step: 4 q̈ evaluations, each O(N²) Lagrangian evaluations
//!     for the finite-difference system plus an N×N solve
//!   - A failed step leaves the state untouched
//!
//! - **[`RK4Solver`]**: [`Solver`](crate::solver::Solver) over a
//!   [`Scenario`](crate::solver::Scenario), recording the trajectory and
//!   energies
//!
//! # Performance Considerations
//!
//! Each Lagrangian evaluation computes element coordinates and Jacobians
//! into pooled buffers. Pair surfaces parallelize above
//! [`parallel_threshold()`](crate::solver::parallel_threshold).

mod rk4;

// Re-exports for convenience
pub use rk4::{RK4Solver, SolverLagrangian, SolverState};
