//! lagrange-rs: Lagrangian dynamics in generalized coordinates
//!
//! Simulates assemblies of point masses (molecules, pendulum chains, springs)
//! whose Cartesian positions are functions of a small set of generalized
//! coordinates. The equations of motion are never written by hand: they are
//! assembled from L = T − U by finite differences and integrated with RK4.
//!
//! # Architecture
//!
//! lagrange-rs is built on two core principles:
//!
//! 1. **Separation of Physics and Numerics**
//!    - Entities and potential energy surfaces define energies (what to solve)
//!    - The solver assembles and integrates the Euler-Lagrange equations (how to solve)
//!
//! 2. **Shared, pooled state**
//!    - Generalized coordinates are shared between the solver and observers
//!    - Scratch vectors and matrices come from a [`ResourceManager`](resources::ResourceManager) pool
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use lagrange_rs::prelude::*;
//! use nalgebra::DVector;
//!
//! // 1. Entity, coordinates and energies
//! let resources = Arc::new(ResourceManager::new());
//! let entity: Arc<dyn Entity> = Arc::new(LinearEntity::axis_aligned(DVector::from_vec(vec![1.0, 1.0]))?);
//! let coords = Arc::new(GeneralizedCoordinates::unbounded(DVector::from_vec(vec![1.0, 0.0]), 1e-5, 1e-3)?);
//! let kinetic = Arc::new(KineticOperator::new(Arc::clone(&coords), Arc::clone(&entity), Arc::clone(&resources))?);
//! let springs = Arc::new(HarmonicAnchor::at_rest(entity, resources, 4.0)?);
//!
//! // 2. Scenario and configuration
//! let scenario = Scenario::new(Lagrangian::new(kinetic, springs), coords, DVector::zeros(2))?;
//! let config = SolverConfiguration::time_evolution(1.0, 100);
//!
//! // 3. Run simulation
//! let result = RK4Solver::new().solve(&scenario, &config)?;
//!
//! // 4. Access results: q₀(t) = cos 2t
//! let (q, _) = result.final_state().unwrap();
//! assert!((q[0] - 2.0_f64.cos()).abs() < 1e-5);
//! # Ok::<(), lagrange_rs::error::MechanicsError>(())
//! ```
//!
//! # Modules
//!
//! - [`error`]: error type and context chain
//! - [`resources`]: pooled scratch buffers
//! - [`physics`]: coordinates, entities, kinetic operator, potential surfaces, Lagrangian
//! - [`models`]: concrete entities and surfaces
//! - [`solver`]: finite differences, linear solves, RK4 integration
//!
//! # Features
//!
//! - `parallel` (default): Rayon row-parallel pair sums above
//!   [`parallel_threshold()`](solver::parallel_threshold)

// Core modules
pub mod error;
pub mod physics;
pub mod resources;

pub mod models;
pub mod solver;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use lagrange_rs::prelude::*;
    //! ```
    pub use crate::error::{MechanicsError, ResultExt};
    pub use crate::models::{
        FreeSpace, HarmonicAnchor, LennardJones, LinearEntity, PairForceField, PlanarChain,
        UniformGravity,
    };
    pub use crate::physics::{
        Entity, GeneralizedCoordinates, KineticOperator, Lagrangian, Positions,
        PotentialEnergySurface,
    };
    pub use crate::resources::ResourceManager;
    pub use crate::solver::{
        BoundsPolicy, RK4Solver, Scenario, SimulationResult, Solver, SolverConfiguration,
        SolverLagrangian, SolverState, SolverType,
    };
}
