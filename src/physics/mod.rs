//! Lagrangian mechanics in generalized coordinates
//!
//! This module holds the physics side of the engine: how a set of generalized
//! coordinates q maps onto point masses, and the energies built on top.
//!
//! # Core Concepts
//!
//! - **Entity**: assembly of M point masses whose Cartesian positions are
//!   functions of N generalized coordinates
//! - **Kinetic operator**: mass matrix K(q) = Σ_axis J·diag(m)·Jᵗ and
//!   kinetic energy T = ½ q̇ᵗKq̇
//! - **Potential energy surface**: U(q), evaluated from element coordinates
//! - **Lagrangian**: L = T − U
//!
//! # Architecture
//!
//! The physics side only provides **energies**. Equations of motion are
//! assembled numerically by the solver from L alone, so a new system only
//! needs an [`Entity`] and a [`PotentialEnergySurface`].
//!
//! ```text
//! Lagrangian ──► KineticOperator ──► Entity (Jacobian, masses)
//!            └─► PotentialEnergySurface ──► Entity (coordinates)
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use lagrange_rs::models::{LinearEntity, UniformGravity};
//! use lagrange_rs::physics::{Entity, GeneralizedCoordinates, KineticOperator, Lagrangian};
//! use lagrange_rs::resources::ResourceManager;
//! use nalgebra::DVector;
//!
//! let resources = Arc::new(ResourceManager::new());
//! let entity: Arc<dyn Entity> = Arc::new(LinearEntity::axis_aligned(DVector::from_vec(vec![2.0]))?);
//! let coords = Arc::new(GeneralizedCoordinates::uniform(1, 0.0, -1.0, 1.0, 1e-6, 1e-3));
//!
//! let kinetic = Arc::new(KineticOperator::new(coords, Arc::clone(&entity), Arc::clone(&resources))?);
//! let gravity = Arc::new(UniformGravity::new(entity, resources, 9.81));
//! let lagrangian = Lagrangian::new(kinetic, gravity);
//!
//! let q = DVector::from_vec(vec![0.0]);
//! let qp = DVector::from_vec(vec![1.0]);
//! assert!((lagrangian.lagrangian(&q, &qp)? - 1.0).abs() < 1e-12);
//! # Ok::<(), lagrange_rs::error::MechanicsError>(())
//! ```

pub mod coordinates;
pub mod entity;
pub mod kinetic;
pub mod lagrangian;
pub mod positions;
pub mod potential;

pub use coordinates::GeneralizedCoordinates;
pub use entity::{check_entity_inputs, check_jacobian_shapes, finite_difference_jacobian, Entity};
pub use kinetic::KineticOperator;
pub use lagrangian::Lagrangian;
pub use positions::{Axis, Positions};
pub use potential::{numerical_gradient, PotentialEnergySurface};
