//! Concrete entities and potential energy surfaces
//!
//! Entities implement [`Entity`](crate::physics::Entity): they map generalized
//! coordinates onto point masses. Surfaces implement
//! [`PotentialEnergySurface`](crate::physics::PotentialEnergySurface) on top
//! of an entity. Any entity can be paired with any surface.
//!
//! # Entities
//!
//! ## [`LinearEntity`]: constant Jacobian
//!
//! Element positions are affine in q, so the kinetic matrix is constant. Use
//! it for harmonic systems and for checking the integrator against closed-form
//! solutions.
//!
//! ## [`PlanarChain`]: N-pendulum
//!
//! Rigid links parameterized by absolute angles, with an analytic Jacobian.
//! The kinetic matrix depends on q, which exercises the full Euler-Lagrange
//! system including the mixed q/q̇ derivatives.
//!
//! # Surfaces
//!
//! | Surface | U |
//! |---------|---|
//! | [`FreeSpace`] | 0 |
//! | [`HarmonicAnchor`] | ½ k Σ \|r_e − a_e\|² |
//! | [`UniformGravity`] | g Σ m_e z_e |
//! | [`PairForceField`] | Σ_{i<j} Lennard-Jones(r_ij), truncated at the cutoff |

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod free_space;
pub mod harmonic_anchor;
pub mod linear_entity;
pub mod pair_force_field;
pub mod planar_chain;
pub mod uniform_gravity;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use free_space::FreeSpace;
pub use harmonic_anchor::HarmonicAnchor;
pub use linear_entity::LinearEntity;
pub use pair_force_field::{LennardJones, PairForceField};
pub use planar_chain::PlanarChain;
pub use uniform_gravity::{UniformGravity, STANDARD_GRAVITY};
