//! Mock entities and surfaces for testing
//!
//! These models have known analytical behavior, making them
//! ideal for validating the solver against closed-form results.

use lagrange_rs::error::Result;
use lagrange_rs::physics::{check_entity_inputs, Entity, PotentialEnergySurface, Positions};
use lagrange_rs::resources::ResourceManager;
use nalgebra::{DVector, Vector3};
use std::sync::Arc;

// =================================================================================================
// Bead on a ring: one angle, default (finite-difference) Jacobian
// =================================================================================================

/// Single mass on a horizontal circle of radius `radius`
///
/// K = m r² for every angle, so a free bead turns at constant angular
/// velocity. Only `compute_coordinates` is provided.
pub struct BeadOnRing {
    pub radius: f64,
    masses: DVector<f64>,
}

impl BeadOnRing {
    pub fn new(mass: f64, radius: f64) -> Self {
        Self {
            radius,
            masses: DVector::from_element(1, mass),
        }
    }
}

impl Entity for BeadOnRing {
    fn no_of_dofs(&self) -> usize {
        1
    }

    fn no_of_elements(&self) -> usize {
        1
    }

    fn masses(&self) -> &DVector<f64> {
        &self.masses
    }

    fn compute_coordinates(&self, q: &DVector<f64>, out: &mut Positions) -> Result<()> {
        check_entity_inputs(self, "BeadOnRing::compute_coordinates", q, out)?;
        out.set(0, Vector3::new(self.radius * q[0].cos(), self.radius * q[0].sin(), 0.0));
        Ok(())
    }

    fn name(&self) -> &str {
        "BeadOnRing"
    }
}

// =================================================================================================
// Quartic well: energy only, no analytic gradient
// =================================================================================================

/// U = c Σ_e |r_e|⁴
///
/// Leaves `element_gradient` at its default, so gradient requests fail with
/// `NotImplemented` and callers must fall back to finite differences.
pub struct QuarticWell {
    pub strength: f64,
    entity: Arc<dyn Entity>,
    resources: Arc<ResourceManager>,
}

impl QuarticWell {
    pub fn new(entity: Arc<dyn Entity>, resources: Arc<ResourceManager>, strength: f64) -> Self {
        Self {
            strength,
            entity,
            resources,
        }
    }
}

impl PotentialEnergySurface for QuarticWell {
    fn entity(&self) -> &Arc<dyn Entity> {
        &self.entity
    }

    fn resources(&self) -> &Arc<ResourceManager> {
        &self.resources
    }

    fn name(&self) -> &str {
        "QuarticWell"
    }

    fn evaluate_coordinates(&self, _q: &DVector<f64>, coordinates: &Positions) -> Result<f64> {
        Ok((0..coordinates.len())
            .map(|e| self.strength * coordinates.get(e).norm_squared().powi(2))
            .sum())
    }
}
