//! Uniform gravitational field along −z
//!
//! ```text
//! U = g Σ_e m_e z_e
//! ```

use crate::error::{ensure_len, Result};
use crate::physics::{check_entity_inputs, Axis, Entity, PotentialEnergySurface, Positions};
use crate::resources::ResourceManager;
use nalgebra::DVector;
use std::sync::Arc;

/// Standard gravity [m/s²]
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Gravity of strength `g` pulling every element toward −z
#[derive(Clone)]
pub struct UniformGravity {
    entity: Arc<dyn Entity>,
    resources: Arc<ResourceManager>,
    g: f64,
}

impl UniformGravity {
    pub fn new(entity: Arc<dyn Entity>, resources: Arc<ResourceManager>, g: f64) -> Self {
        Self {
            entity,
            resources,
            g,
        }
    }

    /// Field strength
    pub fn g(&self) -> f64 {
        self.g
    }
}

impl PotentialEnergySurface for UniformGravity {
    fn entity(&self) -> &Arc<dyn Entity> {
        &self.entity
    }

    fn resources(&self) -> &Arc<ResourceManager> {
        &self.resources
    }

    fn name(&self) -> &str {
        "UniformGravity"
    }

    fn evaluate_coordinates(&self, q: &DVector<f64>, coordinates: &Positions) -> Result<f64> {
        check_entity_inputs(self.entity.as_ref(), "UniformGravity::evaluate_coordinates", q, coordinates)?;
        Ok(self.g * self.entity.masses().dot(coordinates.axis(Axis::Z)))
    }

    fn element_gradient(
        &self,
        q: &DVector<f64>,
        coordinates: &Positions,
        out: &mut Positions,
    ) -> Result<()> {
        check_entity_inputs(self.entity.as_ref(), "UniformGravity::element_gradient", q, coordinates)?;
        ensure_len("UniformGravity::element_gradient", coordinates.len(), out.len())?;

        out.fill_zero();
        out.axis_mut(Axis::Z).copy_from(self.entity.masses());
        *out.axis_mut(Axis::Z) *= self.g;
        Ok(())
    }
}
