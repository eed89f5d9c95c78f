//! Harmonic springs tying every element to an anchor point
//!
//! ```text
//! U = ½ k Σ_e |r_e − a_e|²
//! ∂U/∂r_e = k (r_e − a_e)
//! ```

use crate::error::{ensure_len, MechanicsError, Result, ResultExt};
use crate::physics::{check_entity_inputs, Axis, Entity, PotentialEnergySurface, Positions};
use crate::resources::ResourceManager;
use nalgebra::DVector;
use std::sync::Arc;

/// Isotropic springs of stiffness `k` between each element and its anchor
#[derive(Clone)]
pub struct HarmonicAnchor {
    entity: Arc<dyn Entity>,
    resources: Arc<ResourceManager>,
    stiffness: f64,
    anchors: Positions,
}

impl HarmonicAnchor {
    /// Create with explicit anchor points
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` when `stiffness` is negative or not finite
    /// - `DimensionMismatch` when there is not one anchor per element
    pub fn new(
        entity: Arc<dyn Entity>,
        resources: Arc<ResourceManager>,
        stiffness: f64,
        anchors: Positions,
    ) -> Result<Self> {
        if !(stiffness.is_finite() && stiffness >= 0.0) {
            return Err(MechanicsError::invalid_config(format!(
                "spring stiffness must be finite and non-negative, got {}",
                stiffness
            )));
        }
        ensure_len("HarmonicAnchor::new", entity.no_of_elements(), anchors.len())?;

        Ok(Self {
            entity,
            resources,
            stiffness,
            anchors,
        })
    }

    /// Anchor every element where it sits at q = 0
    pub fn at_rest(
        entity: Arc<dyn Entity>,
        resources: Arc<ResourceManager>,
        stiffness: f64,
    ) -> Result<Self> {
        let mut anchors = Positions::zeros(entity.no_of_elements());
        entity
            .compute_coordinates(&DVector::zeros(entity.no_of_dofs()), &mut anchors)
            .context("HarmonicAnchor::at_rest")?;
        Self::new(entity, resources, stiffness, anchors)
    }

    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    pub fn anchors(&self) -> &Positions {
        &self.anchors
    }
}

impl PotentialEnergySurface for HarmonicAnchor {
    fn entity(&self) -> &Arc<dyn Entity> {
        &self.entity
    }

    fn resources(&self) -> &Arc<ResourceManager> {
        &self.resources
    }

    fn name(&self) -> &str {
        "HarmonicAnchor"
    }

    fn evaluate_coordinates(&self, q: &DVector<f64>, coordinates: &Positions) -> Result<f64> {
        check_entity_inputs(self.entity.as_ref(), "HarmonicAnchor::evaluate_coordinates", q, coordinates)?;

        let stretch: f64 = Axis::ALL
            .iter()
            .map(|&axis| (coordinates.axis(axis) - self.anchors.axis(axis)).norm_squared())
            .sum();
        Ok(0.5 * self.stiffness * stretch)
    }

    fn element_gradient(
        &self,
        q: &DVector<f64>,
        coordinates: &Positions,
        out: &mut Positions,
    ) -> Result<()> {
        check_entity_inputs(self.entity.as_ref(), "HarmonicAnchor::element_gradient", q, coordinates)?;
        ensure_len("HarmonicAnchor::element_gradient", coordinates.len(), out.len())?;

        for axis in Axis::ALL {
            let target = out.axis_mut(axis);
            target.copy_from(coordinates.axis(axis));
            *target -= self.anchors.axis(axis);
            *target *= self.stiffness;
        }
        Ok(())
    }
}

impl std::fmt::Debug for HarmonicAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarmonicAnchor")
            .field("entity", &self.entity.name())
            .field("stiffness", &self.stiffness)
            .field("anchors", &self.anchors)
            .finish()
    }
}
