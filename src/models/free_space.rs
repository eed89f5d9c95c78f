//! Zero potential

use crate::error::{ensure_len, Result};
use crate::physics::{check_entity_inputs, Entity, PotentialEnergySurface, Positions};
use crate::resources::ResourceManager;
use nalgebra::DVector;
use std::sync::Arc;

/// Surface with U ≡ 0: elements move freely
#[derive(Clone)]
pub struct FreeSpace {
    entity: Arc<dyn Entity>,
    resources: Arc<ResourceManager>,
}

impl FreeSpace {
    pub fn new(entity: Arc<dyn Entity>, resources: Arc<ResourceManager>) -> Self {
        Self { entity, resources }
    }
}

impl PotentialEnergySurface for FreeSpace {
    fn entity(&self) -> &Arc<dyn Entity> {
        &self.entity
    }

    fn resources(&self) -> &Arc<ResourceManager> {
        &self.resources
    }

    fn name(&self) -> &str {
        "FreeSpace"
    }

    fn evaluate_coordinates(&self, q: &DVector<f64>, coordinates: &Positions) -> Result<f64> {
        check_entity_inputs(self.entity.as_ref(), "FreeSpace::evaluate_coordinates", q, coordinates)?;
        Ok(0.0)
    }

    fn element_gradient(
        &self,
        q: &DVector<f64>,
        coordinates: &Positions,
        out: &mut Positions,
    ) -> Result<()> {
        check_entity_inputs(self.entity.as_ref(), "FreeSpace::element_gradient", q, coordinates)?;
        ensure_len("FreeSpace::element_gradient", coordinates.len(), out.len())?;
        out.fill_zero();
        Ok(())
    }
}
