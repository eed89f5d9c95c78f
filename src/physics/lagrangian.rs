//! Lagrangian L = T − U

use crate::error::{Result, ResultExt};
use crate::physics::{KineticOperator, PotentialEnergySurface};
use nalgebra::DVector;
use std::sync::Arc;

/// Composition of a kinetic operator and a potential energy surface
///
/// Nothing is cached: every call re-evaluates T and U at the given state.
#[derive(Clone)]
pub struct Lagrangian {
    kinetic: Arc<KineticOperator>,
    potential: Arc<dyn PotentialEnergySurface>,
}

impl Lagrangian {
    pub fn new(kinetic: Arc<KineticOperator>, potential: Arc<dyn PotentialEnergySurface>) -> Self {
        Self { kinetic, potential }
    }

    pub fn kinetic(&self) -> &Arc<KineticOperator> {
        &self.kinetic
    }

    pub fn potential(&self) -> &Arc<dyn PotentialEnergySurface> {
        &self.potential
    }

    /// Number of degrees of freedom
    pub fn no_of_dofs(&self) -> usize {
        self.kinetic.no_of_dofs()
    }

    /// T(q, q̇)
    pub fn kinetic_energy(&self, q: &DVector<f64>, qp: &DVector<f64>) -> Result<f64> {
        self.kinetic.compute_kinetic_energy(q, qp)
    }

    /// U(q)
    pub fn potential_energy(&self, q: &DVector<f64>) -> Result<f64> {
        self.potential.evaluate(q)
    }

    /// L(q, q̇) = T − U
    pub fn lagrangian(&self, q: &DVector<f64>, qp: &DVector<f64>) -> Result<f64> {
        let t = self.kinetic_energy(q, qp).context("Lagrangian::lagrangian")?;
        let u = self.potential_energy(q).context("Lagrangian::lagrangian")?;
        Ok(t - u)
    }

    /// E(q, q̇) = T + U
    pub fn total_energy(&self, q: &DVector<f64>, qp: &DVector<f64>) -> Result<f64> {
        let t = self.kinetic_energy(q, qp).context("Lagrangian::total_energy")?;
        let u = self.potential_energy(q).context("Lagrangian::total_energy")?;
        Ok(t + u)
    }
}

impl std::fmt::Debug for Lagrangian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lagrangian")
            .field("kinetic", &self.kinetic)
            .field("potential", &self.potential.name())
            .finish()
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HarmonicAnchor, LinearEntity, UniformGravity};
    use crate::physics::{Entity, GeneralizedCoordinates};
    use crate::resources::ResourceManager;
    use approx::assert_relative_eq;

    fn harmonic(k: f64) -> Lagrangian {
        let resources = Arc::new(ResourceManager::new());
        let entity: Arc<dyn Entity> =
            Arc::new(LinearEntity::axis_aligned(DVector::from_vec(vec![1.0, 2.0])).unwrap());
        let coords = Arc::new(GeneralizedCoordinates::uniform(2, 0.0, -10.0, 10.0, 1e-6, 1e-3));
        let kinetic =
            Arc::new(KineticOperator::new(coords, Arc::clone(&entity), Arc::clone(&resources)).unwrap());
        let potential = Arc::new(HarmonicAnchor::at_rest(entity, resources, k).unwrap());
        Lagrangian::new(kinetic, potential)
    }

    #[test]
    fn test_lagrangian_is_kinetic_minus_potential() {
        let lagrangian = harmonic(3.0);
        let states = [
            (vec![0.0, 0.0], vec![0.0, 0.0]),
            (vec![0.5, -0.2], vec![1.0, 0.3]),
            (vec![-1.5, 2.0], vec![-0.7, 0.0]),
        ];

        for (q, qp) in states {
            let q = DVector::from_vec(q);
            let qp = DVector::from_vec(qp);
            let t = lagrangian.kinetic_energy(&q, &qp).unwrap();
            let u = lagrangian.potential_energy(&q).unwrap();
            assert_eq!(lagrangian.lagrangian(&q, &qp).unwrap(), t - u);
            assert_eq!(lagrangian.total_energy(&q, &qp).unwrap(), t + u);
        }
    }

    #[test]
    fn test_energies_of_harmonic_system() {
        let lagrangian = harmonic(4.0);
        let q = DVector::from_vec(vec![0.5, 0.0]);
        let qp = DVector::from_vec(vec![0.0, 1.0]);

        // T = ½·2·1², U = ½·4·0.5²
        assert_relative_eq!(lagrangian.kinetic_energy(&q, &qp).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(lagrangian.potential_energy(&q).unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(lagrangian.lagrangian(&q, &qp).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_errors_carry_context() {
        let resources = Arc::new(ResourceManager::new());
        let entity: Arc<dyn Entity> =
            Arc::new(LinearEntity::axis_aligned(DVector::from_vec(vec![1.0])).unwrap());
        let coords = Arc::new(GeneralizedCoordinates::uniform(1, 0.0, -1.0, 1.0, 1e-6, 1e-3));
        let kinetic =
            Arc::new(KineticOperator::new(coords, Arc::clone(&entity), Arc::clone(&resources)).unwrap());
        let potential = Arc::new(UniformGravity::new(entity, resources, 9.81));
        let lagrangian = Lagrangian::new(kinetic, potential);

        let err = lagrangian
            .lagrangian(&DVector::zeros(1), &DVector::zeros(3))
            .unwrap_err();
        assert!(err.is_dimension_mismatch());
        assert_eq!(err.contexts()[0], "Lagrangian::lagrangian");
    }
}
