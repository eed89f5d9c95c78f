//! Helper functions for integration tests

use lagrange_rs::models::{HarmonicAnchor, LinearEntity, PlanarChain, UniformGravity};
use lagrange_rs::physics::{
    Entity, GeneralizedCoordinates, KineticOperator, Lagrangian, PotentialEnergySurface,
};
use lagrange_rs::resources::ResourceManager;
use lagrange_rs::solver::Scenario;
use nalgebra::DVector;
use std::sync::Arc;

/// Finite-difference steps used throughout the integration tests
pub const DQ: f64 = 1e-5;
pub const DQP: f64 = 1e-3;

/// Everything a test needs to inspect after building a Lagrangian
pub struct System {
    pub resources: Arc<ResourceManager>,
    pub entity: Arc<dyn Entity>,
    pub coordinates: Arc<GeneralizedCoordinates>,
    pub lagrangian: Lagrangian,
}

impl System {
    /// Wire an entity and a surface constructor into a Lagrangian
    pub fn build<F>(entity: Arc<dyn Entity>, q0: &[f64], surface: F) -> Self
    where
        F: FnOnce(Arc<dyn Entity>, Arc<ResourceManager>) -> Arc<dyn PotentialEnergySurface>,
    {
        let resources = Arc::new(ResourceManager::new());
        let coordinates = Arc::new(
            GeneralizedCoordinates::unbounded(DVector::from_row_slice(q0), DQ, DQP).unwrap(),
        );
        let kinetic = Arc::new(
            KineticOperator::new(
                Arc::clone(&coordinates),
                Arc::clone(&entity),
                Arc::clone(&resources),
            )
            .unwrap(),
        );
        let potential = surface(Arc::clone(&entity), Arc::clone(&resources));

        Self {
            resources,
            entity,
            coordinates,
            lagrangian: Lagrangian::new(kinetic, potential),
        }
    }

    pub fn scenario(&self, qp0: &[f64]) -> Scenario {
        Scenario::new(
            self.lagrangian.clone(),
            Arc::clone(&self.coordinates),
            DVector::from_row_slice(qp0),
        )
        .unwrap()
    }
}

/// Independent oscillators: masses `masses`, common stiffness `k`, at rest at q = 0
pub fn harmonic_system(masses: &[f64], k: f64, q0: &[f64]) -> System {
    let entity: Arc<dyn Entity> =
        Arc::new(LinearEntity::axis_aligned(DVector::from_row_slice(masses)).unwrap());
    System::build(entity, q0, |entity, resources| {
        Arc::new(HarmonicAnchor::at_rest(entity, resources, k).unwrap())
    })
}

/// Double pendulum under gravity g
pub fn double_pendulum(masses: [f64; 2], lengths: [f64; 2], g: f64, q0: [f64; 2]) -> System {
    planar_chain(&masses, &lengths, g, &q0)
}

/// Hanging chain of point masses under gravity g, one angle per link
pub fn planar_chain(masses: &[f64], lengths: &[f64], g: f64, q0: &[f64]) -> System {
    let entity: Arc<dyn Entity> = Arc::new(
        PlanarChain::new(
            DVector::from_row_slice(masses),
            DVector::from_row_slice(lengths),
        )
        .unwrap(),
    );
    System::build(entity, q0, |entity, resources| {
        Arc::new(UniformGravity::new(entity, resources, g))
    })
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}
