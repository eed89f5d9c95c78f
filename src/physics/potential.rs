//! Potential energy surfaces
//!
//! A surface evaluates U from the Cartesian coordinates of an entity. Concrete
//! surfaces only implement the coordinate-based evaluator; the q-based
//! [`evaluate`](PotentialEnergySurface::evaluate) is provided: it derives the
//! coordinates through the entity, checks their count and dispatches.
//!
//! # Gradient extension
//!
//! ∂U/∂q is optional. Surfaces that know their Cartesian gradient override
//! [`element_gradient`](PotentialEnergySurface::element_gradient); the
//! provided [`gradient`](PotentialEnergySurface::gradient) then applies the
//! chain rule through the entity's Jacobian. The integrator never needs it.

use crate::error::{ensure_len, MechanicsError, Result, ResultExt};
use crate::physics::{Axis, Entity, Positions};
use crate::resources::ResourceManager;
use nalgebra::{DMatrix, DVector};
use std::sync::Arc;

/// Surface of potential energy over an entity's configurations
pub trait PotentialEnergySurface: Send + Sync {
    /// Entity whose coordinates the surface reads
    fn entity(&self) -> &Arc<dyn Entity>;

    /// Buffer pool for coordinate scratch space
    fn resources(&self) -> &Arc<ResourceManager>;

    /// Name of the surface (used for display and errors)
    fn name(&self) -> &str;

    /// Potential energy at `q`, given the matching element coordinates
    fn evaluate_coordinates(&self, q: &DVector<f64>, coordinates: &Positions) -> Result<f64>;

    /// Potential energy at `q`
    ///
    /// # Errors
    ///
    /// `Logic` when the entity produces a coordinate count different from
    /// its element count; entity failures are propagated with context.
    fn evaluate(&self, q: &DVector<f64>) -> Result<f64> {
        let entity = self.entity();
        let m = entity.no_of_elements();

        let mut coordinates = self.resources().request_positions(m);
        entity
            .compute_coordinates(q, &mut coordinates)
            .context("PotentialEnergySurface::evaluate")?;

        if coordinates.len() != m {
            return Err(MechanicsError::logic(format!(
                "entity '{}' produced {} coordinates for {} elements (surface '{}')",
                entity.name(),
                coordinates.len(),
                m,
                self.name()
            )));
        }

        self.evaluate_coordinates(q, &coordinates)
    }

    /// Cartesian gradient ∂U/∂r of every element, written into `out`
    fn element_gradient(
        &self,
        _q: &DVector<f64>,
        _coordinates: &Positions,
        _out: &mut Positions,
    ) -> Result<()> {
        Err(MechanicsError::not_implemented("element_gradient", self.name()))
    }

    /// Generalized gradient ∂U/∂q_i = Σ_axis Σ_e J_axis(i, e) ∂U/∂r_axis(e)
    fn gradient(&self, q: &DVector<f64>, dq: &DVector<f64>, out: &mut DVector<f64>) -> Result<()> {
        const OP: &str = "PotentialEnergySurface::gradient";

        let entity = self.entity();
        let n = entity.no_of_dofs();
        let m = entity.no_of_elements();
        ensure_len(OP, n, out.len())?;

        let resources = self.resources();
        let mut coordinates = resources.request_positions(m);
        entity.compute_coordinates(q, &mut coordinates).context(OP)?;

        let mut forces = resources.request_positions(m);
        self.element_gradient(q, &coordinates, &mut forces).context(OP)?;

        let mut jac_x = resources.request_matrix(n, m);
        let mut jac_y = resources.request_matrix(n, m);
        let mut jac_z = resources.request_matrix(n, m);
        entity
            .compute_jacobian(q, dq, &mut jac_x, &mut jac_y, &mut jac_z)
            .context(OP)?;

        out.fill(0.0);
        let jacobians: [(Axis, &DMatrix<f64>); 3] =
            [(Axis::X, &*jac_x), (Axis::Y, &*jac_y), (Axis::Z, &*jac_z)];
        for (axis, jac) in jacobians {
            out.gemv(1.0, jac, forces.axis(axis), 1.0);
        }
        Ok(())
    }
}

/// Central finite-difference ∂U/∂q, for checking analytic gradients
pub fn numerical_gradient(
    surface: &dyn PotentialEnergySurface,
    q: &DVector<f64>,
    dq: &DVector<f64>,
) -> Result<DVector<f64>> {
    ensure_len("numerical_gradient", q.len(), dq.len())?;

    let mut shifted = q.clone();
    let mut grad = DVector::zeros(q.len());
    for i in 0..q.len() {
        shifted[i] = q[i] + dq[i];
        let up = surface.evaluate(&shifted)?;
        shifted[i] = q[i] - dq[i];
        let down = surface.evaluate(&shifted)?;
        shifted[i] = q[i];
        grad[i] = (up - down) / (2.0 * dq[i]);
    }
    Ok(grad)
}

// =================================================================================================
// Tests
// =================================================================================================
