//! Entity with a constant Jacobian
//!
//! Element positions are an affine function of the generalized coordinates:
//!
//! ```text
//! r_axis(e) = origin_axis(e) + Σ_i J_axis(i, e) · q_i
//! ```
//!
//! The kinetic matrix is therefore constant, which makes this entity the
//! reference case for harmonic systems and for checking the integrator
//! against closed-form solutions.

use crate::error::{ensure_len, MechanicsError, Result};
use crate::physics::{check_entity_inputs, check_jacobian_shapes, Axis, Entity, Positions};
use nalgebra::{DMatrix, DVector};

/// Point masses moving along fixed directions
#[derive(Debug, Clone)]
pub struct LinearEntity {
    masses: DVector<f64>,
    origin: Positions,
    jac_x: DMatrix<f64>,
    jac_y: DMatrix<f64>,
    jac_z: DMatrix<f64>,
}

impl LinearEntity {
    /// Create from explicit N×M Jacobians and element origins
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when the Jacobians disagree in shape or do not have
    /// one column per mass, or when `origin` does not hold one point per mass.
    pub fn new(
        masses: DVector<f64>,
        origin: Positions,
        jac_x: DMatrix<f64>,
        jac_y: DMatrix<f64>,
        jac_z: DMatrix<f64>,
    ) -> Result<Self> {
        let m = masses.len();
        let n = jac_x.nrows();
        ensure_len("LinearEntity::new (origin)", m, origin.len())?;
        for jac in [&jac_x, &jac_y, &jac_z] {
            ensure_len("LinearEntity::new (jacobian rows)", n, jac.nrows())?;
            ensure_len("LinearEntity::new (jacobian columns)", m, jac.ncols())?;
        }

        Ok(Self {
            masses,
            origin,
            jac_x,
            jac_y,
            jac_z,
        })
    }

    /// One coordinate per mass, each moving its element along x from the origin
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when `masses` is empty.
    pub fn axis_aligned(masses: DVector<f64>) -> Result<Self> {
        let m = masses.len();
        if m == 0 {
            return Err(MechanicsError::invalid_config(
                "LinearEntity needs at least one element",
            ));
        }

        Self::new(
            masses,
            Positions::zeros(m),
            DMatrix::identity(m, m),
            DMatrix::zeros(m, m),
            DMatrix::zeros(m, m),
        )
    }

    fn jacobian(&self, axis: Axis) -> &DMatrix<f64> {
        match axis {
            Axis::X => &self.jac_x,
            Axis::Y => &self.jac_y,
            Axis::Z => &self.jac_z,
        }
    }
}

impl Entity for LinearEntity {
    fn no_of_dofs(&self) -> usize {
        self.jac_x.nrows()
    }

    fn no_of_elements(&self) -> usize {
        self.masses.len()
    }

    fn masses(&self) -> &DVector<f64> {
        &self.masses
    }

    fn compute_coordinates(&self, q: &DVector<f64>, out: &mut Positions) -> Result<()> {
        check_entity_inputs(self, "LinearEntity::compute_coordinates", q, out)?;

        for axis in Axis::ALL {
            let target = out.axis_mut(axis);
            target.copy_from(self.origin.axis(axis));
            target.gemv_tr(1.0, self.jacobian(axis), q, 1.0);
        }
        Ok(())
    }

    fn compute_jacobian(
        &self,
        q: &DVector<f64>,
        dq: &DVector<f64>,
        jac_x: &mut DMatrix<f64>,
        jac_y: &mut DMatrix<f64>,
        jac_z: &mut DMatrix<f64>,
    ) -> Result<()> {
        check_jacobian_shapes(
            self,
            "LinearEntity::compute_jacobian",
            q,
            dq,
            [&*jac_x, &*jac_y, &*jac_z],
        )?;

        jac_x.copy_from(&self.jac_x);
        jac_y.copy_from(&self.jac_y);
        jac_z.copy_from(&self.jac_z);
        Ok(())
    }

    fn name(&self) -> &str {
        "LinearEntity"
    }
}

// =================================================================================================
// Tests
// =================================================================================================
