//! Entity: the mapping from generalized coordinates to point masses
//!
//! An entity is an assembly of M point elements whose Cartesian positions
//! are functions of N generalized coordinates. The kinetic operator needs
//! its masses and Jacobian; potential energy surfaces need its coordinates.

use crate::error::{ensure_len, Result};
use crate::physics::{Axis, Positions};
use nalgebra::{DMatrix, DVector};

/// Assembly of point masses parameterized by generalized coordinates
///
/// # Contract
///
/// - `q.len() == no_of_dofs()` for every method taking `q`
/// - coordinate outputs hold `no_of_elements()` entries
/// - Jacobian outputs are `no_of_dofs() × no_of_elements()`, entry `(i, e)`
///   being ∂(axis coordinate of element e)/∂q_i
///
/// Only [`compute_coordinates`](Self::compute_coordinates) is mandatory; the
/// Jacobian defaults to central finite differences with step `dq`.
pub trait Entity: Send + Sync {
    /// Number of generalized coordinates N
    fn no_of_dofs(&self) -> usize;

    /// Number of point elements M
    fn no_of_elements(&self) -> usize;

    /// Mass of each element (length M)
    fn masses(&self) -> &DVector<f64>;

    /// Cartesian positions of every element at `q`
    fn compute_coordinates(&self, q: &DVector<f64>, out: &mut Positions) -> Result<()>;

    /// Per-axis Jacobians of the element positions at `q`
    fn compute_jacobian(
        &self,
        q: &DVector<f64>,
        dq: &DVector<f64>,
        jac_x: &mut DMatrix<f64>,
        jac_y: &mut DMatrix<f64>,
        jac_z: &mut DMatrix<f64>,
    ) -> Result<()> {
        finite_difference_jacobian(self, q, dq, jac_x, jac_y, jac_z)
    }

    /// Element displacements `coordinates(q + dq) - coordinates(q)`
    fn compute_displacements(
        &self,
        q: &DVector<f64>,
        dq: &DVector<f64>,
        out: &mut Positions,
    ) -> Result<()> {
        ensure_len("Entity::compute_displacements", q.len(), dq.len())?;

        let m = self.no_of_elements();
        let mut base = Positions::zeros(m);
        self.compute_coordinates(q, &mut base)?;
        self.compute_coordinates(&(q + dq), out)?;

        for axis in Axis::ALL {
            *out.axis_mut(axis) -= base.axis(axis);
        }
        Ok(())
    }

    /// Name of the entity (used for display and logging)
    fn name(&self) -> &str;
}

/// Check the shapes an entity method receives
pub fn check_entity_inputs<E: Entity + ?Sized>(
    entity: &E,
    operation: &str,
    q: &DVector<f64>,
    out: &Positions,
) -> Result<()> {
    ensure_len(operation, entity.no_of_dofs(), q.len())?;
    ensure_len(operation, entity.no_of_elements(), out.len())
}

/// Check the shapes of the three Jacobian buffers
pub fn check_jacobian_shapes<E: Entity + ?Sized>(
    entity: &E,
    operation: &str,
    q: &DVector<f64>,
    dq: &DVector<f64>,
    jacobians: [&DMatrix<f64>; 3],
) -> Result<()> {
    let n = entity.no_of_dofs();
    let m = entity.no_of_elements();
    ensure_len(operation, n, q.len())?;
    ensure_len(operation, n, dq.len())?;
    for jac in jacobians {
        ensure_len(operation, n, jac.nrows())?;
        ensure_len(operation, m, jac.ncols())?;
    }
    Ok(())
}

/// Central finite-difference Jacobian of `compute_coordinates`
///
/// Row i is `(r(q + dq_i e_i) - r(q - dq_i e_i)) / (2 dq_i)` for each axis.
pub fn finite_difference_jacobian<E: Entity + ?Sized>(
    entity: &E,
    q: &DVector<f64>,
    dq: &DVector<f64>,
    jac_x: &mut DMatrix<f64>,
    jac_y: &mut DMatrix<f64>,
    jac_z: &mut DMatrix<f64>,
) -> Result<()> {
    check_jacobian_shapes(entity, "Entity::compute_jacobian", q, dq, [&*jac_x, &*jac_y, &*jac_z])?;

    let m = entity.no_of_elements();
    let mut plus = Positions::zeros(m);
    let mut minus = Positions::zeros(m);
    let mut shifted = q.clone();

    for i in 0..q.len() {
        let h = dq[i];

        shifted[i] = q[i] + h;
        entity.compute_coordinates(&shifted, &mut plus)?;
        shifted[i] = q[i] - h;
        entity.compute_coordinates(&shifted, &mut minus)?;
        shifted[i] = q[i];

        for (axis, jac) in [(Axis::X, &mut *jac_x), (Axis::Y, &mut *jac_y), (Axis::Z, &mut *jac_z)] {
            let p = plus.axis(axis);
            let n = minus.axis(axis);
            for e in 0..m {
                jac[(i, e)] = (p[e] - n[e]) / (2.0 * h);
            }
        }
    }
    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    /// One element on a circle of radius 2 in the xy plane, q = angle
    struct Circle {
        masses: DVector<f64>,
    }

    impl Entity for Circle {
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
            check_entity_inputs(self, "Circle::compute_coordinates", q, out)?;
            out.set(0, Vector3::new(2.0 * q[0].cos(), 2.0 * q[0].sin(), 0.0));
            Ok(())
        }

        fn name(&self) -> &str {
            "Circle"
        }
    }

    fn circle() -> Circle {
        Circle {
            masses: DVector::from_element(1, 1.0),
        }
    }

    #[test]
    fn test_default_jacobian_matches_analytic() {
        let entity = circle();
        let q = DVector::from_element(1, 0.3);
        let dq = DVector::from_element(1, 1e-6);
        let mut jx = DMatrix::zeros(1, 1);
        let mut jy = DMatrix::zeros(1, 1);
        let mut jz = DMatrix::zeros(1, 1);

        entity.compute_jacobian(&q, &dq, &mut jx, &mut jy, &mut jz).unwrap();

        assert_relative_eq!(jx[(0, 0)], -2.0 * 0.3_f64.sin(), epsilon = 1e-8);
        assert_relative_eq!(jy[(0, 0)], 2.0 * 0.3_f64.cos(), epsilon = 1e-8);
        assert_relative_eq!(jz[(0, 0)], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_jacobian_shape_is_checked() {
        let entity = circle();
        let q = DVector::from_element(1, 0.0);
        let dq = DVector::from_element(1, 1e-6);
        let mut jx = DMatrix::zeros(2, 1);
        let mut jy = DMatrix::zeros(1, 1);
        let mut jz = DMatrix::zeros(1, 1);

        let err = entity.compute_jacobian(&q, &dq, &mut jx, &mut jy, &mut jz).unwrap_err();
        assert!(err.is_dimension_mismatch());
    }

    #[test]
    fn test_displacements() {
        let entity = circle();
        let q = DVector::from_element(1, 0.0);
        let dq = DVector::from_element(1, std::f64::consts::FRAC_PI_2);
        let mut out = Positions::zeros(1);

        entity.compute_displacements(&q, &dq, &mut out).unwrap();

        assert_relative_eq!(out.get(0).x, -2.0, epsilon = 1e-12);
        assert_relative_eq!(out.get(0).y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_wrong_q_length() {
        let entity = circle();
        let mut out = Positions::zeros(1);
        let err = entity
            .compute_coordinates(&DVector::zeros(2), &mut out)
            .unwrap_err();
        assert!(err.is_dimension_mismatch());
    }
}
