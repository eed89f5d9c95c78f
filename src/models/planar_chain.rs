//! Planar chain of rigid links (N-pendulum)
//!
//! # Geometry
//!
//! Link i has length l_i and carries mass m_i at its tip. The generalized
//! coordinates are the absolute link angles θ_i measured from the downward
//! vertical, and the chain swings in the xz plane with its pivot at the origin:
//!
//! ```text
//! x_k =  Σ_{i≤k} l_i sin θ_i
//! z_k = −Σ_{i≤k} l_i cos θ_i
//! ```
//!
//! # Jacobian
//!
//! For i ≤ k: ∂x_k/∂θ_i = l_i cos θ_i and ∂z_k/∂θ_i = l_i sin θ_i, zero
//! otherwise. The resulting mass matrix is
//!
//! ```text
//! K_rc = Σ_{k ≥ max(r,c)} m_k l_r l_c cos(θ_r − θ_c)
//! ```

use crate::error::{ensure_len, MechanicsError, Result};
use crate::physics::{check_entity_inputs, check_jacobian_shapes, Entity, Positions};
use nalgebra::{DMatrix, DVector, Vector3};

/// Chain of point masses joined by massless rigid links
#[derive(Debug, Clone)]
pub struct PlanarChain {
    masses: DVector<f64>,
    lengths: DVector<f64>,
}

impl PlanarChain {
    /// Create a chain from per-link tip masses and lengths
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` when `masses` and `lengths` differ in length
    /// - `InvalidConfig` when the chain is empty or a length is not positive
    pub fn new(masses: DVector<f64>, lengths: DVector<f64>) -> Result<Self> {
        ensure_len("PlanarChain::new", masses.len(), lengths.len())?;

        if masses.is_empty() {
            return Err(MechanicsError::invalid_config("PlanarChain needs at least one link"));
        }
        if let Some(l) = lengths.iter().find(|l| !(l.is_finite() && **l > 0.0)) {
            return Err(MechanicsError::invalid_config(format!(
                "link lengths must be positive, got {}",
                l
            )));
        }

        Ok(Self { masses, lengths })
    }

    pub fn lengths(&self) -> &DVector<f64> {
        &self.lengths
    }

    /// Closed-form mass matrix at `q`
    pub fn mass_matrix(&self, q: &DVector<f64>) -> Result<DMatrix<f64>> {
        let n = self.masses.len();
        ensure_len("PlanarChain::mass_matrix", n, q.len())?;

        // tail[k] = Σ_{j ≥ k} m_j
        let mut tail = vec![0.0; n + 1];
        for k in (0..n).rev() {
            tail[k] = tail[k + 1] + self.masses[k];
        }

        Ok(DMatrix::from_fn(n, n, |r, c| {
            tail[r.max(c)] * self.lengths[r] * self.lengths[c] * (q[r] - q[c]).cos()
        }))
    }
}

impl Entity for PlanarChain {
    fn no_of_dofs(&self) -> usize {
        self.lengths.len()
    }

    fn no_of_elements(&self) -> usize {
        self.masses.len()
    }

    fn masses(&self) -> &DVector<f64> {
        &self.masses
    }

    fn compute_coordinates(&self, q: &DVector<f64>, out: &mut Positions) -> Result<()> {
        check_entity_inputs(self, "PlanarChain::compute_coordinates", q, out)?;

        let mut tip = Vector3::zeros();
        for (k, (&theta, &l)) in q.iter().zip(self.lengths.iter()).enumerate() {
            tip.x += l * theta.sin();
            tip.z -= l * theta.cos();
            out.set(k, tip);
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
            "PlanarChain::compute_jacobian",
            q,
            dq,
            [&*jac_x, &*jac_y, &*jac_z],
        )?;

        let n = self.no_of_dofs();
        jac_x.fill(0.0);
        jac_y.fill(0.0);
        jac_z.fill(0.0);

        for i in 0..n {
            let (sin, cos) = q[i].sin_cos();
            let l = self.lengths[i];
            // Link i moves every element from i outward
            for k in i..n {
                jac_x[(i, k)] = l * cos;
                jac_z[(i, k)] = l * sin;
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "PlanarChain"
    }
}

// =================================================================================================
// Tests
// =================================================================================================
