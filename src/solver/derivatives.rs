//! Finite-difference derivatives of the Lagrangian
//!
//! The Euler-Lagrange system needs first and second derivatives of L with
//! respect to q and q̇. They are computed by central differences with two
//! step vectors:
//!
//! - `epsilon` perturbs q (the coordinates' `dqs`)
//! - `epsilonp` perturbs q̇ (the coordinates' `dqps`)
//!
//! ```text
//! ∂L/∂q_i          ≈ [L(q + ε_i) − L(q − ε_i)] / 2ε_i
//! ∂²L/∂q̇_i∂q̇_j     ≈ [L(++) − L(+−) − L(−+) + L(−−)] / 4ε'_i ε'_j
//! ∂²L/∂q_i∂q̇_j     ≈ [L(++) − L(+−) − L(−+) + L(−−)] / 4ε_i ε'_j
//! ```
//!
//! For i = j the mixed stencil shifts the same entry twice, which yields the
//! standard three-point second derivative with step 2ε'_i.
//!
//! Perturbed entries are restored from a saved copy, never by subtracting the
//! step back, so q and q̇ are bit-identical after every call, including calls
//! that fail.

use crate::error::Result;
use crate::physics::Lagrangian;
use nalgebra::DVector;

/// Central-difference evaluator bound to a Lagrangian and its two step vectors
#[derive(Debug, Clone, Copy)]
pub struct FiniteDifferences<'a> {
    lagrangian: &'a Lagrangian,
    epsilon: &'a DVector<f64>,
    epsilonp: &'a DVector<f64>,
}

impl<'a> FiniteDifferences<'a> {
    pub fn new(lagrangian: &'a Lagrangian, epsilon: &'a DVector<f64>, epsilonp: &'a DVector<f64>) -> Self {
        Self {
            lagrangian,
            epsilon,
            epsilonp,
        }
    }

    /// ∂L/∂q_i
    pub fn diffq(&self, i: usize, q: &mut DVector<f64>, qp: &DVector<f64>) -> Result<f64> {
        let h = self.epsilon[i];
        let saved = q[i];

        q[i] = saved + h;
        let upper = self.lagrangian.lagrangian(q, qp);
        q[i] = saved - h;
        let lower = self.lagrangian.lagrangian(q, qp);
        q[i] = saved;

        Ok((upper? - lower?) / (2.0 * h))
    }

    /// ∂²L/∂q̇_i∂q̇_j
    pub fn diffpp(&self, i: usize, j: usize, q: &DVector<f64>, qp: &mut DVector<f64>) -> Result<f64> {
        let (hi, hj) = (self.epsilonp[i], self.epsilonp[j]);
        let (saved_i, saved_j) = (qp[i], qp[j]);

        let mut at = |si: f64, sj: f64| {
            qp[i] = saved_i + si * hi;
            qp[j] += sj * hj;
            let value = self.lagrangian.lagrangian(q, qp);
            qp[j] = saved_j;
            qp[i] = saved_i;
            value
        };

        let l11 = at(1.0, 1.0);
        let l10 = at(1.0, -1.0);
        let l01 = at(-1.0, 1.0);
        let l00 = at(-1.0, -1.0);

        Ok((l11? - l10? - l01? + l00?) / (4.0 * hi * hj))
    }

    /// ∂²L/∂q_i∂q̇_j
    pub fn diffqp(
        &self,
        i: usize,
        j: usize,
        q: &mut DVector<f64>,
        qp: &mut DVector<f64>,
    ) -> Result<f64> {
        let (hi, hj) = (self.epsilon[i], self.epsilonp[j]);
        let (saved_q, saved_qp) = (q[i], qp[j]);

        let mut at = |si: f64, sj: f64| {
            q[i] = saved_q + si * hi;
            qp[j] = saved_qp + sj * hj;
            let value = self.lagrangian.lagrangian(q, qp);
            qp[j] = saved_qp;
            q[i] = saved_q;
            value
        };

        let l11 = at(1.0, 1.0);
        let l10 = at(1.0, -1.0);
        let l01 = at(-1.0, 1.0);
        let l00 = at(-1.0, -1.0);

        Ok((l11? - l10? - l01? + l00?) / (4.0 * hi * hj))
    }
}

// =================================================================================================
// Tests
// =================================================================================================
