//! Lennard-Jones pair force field
//!
//! # Potential
//!
//! Every pair of distinct elements closer than the cutoff interacts through
//! the 12-6 Lennard-Jones potential:
//!
//! ```text
//! V(r) = 4ε [ (σ/r)¹² − (σ/r)⁶ ]          r < r_c
//! V(r) = 0                                 r ≥ r_c
//! U    = Σ_{i<j} V(|r_i − r_j|)
//! ```
//!
//! Each pair is counted once. The potential is truncated, not shifted, so U
//! jumps by V(r_c) when a pair crosses the cutoff. Coincident elements
//! (r = 0) are a `Logic` error for both the energy and its gradient.
//!
//! # Defaults
//!
//! ε = 1.08e-21 J, σ = 0.32e-9 m and r_c = 1e-9 m (argon-like atoms).
//!
//! # Performance
//!
//! The row kernel (all partners j of element i) is shared between a
//! sequential loop and a rayon `par_iter`. The parallel path is taken when the
//! crate is built with the `parallel` feature and the element count exceeds
//! [`parallel_threshold()`](crate::solver::parallel_threshold).

use crate::error::{ensure_len, MechanicsError, Result};
use crate::physics::{check_entity_inputs, Entity, PotentialEnergySurface, Positions};
use crate::resources::ResourceManager;
use nalgebra::{DVector, Vector3};
use std::sync::Arc;

/// Lennard-Jones parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LennardJones {
    /// Well depth ε [J]
    pub epsilon: f64,
    /// Zero-crossing distance σ [m]
    pub sigma: f64,
    /// Interaction cutoff r_c [m]
    pub cutoff: f64,
}

impl Default for LennardJones {
    fn default() -> Self {
        Self {
            epsilon: 1.08e-21,
            sigma: 0.32e-9,
            cutoff: 1e-9,
        }
    }
}

impl LennardJones {
    /// Check that every parameter is finite and strictly positive
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("epsilon", self.epsilon), ("sigma", self.sigma), ("cutoff", self.cutoff)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(MechanicsError::invalid_config(format!(
                    "Lennard-Jones {} must be finite and positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Pair energy V(r)
    #[inline]
    pub fn energy(&self, r: f64) -> f64 {
        if r >= self.cutoff {
            return 0.0;
        }
        let s6 = (self.sigma / r).powi(6);
        4.0 * self.epsilon * (s6 * s6 - s6)
    }

    /// Radial derivative dV/dr
    #[inline]
    pub fn derivative(&self, r: f64) -> f64 {
        if r >= self.cutoff {
            return 0.0;
        }
        let s6 = (self.sigma / r).powi(6);
        -24.0 * self.epsilon * (2.0 * s6 * s6 - s6) / r
    }

    /// Separation of the potential minimum, 2^(1/6) σ
    pub fn equilibrium_distance(&self) -> f64 {
        2f64.powf(1.0 / 6.0) * self.sigma
    }
}

/// Truncated Lennard-Jones interaction between all elements of an entity
#[derive(Clone)]
pub struct PairForceField {
    entity: Arc<dyn Entity>,
    resources: Arc<ResourceManager>,
    parameters: LennardJones,
}

impl PairForceField {
    /// Create with the default argon-like parameters
    pub fn new(entity: Arc<dyn Entity>, resources: Arc<ResourceManager>) -> Self {
        Self {
            entity,
            resources,
            parameters: LennardJones::default(),
        }
    }

    /// Create with explicit parameters
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when a parameter is not finite and positive.
    pub fn with_parameters(
        entity: Arc<dyn Entity>,
        resources: Arc<ResourceManager>,
        parameters: LennardJones,
    ) -> Result<Self> {
        parameters.validate()?;
        Ok(Self {
            entity,
            resources,
            parameters,
        })
    }

    pub fn parameters(&self) -> &LennardJones {
        &self.parameters
    }

    /// |r_i − r_j|, rejecting coincident elements
    fn separation(coordinates: &Positions, i: usize, j: usize) -> Result<f64> {
        let r = coordinates.distance(i, j);
        if r == 0.0 {
            return Err(MechanicsError::logic(format!("coincident elements {} and {}", i, j)));
        }
        Ok(r)
    }

    /// Run `row` over every element index, in parallel above the threshold
    fn map_rows<T, F>(&self, m: usize, row: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        if m > crate::solver::parallel_threshold() {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                return (0..m).into_par_iter().map(row).collect();
            }
        }
        (0..m).map(row).collect()
    }
}

impl PotentialEnergySurface for PairForceField {
    fn entity(&self) -> &Arc<dyn Entity> {
        &self.entity
    }

    fn resources(&self) -> &Arc<ResourceManager> {
        &self.resources
    }

    fn name(&self) -> &str {
        "PairForceField"
    }

    fn evaluate_coordinates(&self, q: &DVector<f64>, coordinates: &Positions) -> Result<f64> {
        check_entity_inputs(self.entity.as_ref(), "PairForceField::evaluate_coordinates", q, coordinates)?;

        let m = coordinates.len();
        let lj = self.parameters;

        // Row i only sums partners j > i so each pair appears once
        let rows = self.map_rows(m, |i| {
            (i + 1..m)
                .map(|j| -> Result<f64> { Ok(lj.energy(Self::separation(coordinates, i, j)?)) })
                .sum::<Result<f64>>()
        });
        rows.into_iter().sum()
    }

    fn element_gradient(
        &self,
        q: &DVector<f64>,
        coordinates: &Positions,
        out: &mut Positions,
    ) -> Result<()> {
        check_entity_inputs(self.entity.as_ref(), "PairForceField::element_gradient", q, coordinates)?;
        ensure_len("PairForceField::element_gradient", coordinates.len(), out.len())?;

        let m = coordinates.len();
        let lj = self.parameters;

        // ∂U/∂r_i = Σ_{j≠i} V'(r_ij) (r_i − r_j) / r_ij
        let rows = self.map_rows(m, |i| {
            let ri = coordinates.get(i);
            (0..m)
                .filter(|&j| j != i)
                .try_fold(Vector3::zeros(), |acc, j| -> Result<Vector3<f64>> {
                    let r = Self::separation(coordinates, i, j)?;
                    Ok(acc + (ri - coordinates.get(j)) * (lj.derivative(r) / r))
                })
        });

        for (i, grad) in rows.into_iter().enumerate() {
            out.set(i, grad?);
        }
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
