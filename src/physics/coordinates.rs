//! Generalized coordinates container

use crate::error::{ensure_len, MechanicsError, Result};
use nalgebra::DVector;
use parking_lot::Mutex;

/// Generalized coordinates of a system with N degrees of freedom
///
/// Holds the current values q, the box bounds and the two finite-difference
/// step vectors:
///
/// - `dqs`: step on q (position derivatives and Jacobian displacements)
/// - `dqps`: step on q̇ (velocity derivatives)
///
/// Bounds and steps are frozen at construction. `values` may be replaced
/// through [`set_values`](Self::set_values), which takes a lock so the
/// container can be shared (`Arc`) between an integrator and observers.
///
/// # Example
///
/// ```rust
/// use lagrange_rs::physics::GeneralizedCoordinates;
/// use nalgebra::DVector;
///
/// let coords = GeneralizedCoordinates::uniform(3, 0.0, -1.0, 1.0, 1e-5, 1e-3);
/// coords.set_values(&DVector::from_vec(vec![0.1, 0.2, 0.3]))?;
///
/// assert_eq!(coords.len(), 3);
/// assert_eq!(coords.values()[2], 0.3);
/// # Ok::<(), lagrange_rs::error::MechanicsError>(())
/// ```
#[derive(Debug)]
pub struct GeneralizedCoordinates {
    values: Mutex<DVector<f64>>,
    mins: DVector<f64>,
    maxs: DVector<f64>,
    dqs: DVector<f64>,
    dqps: DVector<f64>,
}

impl GeneralizedCoordinates {
    /// Create from explicit vectors
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when any vector's length differs from `values.len()`.
    pub fn new(
        values: DVector<f64>,
        mins: DVector<f64>,
        maxs: DVector<f64>,
        dqs: DVector<f64>,
        dqps: DVector<f64>,
    ) -> Result<Self> {
        let n = values.len();
        ensure_len("GeneralizedCoordinates::new (mins)", n, mins.len())?;
        ensure_len("GeneralizedCoordinates::new (maxs)", n, maxs.len())?;
        ensure_len("GeneralizedCoordinates::new (dqs)", n, dqs.len())?;
        ensure_len("GeneralizedCoordinates::new (dqps)", n, dqps.len())?;

        for i in 0..n {
            if !(dqs[i] > 0.0 && dqps[i] > 0.0) {
                return Err(MechanicsError::invalid_config(format!(
                    "finite-difference steps of coordinate {} must be positive (dq = {}, dqp = {})",
                    i, dqs[i], dqps[i]
                )));
            }
            if mins[i] > maxs[i] {
                return Err(MechanicsError::invalid_config(format!(
                    "bounds of coordinate {} are inverted: [{}, {}]",
                    i, mins[i], maxs[i]
                )));
            }
        }

        Ok(Self {
            values: Mutex::new(values),
            mins,
            maxs,
            dqs,
            dqps,
        })
    }

    /// Create `n` coordinates sharing the same scalar defaults
    ///
    /// # Panics
    ///
    /// Panics when a step is not positive or when `min > max`.
    pub fn uniform(n: usize, value: f64, min: f64, max: f64, dq: f64, dqp: f64) -> Self {
        assert!(dq > 0.0 && dqp > 0.0, "finite-difference steps must be positive");
        assert!(min <= max, "bounds are inverted: [{}, {}]", min, max);

        Self {
            values: Mutex::new(DVector::from_element(n, value)),
            mins: DVector::from_element(n, min),
            maxs: DVector::from_element(n, max),
            dqs: DVector::from_element(n, dq),
            dqps: DVector::from_element(n, dqp),
        }
    }

    /// Unbounded coordinates starting at `values`
    pub fn unbounded(values: DVector<f64>, dq: f64, dqp: f64) -> Result<Self> {
        let n = values.len();
        Self::new(
            values,
            DVector::from_element(n, f64::NEG_INFINITY),
            DVector::from_element(n, f64::INFINITY),
            DVector::from_element(n, dq),
            DVector::from_element(n, dqp),
        )
    }

    /// Number of degrees of freedom
    pub fn len(&self) -> usize {
        self.mins.len()
    }

    /// Check emptiness
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the current values
    pub fn values(&self) -> DVector<f64> {
        self.values.lock().clone()
    }

    /// Replace the current values
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when `values.len() != self.len()`.
    pub fn set_values(&self, values: &DVector<f64>) -> Result<()> {
        ensure_len("GeneralizedCoordinates::set_values", self.len(), values.len())?;
        self.values.lock().copy_from(values);
        Ok(())
    }

    /// Lower bounds
    pub fn mins(&self) -> &DVector<f64> {
        &self.mins
    }

    /// Upper bounds
    pub fn maxs(&self) -> &DVector<f64> {
        &self.maxs
    }

    /// Finite-difference step on q
    pub fn dqs(&self) -> &DVector<f64> {
        &self.dqs
    }

    /// Finite-difference step on q̇
    pub fn dqps(&self) -> &DVector<f64> {
        &self.dqps
    }

    /// First coordinate of `q` outside its bounds, if any
    pub fn first_out_of_bounds(&self, q: &DVector<f64>) -> Option<MechanicsError> {
        q.iter()
            .zip(self.mins.iter().zip(self.maxs.iter()))
            .enumerate()
            .find(|(_, (v, (lo, hi)))| *v < *lo || *v > *hi)
            .map(|(dof, (&value, (&min, &max)))| MechanicsError::OutOfBounds {
                dof,
                value,
                min,
                max,
            })
    }

    /// Check that every coordinate of `q` lies within its bounds
    pub fn is_within_bounds(&self, q: &DVector<f64>) -> bool {
        q.len() == self.len() && self.first_out_of_bounds(q).is_none()
    }
}

impl Clone for GeneralizedCoordinates {
    fn clone(&self) -> Self {
        Self {
            values: Mutex::new(self.values()),
            mins: self.mins.clone(),
            maxs: self.maxs.clone(),
            dqs: self.dqs.clone(),
            dqps: self.dqps.clone(),
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
