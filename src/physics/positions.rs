//! Cartesian position container
//!
//! Element positions are stored axis-major: one `DVector` per spatial axis,
//! each of length M (number of elements). This matches the three per-axis
//! Jacobian buffers used by the kinetic operator.

use nalgebra::{DVector, Vector3};
use std::fmt;

/// Spatial axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All three axes, in storage order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// Positions of M point elements, stored per axis
///
/// # Example
///
/// ```rust
/// use lagrange_rs::physics::Positions;
/// use nalgebra::Vector3;
///
/// let mut positions = Positions::zeros(2);
/// positions.set(1, Vector3::new(1.0, 2.0, 3.0));
///
/// assert_eq!(positions.len(), 2);
/// assert_eq!(positions.get(1).z, 3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Positions {
    x: DVector<f64>,
    y: DVector<f64>,
    z: DVector<f64>,
}

impl Positions {
    // ======================================= constructors =======================================

    /// Create `n` positions at the origin
    pub fn zeros(n: usize) -> Self {
        Self {
            x: DVector::zeros(n),
            y: DVector::zeros(n),
            z: DVector::zeros(n),
        }
    }

    /// Create from a list of points
    pub fn from_points(points: &[Vector3<f64>]) -> Self {
        let mut positions = Self::zeros(points.len());
        for (i, p) in points.iter().enumerate() {
            positions.set(i, *p);
        }
        positions
    }

    // ========================================== Queries ==========================================

    /// Number of elements
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Check emptiness
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of element `i`
    pub fn get(&self, i: usize) -> Vector3<f64> {
        Vector3::new(self.x[i], self.y[i], self.z[i])
    }

    /// Set position of element `i`
    pub fn set(&mut self, i: usize, p: Vector3<f64>) {
        self.x[i] = p.x;
        self.y[i] = p.y;
        self.z[i] = p.z;
    }

    /// Coordinates along one axis
    pub fn axis(&self, axis: Axis) -> &DVector<f64> {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// Mutable coordinates along one axis
    pub fn axis_mut(&mut self, axis: Axis) -> &mut DVector<f64> {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }

    // ======================================== Operations =========================================

    /// Set every coordinate to zero
    pub fn fill_zero(&mut self) {
        self.x.fill(0.0);
        self.y.fill(0.0);
        self.z.fill(0.0);
    }

    /// Copy coordinates from another container of the same length
    pub fn copy_from(&mut self, other: &Positions) {
        self.x.copy_from(&other.x);
        self.y.copy_from(&other.y);
        self.z.copy_from(&other.z);
    }

    /// Euclidean distance between elements `i` and `j`
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        (self.get(i) - self.get(j)).norm()
    }

    /// Check that no coordinate is NaN or infinite
    pub fn is_finite(&self) -> bool {
        Axis::ALL
            .iter()
            .all(|&a| self.axis(a).iter().all(|v| v.is_finite()))
    }
}

impl fmt::Display for Positions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Positions [{} * 3]", self.len())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
