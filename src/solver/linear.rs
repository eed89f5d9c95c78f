//! Dense linear solves for the Euler-Lagrange system A·q̈ = rhs
//!
//! - 2×2 systems use the closed-form inverse through the determinant
//! - larger systems use Gaussian elimination with partial pivoting, tracking
//!   row swaps in a permutation instead of moving matrix rows, followed by
//!   back-substitution
//!
//! A pivot that is not finite, or that vanishes relative to the scale of the
//! system, means the kinetic matrix is singular at this configuration. A is
//! assembled by finite differences, so a singular matrix shows up as a
//! noise-level pivot rather than an exact zero. Both paths report it as
//! [`MechanicsError::SingularSystem`] instead of returning arbitrary accelerations.

use crate::error::{ensure_len, MechanicsError, Result};
use log::warn;
use nalgebra::{DMatrix, DVector};

/// Pivots (2×2: determinants) at or below this fraction of the system scale are singular
///
/// The scale is max |A_ij| for elimination and |a00·a11| + |a01·a10| for the
/// closed form. Finite-difference noise in A sits several orders below it.
pub const SINGULAR_TOLERANCE: f64 = 1e-8;

/// `value` is usable as a divisor for a system of magnitude `scale`
fn is_regular(value: f64, scale: f64) -> bool {
    value.is_finite() && value.abs() > SINGULAR_TOLERANCE * scale
}

/// Solve `a · x = rhs`, choosing the closed form when the system is 2×2
///
/// `a` and `rhs` are used as scratch space and hold garbage afterwards.
/// `rows` is the permutation buffer; it is resized only when its length differs
/// from the system size.
pub fn solve(
    a: &mut DMatrix<f64>,
    rhs: &mut DVector<f64>,
    rows: &mut Vec<usize>,
    x: &mut DVector<f64>,
) -> Result<()> {
    if a.nrows() == 2 {
        solve2(a, rhs, x)
    } else {
        solve_pivoted(a, rhs, rows, x)
    }
}

/// Closed-form solve of a 2×2 system
pub fn solve2(a: &DMatrix<f64>, rhs: &DVector<f64>, x: &mut DVector<f64>) -> Result<()> {
    check_system("solve2", a, rhs, x)?;
    ensure_len("solve2", 2, a.nrows())?;

    let diagonal = a[(0, 0)] * a[(1, 1)];
    let off_diagonal = a[(0, 1)] * a[(1, 0)];
    let det = diagonal - off_diagonal;
    let scale = diagonal.abs() + off_diagonal.abs();
    if !is_regular(det, scale) {
        warn!("singular 2x2 system, determinant = {} at scale {}", det, scale);
        return Err(MechanicsError::SingularSystem { pivot: 0, value: det });
    }

    let (v0, v1) = (rhs[0], rhs[1]);
    x[0] = (a[(1, 1)] * v0 - a[(0, 1)] * v1) / det;
    x[1] = (-a[(1, 0)] * v0 + a[(0, 0)] * v1) / det;
    Ok(())
}

/// Gaussian elimination with partial pivoting
///
/// Row `rows[k]` of `a` plays the role of the k-th pivot row. For each column
/// the remaining row with the largest magnitude is swapped into pivot position
/// before the rows below it are eliminated.
pub fn solve_pivoted(
    a: &mut DMatrix<f64>,
    rhs: &mut DVector<f64>,
    rows: &mut Vec<usize>,
    x: &mut DVector<f64>,
) -> Result<()> {
    check_system("solve_pivoted", a, rhs, x)?;

    let n = a.nrows();
    if rows.len() != n {
        rows.resize(n, 0);
    }
    for (k, r) in rows.iter_mut().enumerate() {
        *r = k;
    }
    let scale = a.amax();

    // Forward elimination
    for j in 0..n {
        let best = (j..n)
            .max_by(|&p, &s| a[(rows[p], j)].abs().total_cmp(&a[(rows[s], j)].abs()))
            .unwrap_or(j);
        rows.swap(j, best);

        let pivot = a[(rows[j], j)];
        if !is_regular(pivot, scale) {
            warn!("singular system: pivot {} is {} at scale {}", j, pivot, scale);
            return Err(MechanicsError::SingularSystem { pivot: j, value: pivot });
        }

        for i in j + 1..n {
            let below = a[(rows[i], j)];
            if below == 0.0 {
                continue;
            }
            let factor = below / pivot;
            for k in j..n {
                a[(rows[i], k)] -= factor * a[(rows[j], k)];
            }
            rhs[rows[i]] -= factor * rhs[rows[j]];
        }
    }

    // Back-substitution
    for j in (0..n).rev() {
        let mut b = rhs[rows[j]];
        for k in j + 1..n {
            b -= a[(rows[j], k)] * x[k];
        }
        x[j] = b / a[(rows[j], j)];
    }
    Ok(())
}

fn check_system(operation: &str, a: &DMatrix<f64>, rhs: &DVector<f64>, x: &DVector<f64>) -> Result<()> {
    let n = a.nrows();
    ensure_len(operation, n, a.ncols())?;
    ensure_len(operation, n, rhs.len())?;
    ensure_len(operation, n, x.len())
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solve_general(a: &DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>> {
        let mut a = a.clone();
        let mut rhs = rhs.clone();
        let mut rows = Vec::new();
        let mut x = DVector::zeros(rhs.len());
        solve_pivoted(&mut a, &mut rhs, &mut rows, &mut x)?;
        Ok(x)
    }

    #[test]
    fn test_closed_form_matches_elimination() {
        let systems = [
            (DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 2.0, 3.0]), DVector::from_vec(vec![1.0, 2.0])),
            (DMatrix::from_row_slice(2, 2, &[0.0, 2.0, 5.0, 1.0]), DVector::from_vec(vec![-1.0, 3.0])),
            (DMatrix::from_row_slice(2, 2, &[1e-3, 7.0, 2.0, -4.0]), DVector::from_vec(vec![0.5, 0.25])),
        ];

        for (a, rhs) in systems {
            let mut closed = DVector::zeros(2);
            solve2(&a, &rhs, &mut closed).unwrap();
            let general = solve_general(&a, &rhs).unwrap();

            assert_relative_eq!(closed, general, epsilon = 1e-12);
            assert_relative_eq!(&a * &closed, rhs, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_pivoting_handles_zero_leading_entry() {
        // Naive elimination would divide by a[0][0] = 0
        let a = DMatrix::from_row_slice(3, 3, &[0.0, 2.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 0.0]);
        let expected = DVector::from_vec(vec![1.0, -2.0, 3.0]);
        let rhs = &a * &expected;

        let x = solve_general(&a, &rhs).unwrap();
        assert_relative_eq!(x, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_larger_system() {
        let n = 6;
        let a = DMatrix::from_fn(n, n, |i, j| if i == j { 10.0 + i as f64 } else { 1.0 / (1.0 + i as f64 + j as f64) });
        let expected = DVector::from_fn(n, |i, _| (i as f64 - 2.5).sin());
        let rhs = &a * &expected;

        let x = solve_general(&a, &rhs).unwrap();
        assert_relative_eq!(x, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_systems_are_detected() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let rhs = DVector::from_vec(vec![1.0, 1.0]);
        let mut x = DVector::zeros(2);
        assert!(solve2(&a, &rhs, &mut x).unwrap_err().is_singular());

        let a = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 0.0, 1.0]);
        let err = solve_general(&a, &DVector::from_element(3, 1.0)).unwrap_err();
        match err {
            MechanicsError::SingularSystem { pivot, value } => {
                assert_eq!(pivot, 1);
                assert_eq!(value, 0.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_noise_level_pivots_are_singular() {
        // Rank 2 up to rounding noise, as left by finite differences
        let noise = 1e-12;
        let a = DMatrix::from_row_slice(
            3,
            3,
            &[1.0, 0.0, 1.0, 0.0, 1.0, 1.0 + noise, 1.0, 1.0, 2.0 - noise],
        );
        let err = solve_general(&a, &DVector::from_element(3, 1.0)).unwrap_err();
        assert!(err.is_singular());

        let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0 + noise]);
        let mut x = DVector::zeros(2);
        assert!(solve2(&a, &DVector::from_element(2, 1.0), &mut x).unwrap_err().is_singular());
    }

    #[test]
    fn test_tolerance_is_relative_to_scale() {
        // Tiny but well-conditioned systems still solve
        let a = DMatrix::from_row_slice(3, 3, &[2.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 4.0]) * 1e-26;
        let expected = DVector::from_vec(vec![1.0, -1.0, 2.0]);
        let x = solve_general(&a, &(&a * &expected)).unwrap();
        assert_relative_eq!(x, expected, epsilon = 1e-10);

        let a = DMatrix::from_row_slice(2, 2, &[3.0, 1.0, 1.0, 2.0]) * 1e-26;
        let mut x = DVector::zeros(2);
        solve2(&a, &(&a * DVector::from_vec(vec![1.0, 2.0])), &mut x).unwrap();
        assert_relative_eq!(x, DVector::from_vec(vec![1.0, 2.0]), epsilon = 1e-10);
    }

    #[test]
    fn test_dispatch_and_shape_checks() {
        let mut rows = Vec::new();

        let mut a = DMatrix::identity(2, 2) * 2.0;
        let mut rhs = DVector::from_vec(vec![2.0, 4.0]);
        let mut x = DVector::zeros(2);
        solve(&mut a, &mut rhs, &mut rows, &mut x).unwrap();
        assert_eq!(x, DVector::from_vec(vec![1.0, 2.0]));

        let mut a = DMatrix::from_element(1, 1, 4.0);
        let mut rhs = DVector::from_element(1, 2.0);
        let mut x = DVector::zeros(1);
        solve(&mut a, &mut rhs, &mut rows, &mut x).unwrap();
        assert_eq!(x[0], 0.5);

        let mut a = DMatrix::identity(3, 3);
        let mut rhs = DVector::zeros(2);
        let mut x = DVector::zeros(3);
        assert!(solve(&mut a, &mut rhs, &mut rows, &mut x).unwrap_err().is_dimension_mismatch());
    }
}
