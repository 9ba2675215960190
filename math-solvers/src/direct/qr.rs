//! Least-squares solver by Givens QR
//!
//! Coupled expansions with more test functions than unknowns give tall
//! systems. The columns are equilibrated as in [`lu_factorize_with`], the
//! matrix is reduced to upper triangular form with Givens rotations and the
//! rotated right-hand side is back-substituted. Rows are not rescaled.
//!
//! [`lu_factorize_with`]: super::lu_factorize_with

use super::LuError;
use crate::traits::ComplexField;
use ndarray::{Array1, Array2};
use num_traits::{Float, FromPrimitive, One, Zero};

/// Least-squares solution of Ax ≈ b for A with at least as many rows as columns
///
/// Fails with [`LuError::SingularMatrix`] when a diagonal entry of R falls
/// below `max(rows, cols) · ε · max|R|`.
pub fn qr_least_squares<T: ComplexField>(
    a: &Array2<T>,
    b: &Array1<T>,
) -> Result<Array1<T>, LuError> {
    let (rows, cols) = a.dim();
    if b.len() != rows {
        return Err(LuError::DimensionMismatch {
            expected: rows,
            got: b.len(),
        });
    }
    if rows < cols {
        return Err(LuError::DimensionMismatch {
            expected: cols,
            got: rows,
        });
    }
    if let Some(((row, col), _)) = a.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(LuError::NonFiniteEntry { row, col });
    }

    let zero = <T::Real as Zero>::zero();
    let one = <T::Real as One>::one();
    let mut r = a.clone();
    let mut y = b.clone();

    let mut column_scale = vec![one; cols];
    for (j, scale) in column_scale.iter_mut().enumerate() {
        let largest = r.column(j).iter().map(|v| v.norm()).fold(zero, Float::max);
        if largest > zero {
            *scale = one / largest;
            let factor = T::from_real(*scale);
            r.column_mut(j).iter_mut().for_each(|v| *v *= factor);
        }
    }

    for j in 0..cols {
        // Zero column j below the diagonal, bottom up
        for i in (j + 1..rows).rev() {
            let (c, s) = givens_rotation(r[[i - 1, j]], r[[i, j]]);
            for col in j..cols {
                let top = r[[i - 1, col]];
                let bottom = r[[i, col]];
                r[[i - 1, col]] = c.conj() * top + s.conj() * bottom;
                r[[i, col]] = c * bottom - s * top;
            }
            let top = y[i - 1];
            let bottom = y[i];
            y[i - 1] = c.conj() * top + s.conj() * bottom;
            y[i] = c * bottom - s * top;
        }
    }

    let largest_diagonal = (0..cols).map(|j| r[[j, j]].norm()).fold(zero, Float::max);
    let size = T::Real::from_usize(rows.max(1)).unwrap_or(one);
    let threshold = size * T::Real::epsilon() * largest_diagonal;

    let mut x = Array1::from_elem(cols, T::zero());
    for i in (0..cols).rev() {
        if !(r[[i, i]].norm() > threshold) {
            return Err(LuError::SingularMatrix { column: i });
        }
        let mut sum = y[i];
        for j in (i + 1)..cols {
            sum -= r[[i, j]] * x[j];
        }
        x[i] = sum * r[[i, i]].inv();
    }

    for (xi, &s) in x.iter_mut().zip(column_scale.iter()) {
        *xi *= T::from_real(s);
    }
    Ok(x)
}

/// Rotation (c, s) with |c|² + |s|² = 1 that maps (a, b) to (r, 0)
fn givens_rotation<T: ComplexField>(a: T, b: T) -> (T, T) {
    let zero = <T::Real as Zero>::zero();
    if b.norm() == zero {
        return (T::one(), T::zero());
    }
    let r = (a.norm_sqr() + b.norm_sqr()).sqrt();
    let inv = T::from_real(<T::Real as One>::one() / r);
    (a * inv, b * inv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use num_complex::Complex64;

    #[test]
    fn test_square_system_matches_lu() {
        let a = array![[0.0_f64, 2.0, 1.0], [1.0, 0.0, 0.0], [3.0, 1.0, 0.0]];
        let b = array![5.0_f64, 1.0, 5.0];

        let x = qr_least_squares(&a, &b).expect("QR solve should succeed");
        let reference = crate::direct::lu_solve(&a, &b).expect("LU solve should succeed");

        for i in 0..3 {
            assert_relative_eq!(x[i], reference[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_line_fit() {
        // y = 1 + 2t sampled with symmetric noise
        let a = array![[1.0_f64, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let b = array![1.1_f64, 2.9, 5.1, 6.9];

        let x = qr_least_squares(&a, &b).expect("QR solve should succeed");

        assert_relative_eq!(x[0], 1.06, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.96, epsilon = 1e-12);
    }

    #[test]
    fn test_complex_consistent_tall_system() {
        let i = Complex64::new(0.0, 1.0);
        let one = Complex64::new(1.0, 0.0);
        let a = array![[one, i], [i, one], [one + i, -one], [2.0 * one, 3.0 * i]];
        let x_true = array![Complex64::new(0.5, -1.0), Complex64::new(2.0, 0.25)];
        let b = a.dot(&x_true);

        let x = qr_least_squares(&a, &b).expect("QR solve should succeed");

        for k in 0..2 {
            assert_relative_eq!((x[k] - x_true[k]).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_small_rows_keep_their_weight() {
        // The last equation contradicts the others but is tiny
        let a = array![[1.0_f64, 0.0], [0.0, 1.0], [1e-14, 1e-14]];
        let b = array![1.0_f64, 1.0, 1e-10];

        let x = qr_least_squares(&a, &b).expect("QR solve should succeed");

        assert_relative_eq!(x[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_badly_scaled_columns() {
        let a = array![[1e-30_f64, 2e30], [3e-30, -1e30], [1e-30, 1e30]];
        let x_true = array![1e30_f64, 1e-30];
        let b = a.dot(&x_true);

        let x = qr_least_squares(&a, &b).expect("QR solve should succeed");

        assert_relative_eq!(x[0], x_true[0], max_relative = 1e-12);
        assert_relative_eq!(x[1], x_true[1], max_relative = 1e-12);
    }

    #[test]
    fn test_rank_deficient() {
        let a = array![[1.0_f64, 2.0], [2.0, 4.0], [3.0, 6.0]];
        let b = array![1.0_f64, 2.0, 3.0];
        assert!(matches!(
            qr_least_squares(&a, &b),
            Err(LuError::SingularMatrix { column: 1 })
        ));
    }

    #[test]
    fn test_wide_system_is_rejected() {
        let a = Array2::<f64>::zeros((2, 3));
        let b = array![1.0_f64, 2.0];
        assert!(matches!(
            qr_least_squares(&a, &b),
            Err(LuError::DimensionMismatch { .. })
        ));
    }
}
