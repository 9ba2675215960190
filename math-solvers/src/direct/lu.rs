//! LU decomposition solver
//!
//! LU factorization with partial pivoting for the small dense systems that
//! couple modal coefficients across material interfaces. Columns are
//! equilibrated before elimination: boundary-condition matrices mix Bessel
//! functions (tiny at high order) with Neumann functions (huge at high order)
//! in the same row, and without scaling those columns the pivot search sees
//! a numerically singular matrix.

use crate::traits::ComplexField;
use ndarray::{Array1, Array2};
use num_traits::{Float, FromPrimitive, One, Zero};
use thiserror::Error;

/// Errors that can occur during LU factorization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LuError {
    #[error("Matrix is singular or nearly singular (column {column})")]
    SingularMatrix { column: usize },
    #[error("Matrix dimensions mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("Matrix entry ({row}, {col}) is not finite")]
    NonFiniteEntry { row: usize, col: usize },
}

/// Treatment of pivots below the singularity threshold
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PivotPolicy {
    /// Fail with [`LuError::SingularMatrix`]
    #[default]
    Strict,
    /// Substitute a pivot of this magnitude relative to the largest entry
    Floor(f64),
}

/// Options for [`lu_factorize_with`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuOptions {
    /// Scale every column to unit max-norm before elimination
    pub equilibrate: bool,
    /// Tiny-pivot handling
    pub pivot: PivotPolicy,
}

impl Default for LuOptions {
    fn default() -> Self {
        Self {
            equilibrate: true,
            pivot: PivotPolicy::Strict,
        }
    }
}

/// LU factorization result
///
/// Stores L and U factors along with pivot information
#[derive(Debug, Clone)]
pub struct LuFactorization<T: ComplexField> {
    /// Combined L and U matrices (L is unit lower triangular, stored below diagonal)
    pub lu: Array2<T>,
    /// Row swapped with row k at elimination step k
    pub pivots: Vec<usize>,
    /// Matrix dimension
    pub n: usize,
    /// Column scale factors applied before elimination
    pub column_scale: Vec<T::Real>,
    /// Number of pivots replaced under [`PivotPolicy::Floor`]
    pub floored_pivots: usize,
}

impl<T: ComplexField> LuFactorization<T> {
    /// Solve Ax = b using the pre-computed LU factorization
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, LuError> {
        if b.len() != self.n {
            return Err(LuError::DimensionMismatch {
                expected: self.n,
                got: b.len(),
            });
        }

        let mut x = b.clone();

        for (k, &pivot) in self.pivots.iter().enumerate() {
            if pivot != k {
                x.swap(k, pivot);
            }
        }

        // Forward substitution: Ly = Pb
        for i in 0..self.n {
            for j in 0..i {
                let l_ij = self.lu[[i, j]];
                x[i] = x[i] - l_ij * x[j];
            }
        }

        // Backward substitution: Uz = y
        for i in (0..self.n).rev() {
            for j in (i + 1)..self.n {
                let u_ij = self.lu[[i, j]];
                x[i] = x[i] - u_ij * x[j];
            }
            x[i] *= self.lu[[i, i]].inv();
        }

        // Undo the column scaling: x = S z
        for (xi, &s) in x.iter_mut().zip(self.column_scale.iter()) {
            *xi *= T::from_real(s);
        }

        Ok(x)
    }

    /// True when any pivot had to be floored
    pub fn is_regularized(&self) -> bool {
        self.floored_pivots > 0
    }
}

/// Compute LU factorization with partial pivoting and default options
pub fn lu_factorize<T: ComplexField>(a: &Array2<T>) -> Result<LuFactorization<T>, LuError> {
    lu_factorize_with(a, &LuOptions::default())
}

/// Compute LU factorization with partial pivoting
///
/// A pivot is treated as singular when its magnitude falls below
/// `n · ε · max|a_ij|` of the (equilibrated) matrix.
pub fn lu_factorize_with<T: ComplexField>(
    a: &Array2<T>,
    options: &LuOptions,
) -> Result<LuFactorization<T>, LuError> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LuError::DimensionMismatch {
            expected: n,
            got: a.ncols(),
        });
    }

    if let Some(((row, col), _)) = a.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(LuError::NonFiniteEntry { row, col });
    }

    let one = <T::Real as One>::one();
    let mut lu = a.clone();
    let mut column_scale = vec![one; n];

    if options.equilibrate {
        for (j, scale) in column_scale.iter_mut().enumerate() {
            let largest = lu
                .column(j)
                .iter()
                .map(|v| v.norm())
                .fold(<T::Real as Zero>::zero(), Float::max);
            if largest > <T::Real as Zero>::zero() {
                *scale = one / largest;
                let factor = T::from_real(*scale);
                lu.column_mut(j).iter_mut().for_each(|v| *v *= factor);
            }
        }
    }

    let largest_entry = lu
        .iter()
        .map(|v| v.norm())
        .fold(<T::Real as Zero>::zero(), Float::max);
    let n_real = T::Real::from_usize(n.max(1)).unwrap_or(one);
    let threshold = n_real * T::Real::epsilon() * largest_entry;

    let mut pivots: Vec<usize> = (0..n).collect();
    let mut floored_pivots = 0;

    for k in 0..n {
        // Find pivot
        let mut max_val = lu[[k, k]].norm();
        let mut max_row = k;

        for i in (k + 1)..n {
            let val = lu[[i, k]].norm();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }

        // Swap rows if needed
        if max_row != k {
            for j in 0..n {
                let tmp = lu[[k, j]];
                lu[[k, j]] = lu[[max_row, j]];
                lu[[max_row, j]] = tmp;
            }
        }
        pivots[k] = max_row;

        if !(max_val > threshold) {
            match options.pivot {
                PivotPolicy::Strict => return Err(LuError::SingularMatrix { column: k }),
                PivotPolicy::Floor(relative) => {
                    let floor = T::Real::from_f64(relative).unwrap_or(one)
                        * Float::max(largest_entry, one);
                    lu[[k, k]] = T::from_real(floor);
                    floored_pivots += 1;
                    log::trace!("floored LU pivot {} to {:?}", k, floor);
                }
            }
        }

        // Compute multipliers and eliminate
        let pivot_inv = lu[[k, k]].inv();
        for i in (k + 1)..n {
            let mult = lu[[i, k]] * pivot_inv;
            lu[[i, k]] = mult;

            for j in (k + 1)..n {
                let update = mult * lu[[k, j]];
                lu[[i, j]] -= update;
            }
        }
    }

    Ok(LuFactorization {
        lu,
        pivots,
        n,
        column_scale,
        floored_pivots,
    })
}

/// Solve Ax = b using LU decomposition
///
/// This is a convenience function that combines factorization and solve.
pub fn lu_solve<T: ComplexField>(a: &Array2<T>, b: &Array1<T>) -> Result<Array1<T>, LuError> {
    lu_factorize(a)?.solve(b)
}

/// Solve Ax = b with explicit factorization options
pub fn lu_solve_with<T: ComplexField>(
    a: &Array2<T>,
    b: &Array1<T>,
    options: &LuOptions,
) -> Result<Array1<T>, LuError> {
    lu_factorize_with(a, options)?.solve(b)
}
