//! Shared machinery of the modal-series solvers
//!
//! Every exact model writes its backscattering amplitude as a series over
//! modes, one small boundary-condition system per mode. This module owns
//! the parts they share: choosing and verifying the truncation order, and
//! solving the per-mode systems.

use crate::boundary::BoundaryType;
use crate::error::{Result, ScatterError};
use crate::model::TruncationReport;
use math_echo_solvers::{LuOptions, PivotPolicy, lu_solve_with, qr_least_squares};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Smallest size parameter passed to the special functions
pub const MIN_SIZE_PARAMETER: f64 = 1e-6;

/// Largest size parameter treated as the Rayleigh regime
pub const RAYLEIGH_LIMIT: f64 = 0.01;

/// Acoustic wavenumber 2πf/c [1/m]
pub fn wavenumber(sound_speed: f64, frequency: f64) -> f64 {
    2.0 * PI * frequency / sound_speed
}

/// Clamp a size parameter away from zero
pub fn clamp_size(x: f64) -> f64 {
    x.max(MIN_SIZE_PARAMETER)
}

/// How many modes to sum and when to stop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncationPolicy {
    /// Modes beyond ⌈max ka⌉ in the first pass, and per extension
    pub extra_modes: usize,
    /// Largest accepted |probe sum| / |amplitude|
    pub tolerance: f64,
    /// Modes summed past the order to test convergence
    pub probe_modes: usize,
    /// Hard cap on the order
    pub max_order: usize,
}

impl Default for TruncationPolicy {
    fn default() -> Self {
        Self {
            extra_modes: 10,
            tolerance: 1e-4,
            probe_modes: 3,
            max_order: 400,
        }
    }
}

impl TruncationPolicy {
    /// Initial order ⌈max ka⌉ + extra_modes, capped at `max_order`
    pub fn initial_order(&self, max_size: f64) -> usize {
        let ceil = max_size.max(0.0).ceil() as usize;
        (ceil + self.extra_modes).min(self.max_order)
    }

    /// Highest order a summation under this policy can reach
    pub fn ladder_order(&self) -> usize {
        self.max_order + self.probe_modes
    }

    /// A policy that sums exactly `order` + 1 modes with no probing
    pub fn fixed(order: usize) -> Self {
        Self {
            extra_modes: order,
            tolerance: f64::INFINITY,
            probe_modes: 0,
            max_order: order,
        }
    }
}

/// Outcome of summing a modal series
#[derive(Debug, Clone, PartialEq)]
pub struct ModalSeries {
    /// Weighted term of each mode, in mode order
    pub terms: Vec<Complex64>,
    pub sum: Complex64,
    /// Highest mode included in `sum`
    pub order: usize,
    pub converged: bool,
    /// |probe sum| / |sum| at the last check
    pub tail_ratio: f64,
}

/// Sum `term(n)` for n = 0, 1, ... until the probe modes are negligible
///
/// The first pass stops at [`TruncationPolicy::initial_order`]. The next
/// `probe_modes` terms are then compared with the partial sum; when their
/// sum exceeds `tolerance` relative to it, the order grows by
/// `extra_modes` and the check repeats, up to `max_order`. Probe terms are
/// part of the returned sum.
pub fn sum_modes<F>(policy: &TruncationPolicy, max_size: f64, mut term: F) -> Result<ModalSeries>
where
    F: FnMut(usize) -> Result<Complex64>,
{
    let mut terms: Vec<Complex64> = Vec::new();
    let mut push = |terms: &mut Vec<Complex64>, upto: usize| -> Result<()> {
        for n in terms.len()..=upto {
            let value = term(n)?;
            if !(value.re.is_finite() && value.im.is_finite()) {
                return Err(ScatterError::NonFiniteTerm { mode: n });
            }
            terms.push(value);
        }
        Ok(())
    };

    let mut order = policy.initial_order(max_size);
    push(&mut terms, order)?;

    loop {
        let partial: Complex64 = terms[..=order].iter().sum();
        if policy.probe_modes == 0 {
            return Ok(ModalSeries {
                sum: partial,
                order,
                converged: true,
                tail_ratio: 0.0,
                terms,
            });
        }

        let probe_end = order + policy.probe_modes;
        push(&mut terms, probe_end)?;
        let probe: Complex64 = terms[order + 1..=probe_end].iter().sum();
        let tail_ratio = if partial.norm() > 0.0 {
            probe.norm() / partial.norm()
        } else if probe.norm() > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        if tail_ratio <= policy.tolerance || order >= policy.max_order {
            let converged = tail_ratio <= policy.tolerance;
            if !converged {
                log::debug!(
                    "modal series stopped at the order cap {} with tail ratio {:.3e}",
                    order,
                    tail_ratio
                );
            }
            return Ok(ModalSeries {
                sum: partial + probe,
                order: probe_end,
                converged,
                tail_ratio,
                terms,
            });
        }

        order = (order + policy.extra_modes.max(1)).min(policy.max_order);
        push(&mut terms, order)?;
    }
}

/// Scattered field of one solve, reduced to what TS needs
#[derive(Debug, Clone, PartialEq)]
pub struct ModalSolution {
    /// Weighted modal contributions
    pub coefficients: Vec<Complex64>,
    /// Highest mode summed
    pub order: usize,
    /// Dimensionless backscattering amplitude
    pub amplitude: Complex64,
    /// Length that scales `amplitude` to metres [m]
    pub reference_length: f64,
    pub converged: bool,
    pub tail_ratio: f64,
}

impl ModalSolution {
    /// Scale a series into a solution: amplitude = prefactor · sum
    pub fn from_series(series: ModalSeries, prefactor: Complex64, reference_length: f64) -> Self {
        Self {
            amplitude: prefactor * series.sum,
            coefficients: series.terms,
            order: series.order,
            reference_length,
            converged: series.converged,
            tail_ratio: series.tail_ratio,
        }
    }

    /// Backscattering length |f| [m]
    pub fn scattering_length(&self) -> f64 {
        self.amplitude.norm() * self.reference_length
    }

    /// Target strength [dB re 1 m²]
    pub fn ts(&self) -> f64 {
        20.0 * self.scattering_length().log10()
    }

    pub fn truncation(&self) -> TruncationReport {
        TruncationReport {
            order: self.order,
            converged: self.converged,
            tail_ratio: self.tail_ratio,
        }
    }
}

/// Solve one mode's boundary-condition system
///
/// Rows are scaled to unit max-norm before factorization, since elastic
/// systems mix compliances near 1e-9 with stresses near 1e11. In the
/// Rayleigh regime a vanishing pivot is floored at the boundary type's
/// relative epsilon instead of failing.
pub fn solve_mode_system(
    matrix: &Array2<Complex64>,
    rhs: &Array1<Complex64>,
    mode: usize,
    boundary_type: BoundaryType,
    max_size: f64,
) -> Result<Array1<Complex64>> {
    let pivot = if max_size < RAYLEIGH_LIMIT {
        PivotPolicy::Floor(boundary_type.rayleigh_pivot_floor())
    } else {
        PivotPolicy::Strict
    };
    let options = LuOptions {
        equilibrate: true,
        pivot,
    };
    let mut scaled = matrix.clone();
    let mut b = rhs.clone();
    for (mut row, rhs_i) in scaled.rows_mut().into_iter().zip(b.iter_mut()) {
        let norm = row.iter().map(|v| v.norm()).fold(0.0_f64, f64::max);
        if norm > 0.0 && norm.is_finite() {
            row.mapv_inplace(|v| v / norm);
            *rhs_i /= norm;
        }
    }
    lu_solve_with(&scaled, &b, &options)
        .map_err(|source| ScatterError::SingularSystem { mode, source })
}

/// Least-squares solve of one mode's coupled expansion system
///
/// The matrix may have more rows than columns. Columns are equilibrated and
/// rows keep their magnitude, so equations whose test functions barely
/// overlap the unknowns carry little weight.
pub fn solve_coupled_system(
    matrix: &Array2<Complex64>,
    rhs: &Array1<Complex64>,
    mode: usize,
) -> Result<Array1<Complex64>> {
    qr_least_squares(matrix, rhs).map_err(|source| ScatterError::SingularSystem { mode, source })
}

/// sin(x)/x with the removable singularity filled
pub fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        x.sin() / x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_initial_order() {
        let policy = TruncationPolicy::default();
        assert_eq!(policy.initial_order(1.0), 11);
        assert_eq!(policy.initial_order(4.2), 15);
        assert_eq!(policy.initial_order(1e6), 400);
        assert_eq!(policy.ladder_order(), 403);
    }

    #[test]
    fn test_clamp_size() {
        assert_eq!(clamp_size(0.0), MIN_SIZE_PARAMETER);
        assert_eq!(clamp_size(2.5), 2.5);
    }

    #[test]
    fn test_geometric_series_converges() {
        let policy = TruncationPolicy::default();
        let series = sum_modes(&policy, 1.0, |n| Ok(Complex64::new(0.5_f64.powi(n as i32), 0.0)))
            .unwrap();
        assert!(series.converged);
        assert!(series.tail_ratio <= 1e-4);
        assert!(series.order > 11);
        assert_relative_eq!(series.sum.re, 2.0, max_relative = 1e-4);
    }

    #[test]
    fn test_slow_series_hits_the_cap() {
        let policy = TruncationPolicy {
            max_order: 40,
            ..TruncationPolicy::default()
        };
        let series = sum_modes(&policy, 1.0, |n| Ok(Complex64::new(1.0 / (n as f64 + 1.0), 0.0)))
            .unwrap();
        assert!(!series.converged);
        assert_eq!(series.order, 43);
        assert_eq!(series.terms.len(), 44);
    }

    #[test]
    fn test_fixed_policy() {
        let series = sum_modes(&TruncationPolicy::fixed(5), 100.0, |_| Ok(Complex64::new(1.0, 1.0)))
            .unwrap();
        assert_eq!(series.order, 5);
        assert_relative_eq!(series.sum.im, 6.0);
    }

    #[test]
    fn test_non_finite_term_is_reported() {
        let err = sum_modes(&TruncationPolicy::default(), 1.0, |n| {
            Ok(if n == 4 {
                Complex64::new(f64::NAN, 0.0)
            } else {
                Complex64::new(1.0, 0.0)
            })
        })
        .unwrap_err();
        assert_eq!(err.mode(), Some(4));
    }

    #[test]
    fn test_singular_system_carries_mode() {
        let one = Complex64::new(1.0, 0.0);
        let m = array![[one, one], [one, one]];
        let b = array![one, one];
        let err = solve_mode_system(&m, &b, 3, BoundaryType::FluidFilled, 1.0).unwrap_err();
        assert!(matches!(err, ScatterError::SingularSystem { mode: 3, .. }));

        let x = solve_mode_system(&m, &b, 3, BoundaryType::FluidFilled, 1e-3).unwrap();
        assert!(x.iter().all(|v| v.re.is_finite()));
    }

    #[test]
    fn test_mode_system_with_mixed_row_scales() {
        // Compliance row near 1e-9, stress row near 1e11
        let m = array![
            [Complex64::new(2e-9, 0.0), Complex64::new(1e-9, 0.0)],
            [Complex64::new(1e11, 0.0), Complex64::new(-3e11, 0.0)],
        ];
        let x_true = array![Complex64::new(1.0, 0.5), Complex64::new(-2.0, 0.0)];
        let b = m.dot(&x_true);
        let x = solve_mode_system(&m, &b, 0, BoundaryType::Elastic, 1.0).unwrap();
        for (got, want) in x.iter().zip(x_true.iter()) {
            assert_relative_eq!((got - want).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_coupled_system_ignores_weak_rows() {
        let one = Complex64::new(1.0, 0.0);
        let tiny = Complex64::new(1e-15, 0.0);
        let m = array![[one, tiny], [tiny, one], [tiny, tiny]];
        let b = array![one, one, Complex64::new(1e-9, 0.0)];
        let x = solve_coupled_system(&m, &b, 2).unwrap();
        assert_relative_eq!(x[0].re, 1.0, epsilon = 1e-9);
        assert_relative_eq!(x[1].re, 1.0, epsilon = 1e-9);

        let flat = array![[one, one], [one, one], [one, one]];
        let err = solve_coupled_system(&flat, &b, 2).unwrap_err();
        assert_eq!(err.mode(), Some(2));
    }

    #[test]
    fn test_solution_ts() {
        let series = ModalSeries {
            terms: vec![],
            sum: Complex64::new(0.0, 1.0),
            order: 0,
            converged: true,
            tail_ratio: 0.0,
        };
        let solution = ModalSolution::from_series(series, Complex64::new(0.5, 0.0), 0.2);
        assert_relative_eq!(solution.ts(), 20.0 * 0.1_f64.log10());
        assert_relative_eq!(sinc(0.0), 1.0);
    }
}
