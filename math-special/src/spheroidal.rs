//! Prolate spheroidal wave functions
//!
//! For a fixed azimuthal order m and size parameter c = kq, the angular
//! functions are expanded in unit-norm associated Legendre functions:
//! ```text
//! S̄_mn(η) = Σ_r e_r P̄^m_{m+r}(η),    r ≡ n - m (mod 2)
//! ```
//! The coefficients e_r are the eigenvectors of a symmetric tridiagonal
//! matrix (one per parity of r), and the eigenvalues are the separation
//! constants λ_mn. Because the basis is orthonormal the angular functions
//! come out with unit norm on [-1, 1] without any further scaling.
//!
//! Radial functions of the first kind use the spherical Bessel expansion
//! ```text
//! R1_mn(ξ) = ((ξ²-1)/ξ²)^{m/2} Σ_r i^{r+m-n} d_r (r+2m)!/r! j_{m+r}(cξ) / Σ_r d_r (r+2m)!/r!
//! ```
//! and the second kind replaces j by y. Near the focal line (ξ < 1.5) the
//! Neumann expansion converges too slowly, so R2 is carried inward from
//! ξ = 1.5 by integrating the radial equation in t = ln(ξ - 1).
//!
//! Every radial pair is checked against the Wronskian
//! ```text
//! R1 R2' - R1' R2 = 1 / (c (ξ² - 1))
//! ```

use crate::error::{Result, SpecialFunctionError};
use crate::legendre::{log_factorial_ratio, normalized_associated_legendre};
use crate::spherical::{SphericalBesselTable, SphericalKind};
use nalgebra::DMatrix;

/// Relative Wronskian error above which a radial pair is rejected
pub const WRONSKIAN_TOLERANCE: f64 = 1e-6;

/// Radial coordinate where the Neumann expansion hands over to integration
const NEUMANN_MATCH_XI: f64 = 1.5;

/// Extra coefficients appended by the continued-fraction tail
const TAIL_EXTENSION: usize = 60;

/// A radial function value and its ξ-derivative
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialPair {
    pub value: f64,
    pub derivative: f64,
}

/// Expansion coefficients of one (m, n) mode
#[derive(Debug, Clone)]
struct SpheroidalMode {
    parity: usize,
    eigenvalue: f64,
    /// Coefficients of P̄^m_{m+parity+2i}
    coefficients: Vec<f64>,
}

/// Prolate spheroidal wave functions of one order m and size parameter c
///
/// All degrees n = m..=max_degree are resolved from two eigen decompositions,
/// so building one value per m and reusing it across n is the intended use.
#[derive(Debug, Clone)]
pub struct ProlateSpheroidal {
    m: usize,
    c: f64,
    modes: Vec<SpheroidalMode>,
}

impl ProlateSpheroidal {
    /// Resolve the modes n = m..=max_degree of order m at size parameter c
    pub fn new(m: usize, c: f64, max_degree: usize) -> Result<Self> {
        if !(c.is_finite() && c > 0.0) {
            return Err(SpecialFunctionError::InvalidArgument {
                function: "prolate spheroidal",
                reason: format!("size parameter must be positive and finite, got {c}"),
            });
        }
        if max_degree < m {
            return Err(SpecialFunctionError::InvalidArgument {
                function: "prolate spheroidal",
                reason: format!("max degree {max_degree} is below order {m}"),
            });
        }

        let even = solve_parity_block(m, c, 0, max_degree)?;
        let odd = solve_parity_block(m, c, 1, max_degree)?;

        // Interleave so that modes[n - m] is degree n
        let mut modes = Vec::with_capacity(max_degree - m + 1);
        let mut even = even.into_iter();
        let mut odd = odd.into_iter();
        for n in m..=max_degree {
            let next = if (n - m) % 2 == 0 {
                even.next()
            } else {
                odd.next()
            };
            modes.push(next.ok_or(SpecialFunctionError::DegenerateExpansion { m, n })?);
        }

        Ok(Self { m, c, modes })
    }

    /// Azimuthal order m
    pub fn order(&self) -> usize {
        self.m
    }

    /// Size parameter c
    pub fn size_parameter(&self) -> f64 {
        self.c
    }

    /// Highest resolved degree
    pub fn max_degree(&self) -> usize {
        self.m + self.modes.len() - 1
    }

    fn mode(&self, n: usize) -> &SpheroidalMode {
        assert!(
            n >= self.m && n <= self.max_degree(),
            "degree {} outside resolved range {}..={}",
            n,
            self.m,
            self.max_degree()
        );
        &self.modes[n - self.m]
    }

    /// Separation constant λ_mn
    pub fn eigenvalue(&self, n: usize) -> f64 {
        self.mode(n).eigenvalue
    }

    /// Unit-norm angular function S̄_mn(η)
    pub fn angular(&self, n: usize, eta: f64) -> f64 {
        let mode = self.mode(n);
        let top = self.m + mode.parity + 2 * (mode.coefficients.len() - 1);
        let legendre = normalized_associated_legendre(top, self.m, eta);
        angular_sum(mode, &legendre)
    }

    /// S̄_mn(η) for every resolved degree, sharing one Legendre ladder
    pub fn angular_all(&self, eta: f64) -> Vec<f64> {
        let top = self
            .modes
            .iter()
            .map(|mode| self.m + mode.parity + 2 * (mode.coefficients.len() - 1))
            .max()
            .unwrap_or(self.m);
        let legendre = normalized_associated_legendre(top, self.m, eta);
        self.modes
            .iter()
            .map(|mode| angular_sum(mode, &legendre))
            .collect()
    }

    /// ∫₋₁¹ S̄_mn(η; c) S̄_ml(η; c') dη against another set of the same order
    pub fn overlap(&self, n: usize, other: &ProlateSpheroidal, l: usize) -> f64 {
        assert_eq!(self.m, other.m, "overlap requires equal azimuthal order");
        let a = self.mode(n);
        let b = other.mode(l);
        if a.parity != b.parity {
            return 0.0;
        }
        a.coefficients
            .iter()
            .zip(b.coefficients.iter())
            .map(|(x, y)| x * y)
            .sum()
    }

    /// Radial function of the first kind R1_mn(ξ)
    pub fn radial_first(&self, n: usize, xi: f64) -> Result<RadialPair> {
        check_radial_argument(xi)?;
        self.neumann_series(n, xi, SphericalKind::First)
    }

    /// Radial function of the second kind R2_mn(ξ)
    pub fn radial_second(&self, n: usize, xi: f64) -> Result<RadialPair> {
        check_radial_argument(xi)?;
        if xi >= NEUMANN_MATCH_XI {
            return self.neumann_series(n, xi, SphericalKind::Second);
        }
        let start = self.neumann_series(n, NEUMANN_MATCH_XI, SphericalKind::Second)?;
        Ok(self.integrate_inward(n, start, xi))
    }

    /// Both radial kinds at ξ, rejected if they fail the Wronskian check
    pub fn radial(&self, n: usize, xi: f64) -> Result<(RadialPair, RadialPair)> {
        let first = self.radial_first(n, xi)?;
        let second = self.radial_second(n, xi)?;

        let wronskian = first.value * second.derivative - first.derivative * second.value;
        let relative_error = (wronskian * self.c * (xi * xi - 1.0) - 1.0).abs();
        if !(relative_error <= WRONSKIAN_TOLERANCE) {
            log::debug!(
                "Wronskian check failed for m={}, n={}, c={}, xi={}: {:.3e}",
                self.m,
                n,
                self.c,
                xi,
                relative_error
            );
            return Err(SpecialFunctionError::WronskianMismatch {
                m: self.m,
                n,
                relative_error,
            });
        }

        Ok((first, second))
    }

    fn neumann_series(&self, n: usize, xi: f64, kind: SphericalKind) -> Result<RadialPair> {
        let mode = self.mode(n);
        let m = self.m;
        let c = self.c;
        let x = c * xi;

        let top = m + mode.parity + 2 * (mode.coefficients.len() - 1);
        let table = SphericalBesselTable::new(top, x);

        let mut norm = 0.0;
        let mut sum = 0.0;
        let mut dsum = 0.0;
        let mut converged_sum = false;
        for (i, &e) in mode.coefficients.iter().enumerate() {
            let r = mode.parity + 2 * i;
            let k = m + r;
            let weight = e
                * ((2 * k + 1) as f64 / 2.0).sqrt()
                * (0.5 * log_factorial_ratio(k, m)).exp();
            norm += weight;
            if converged_sum {
                continue;
            }

            // i^{r+m-n} is real because r ≡ n - m (mod 2)
            let sign = if ((r + m + 3 * n) / 2) % 2 == 0 {
                1.0
            } else {
                -1.0
            };
            let term = weight * sign * table.value(kind, k);
            let dterm = weight * sign * c * table.derivative(kind, k);
            if !(term.is_finite() && dterm.is_finite()) {
                converged_sum = true;
                continue;
            }
            sum += term;
            dsum += dterm;
            if k as f64 > x && term.abs() <= 1e-16 * sum.abs() {
                converged_sum = true;
            }
        }

        if norm == 0.0 || !norm.is_finite() {
            return Err(SpecialFunctionError::DegenerateExpansion { m, n });
        }

        let (f, df) = if m == 0 {
            (1.0, 0.0)
        } else {
            let f = (1.0 - 1.0 / (xi * xi)).powf(m as f64 / 2.0);
            (f, f * m as f64 / (xi * (xi * xi - 1.0)))
        };

        Ok(RadialPair {
            value: f * sum / norm,
            derivative: (df * sum + f * dsum) / norm,
        })
    }

    /// RK4 on y1 = R, y2 = (ξ²-1) R' in t = ln(ξ - 1)
    fn integrate_inward(&self, n: usize, start: RadialPair, xi: f64) -> RadialPair {
        let lambda = self.eigenvalue(n);
        let c2 = self.c * self.c;
        let m2 = (self.m * self.m) as f64;

        let rhs = |t: f64, y1: f64, y2: f64| -> (f64, f64) {
            let u = t.exp();
            let x = 1.0 + u;
            (
                y2 / (u + 2.0),
                (u * (lambda - c2 * x * x) + m2 / (u + 2.0)) * y1,
            )
        };

        let t0 = (NEUMANN_MATCH_XI - 1.0).ln();
        let t1 = (xi - 1.0).ln();
        let target_step = 1e-3_f64.min(0.02 / (self.c + self.m as f64 + 1.0));
        let steps = ((t1 - t0).abs() / target_step).ceil().max(1.0) as usize;
        let h = (t1 - t0) / steps as f64;

        let mut t = t0;
        let mut y1 = start.value;
        let mut y2 = (NEUMANN_MATCH_XI * NEUMANN_MATCH_XI - 1.0) * start.derivative;
        for _ in 0..steps {
            let k1 = rhs(t, y1, y2);
            let k2 = rhs(t + h / 2.0, y1 + h / 2.0 * k1.0, y2 + h / 2.0 * k1.1);
            let k3 = rhs(t + h / 2.0, y1 + h / 2.0 * k2.0, y2 + h / 2.0 * k2.1);
            let k4 = rhs(t + h, y1 + h * k3.0, y2 + h * k3.1);
            y1 += h / 6.0 * (k1.0 + 2.0 * k2.0 + 2.0 * k3.0 + k4.0);
            y2 += h / 6.0 * (k1.1 + 2.0 * k2.1 + 2.0 * k3.1 + k4.1);
            t += h;
        }

        RadialPair {
            value: y1,
            derivative: y2 / (xi * xi - 1.0),
        }
    }
}

fn check_radial_argument(xi: f64) -> Result<()> {
    if xi.is_finite() && xi > 1.0 {
        Ok(())
    } else {
        Err(SpecialFunctionError::InvalidArgument {
            function: "prolate spheroidal radial",
            reason: format!("radial coordinate must exceed 1, got {xi}"),
        })
    }
}

fn angular_sum(mode: &SpheroidalMode, legendre: &[f64]) -> f64 {
    mode.coefficients
        .iter()
        .enumerate()
        .map(|(i, e)| e * legendre[mode.parity + 2 * i])
        .sum()
}

fn diagonal(m: usize, k: usize, c: f64) -> f64 {
    let (m, k) = (m as f64, k as f64);
    k * (k + 1.0)
        + c * c * (2.0 * k * (k + 1.0) - 2.0 * m * m - 1.0) / ((2.0 * k - 1.0) * (2.0 * k + 3.0))
}

/// Coupling between P̄^m_k and P̄^m_{k+2}
fn off_diagonal(m: usize, k: usize, c: f64) -> f64 {
    let (m, k) = (m as f64, k as f64);
    c * c
        * ((k - m + 1.0) * (k - m + 2.0) * (k + m + 1.0) * (k + m + 2.0)
            / ((2.0 * k + 1.0) * (2.0 * k + 3.0) * (2.0 * k + 3.0) * (2.0 * k + 5.0)))
            .sqrt()
}

/// Modes of one parity, ascending in degree
fn solve_parity_block(
    m: usize,
    c: f64,
    parity: usize,
    max_degree: usize,
) -> Result<Vec<SpheroidalMode>> {
    if max_degree < m + parity {
        return Ok(Vec::new());
    }
    let needed = (max_degree - m - parity) / 2 + 1;
    let size = needed + 2 * c.ceil() as usize + 25;

    let mut matrix = DMatrix::<f64>::zeros(size, size);
    for i in 0..size {
        let k = m + parity + 2 * i;
        matrix[(i, i)] = diagonal(m, k, c);
        if i + 1 < size {
            let coupling = off_diagonal(m, k, c);
            matrix[(i, i + 1)] = coupling;
            matrix[(i + 1, i)] = coupling;
        }
    }

    let eigen = matrix.symmetric_eigen();
    let mut order: Vec<usize> = (0..size).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

    order
        .iter()
        .take(needed)
        .enumerate()
        .map(|(j, &idx)| {
            let n = m + parity + 2 * j;
            let eigenvalue = eigen.eigenvalues[idx];
            let raw: Vec<f64> = eigen.eigenvectors.column(idx).iter().copied().collect();
            if !eigenvalue.is_finite() || raw.iter().any(|v| !v.is_finite()) {
                return Err(SpecialFunctionError::DegenerateExpansion { m, n });
            }
            let coefficients = refine_tail(m, c, parity, eigenvalue, raw)
                .ok_or(SpecialFunctionError::DegenerateExpansion { m, n })?;
            Ok(SpheroidalMode {
                parity,
                eigenvalue,
                coefficients,
            })
        })
        .collect()
}

/// Replace the noise floor of an eigenvector by its continued-fraction tail
///
/// The dense eigen solver only resolves components to ~1e-16 of the largest;
/// radial series weight high orders by growing factorials, so the tail is
/// rebuilt from the exact ratio recurrence and extended past the matrix size.
fn refine_tail(
    m: usize,
    c: f64,
    parity: usize,
    eigenvalue: f64,
    mut coefficients: Vec<f64>,
) -> Option<Vec<f64>> {
    let largest = coefficients
        .iter()
        .copied()
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))?;
    if largest == 0.0 {
        return None;
    }
    // Canonical sign: largest component positive
    if largest < 0.0 {
        coefficients.iter_mut().for_each(|v| *v = -*v);
    }

    let threshold = 1e-6 * largest.abs();
    let last_resolved = coefficients.iter().rposition(|v| v.abs() > threshold)?;
    let top = coefficients.len() + TAIL_EXTENSION;

    // ratios[i] = e_i / e_{i-1}, computed downward from zero
    let mut ratios = vec![0.0; top + 1];
    let mut ratio = 0.0;
    for i in (last_resolved + 1..=top).rev() {
        let k = m + parity + 2 * i;
        ratio = -off_diagonal(m, k - 2, c)
            / (diagonal(m, k, c) - eigenvalue + off_diagonal(m, k, c) * ratio);
        ratios[i] = ratio;
    }

    coefficients.truncate(last_resolved + 1);
    for &r in &ratios[last_resolved + 1..=top] {
        let previous = coefficients[coefficients.len() - 1];
        coefficients.push(previous * r);
    }

    let norm = coefficients.iter().map(|v| v * v).sum::<f64>().sqrt();
    if !(norm.is_finite() && norm > 0.0) {
        return None;
    }
    coefficients.iter_mut().for_each(|v| *v /= norm);
    Some(coefficients)
}
