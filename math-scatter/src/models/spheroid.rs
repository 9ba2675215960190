//! Prolate spheroidal modal series (`psms`)
//!
//! The spheroid surface is the coordinate surface ξ = ξ₀ of prolate
//! spheroidal coordinates with semi-focal length q. Each (m, n) mode
//! contributes through its unit-norm angular functions at the incident and
//! scattered directions and a coefficient built from radial functions.
//!
//! For rigid and pressure-release spheroids every mode is independent. For
//! fluid-filled spheroids the interior modes have a different size
//! parameter, so for each order m the degrees n couple through the overlap
//! integrals of the two angular families. The interior degrees are truncated
//! at their own size parameter, which for a slow interior fluid gives more
//! equations than unknowns, and each order is solved in the least-squares
//! sense.

use super::{Fluid, neumann_factor, real};
use crate::boundary::BoundaryType;
use crate::error::{Result, ScatterError};
use crate::modal::{ModalSolution, TruncationPolicy, solve_coupled_system, sum_modes, wavenumber};
use crate::model::{AnalyticalType, ModelInfo, ScatteringModel, TsEstimate, check_boundary};
use crate::params::{ParameterSpec, RunRow, ValueKind};
use math_echo_special::ProlateSpheroidal;
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use std::f64::consts::PI;

const FLUID: &[BoundaryType] = &[BoundaryType::FluidFilled];

/// Incident angular functions below this do not contribute
const ANGULAR_CUTOFF: f64 = 1e-14;

static INFO: ModelInfo = ModelInfo {
    name: "psms",
    long_name: "prolate spheroidal modal series",
    analytical_type: AnalyticalType::Exact,
    boundary_types: &[
        BoundaryType::FixedRigid,
        BoundaryType::PressureRelease,
        BoundaryType::FluidFilled,
    ],
    shapes: &[],
    max_ka: None,
};

static PARAMETERS: &[ParameterSpec] = &[
    ParameterSpec::new("medium_c", "m/s", ValueKind::Positive),
    ParameterSpec::new("medium_rho", "kg/m³", ValueKind::Positive),
    ParameterSpec::new("a", "m", ValueKind::Positive),
    ParameterSpec::new("b", "m", ValueKind::Positive),
    ParameterSpec::new("theta", "°", ValueKind::Real),
    ParameterSpec::new("f", "Hz", ValueKind::Positive),
    ParameterSpec::new("boundary_type", "", ValueKind::Boundary),
    ParameterSpec::new("target_c", "m/s", ValueKind::Positive).when_boundary(FLUID),
    ParameterSpec::new("target_rho", "kg/m³", ValueKind::Positive).when_boundary(FLUID),
];

/// Spheroid geometry in spheroidal coordinates
#[derive(Debug, Clone, Copy)]
struct Spheroid {
    /// Radial coordinate of the surface
    xi: f64,
    /// Semi-focal length [m]
    q: f64,
}

impl Spheroid {
    fn new(a: f64, b: f64) -> Result<Self> {
        if b >= a {
            return Err(ScatterError::out_of_domain(
                INFO.name,
                format!("semi-minor axis {b} m must be smaller than semi-major axis {a} m"),
            ));
        }
        let xi = 1.0 / (1.0 - (b / a).powi(2)).sqrt();
        Ok(Self { xi, q: a / xi })
    }
}

/// Prolate spheroidal modal series model
#[derive(Debug, Clone, Default)]
pub struct ProlateSpheroidModalSeries {
    truncation: TruncationPolicy,
}

impl ProlateSpheroidModalSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_truncation(truncation: TruncationPolicy) -> Self {
        Self { truncation }
    }

    /// Backscattering amplitude of a spheroid with semi-axes `a` > `b`
    ///
    /// `theta` is in degrees, 90° at broadside. `target` is the interior
    /// fluid for fluid-filled spheroids.
    #[allow(clippy::too_many_arguments)]
    pub fn solve(
        &self,
        boundary_type: BoundaryType,
        medium: Fluid,
        a: f64,
        b: f64,
        theta: f64,
        frequency: f64,
        target: Option<Fluid>,
    ) -> Result<ModalSolution> {
        check_boundary(&INFO, boundary_type)?;
        let spheroid = Spheroid::new(a, b)?;
        let k = wavenumber(medium.c, frequency);
        let h = k * spheroid.q;
        let theta_i = theta.to_radians();
        let eta_i = theta_i.cos();
        let eta_s = (PI - theta_i).cos();

        let n_max = self.truncation.initial_order(k * a);
        // Orders beyond the largest degree vanish
        let policy = TruncationPolicy {
            max_order: self.truncation.max_order.min(n_max),
            ..self.truncation
        };

        let series = match boundary_type {
            BoundaryType::FixedRigid | BoundaryType::PressureRelease => {
                sum_modes(&policy, k * b, |m| {
                    if m > n_max {
                        return Ok(Complex64::default());
                    }
                    decoupled_order(boundary_type, m, h, spheroid.xi, n_max, eta_i, eta_s)
                })?
            }
            BoundaryType::FluidFilled => {
                let target = target.ok_or_else(|| ScatterError::MissingParameter {
                    name: "target_c".to_string(),
                })?;
                let k_interior = wavenumber(target.c, frequency);
                let coupling = FluidCoupling {
                    h,
                    h_interior: k_interior * spheroid.q,
                    g: target.rho / medium.rho,
                    xi: spheroid.xi,
                    n_max,
                    l_max: self.truncation.initial_order(k_interior * a).max(n_max),
                };
                sum_modes(&policy, k * b, |m| {
                    if m > n_max {
                        return Ok(Complex64::default());
                    }
                    coupling.order(m, eta_i, eta_s)
                })?
            }
            other => {
                return Err(ScatterError::UnsupportedBoundaryType {
                    model: INFO.name.to_string(),
                    boundary_type: other.to_string(),
                });
            }
        };

        Ok(ModalSolution::from_series(series, real(2.0 / (k * a)), a))
    }
}

/// Contribution of order m for a rigid or pressure-release surface
fn decoupled_order(
    boundary_type: BoundaryType,
    m: usize,
    h: f64,
    xi: f64,
    n_max: usize,
    eta_i: f64,
    eta_s: f64,
) -> Result<Complex64> {
    let functions = ProlateSpheroidal::new(m, h, n_max)?;
    let incident = functions.angular_all(eta_i);
    let scattered = functions.angular_all(eta_s);
    let weight = neumann_factor(m) * (m as f64 * PI).cos();

    let mut sum = Complex64::default();
    for (offset, (&s_i, &s_s)) in incident.iter().zip(&scattered).enumerate() {
        if s_i.abs() < ANGULAR_CUTOFF {
            continue;
        }
        let (r1, r2) = functions.radial(m + offset, xi)?;
        let coefficient = if boundary_type == BoundaryType::PressureRelease {
            -r1.value / Complex64::new(r1.value, r2.value)
        } else {
            -r1.derivative / Complex64::new(r1.derivative, r2.derivative)
        };
        sum += coefficient * (weight * s_i * s_s);
    }
    Ok(sum)
}

/// Interior coupling of a fluid-filled spheroid
struct FluidCoupling {
    h: f64,
    h_interior: f64,
    /// Density contrast
    g: f64,
    xi: f64,
    /// Highest exterior degree
    n_max: usize,
    /// Highest interior degree, at least `n_max`
    l_max: usize,
}

impl FluidCoupling {
    /// Contribution of order m, from the coupled system over degrees
    ///
    /// Rows are interior degrees l, columns exterior degrees n. Entries
    /// vanish unless n and l have the same parity.
    fn order(&self, m: usize, eta_i: f64, eta_s: f64) -> Result<Complex64> {
        let (n_max, l_max) = (self.n_max, self.l_max);
        let outer = ProlateSpheroidal::new(m, self.h, n_max)?;
        let inner = ProlateSpheroidal::new(m, self.h_interior, l_max)?;
        let incident = outer.angular_all(eta_i);
        let scattered = outer.angular_all(eta_s);

        let radial = (m..=n_max)
            .map(|n| outer.radial(n, self.xi))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let interior = (m..=l_max)
            .map(|l| inner.radial_first(l, self.xi))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let i_pow = |n: usize| Complex64::i().powu(n as u32);
        let mut matrix = Array2::from_elem((l_max - m + 1, n_max - m + 1), Complex64::default());
        let mut rhs = Array1::from_elem(l_max - m + 1, Complex64::default());
        for (row, l) in (m..=l_max).enumerate() {
            let ratio = interior[row].value / interior[row].derivative;
            for (col, n) in (m..=n_max).enumerate() {
                if (n + l) % 2 == 1 {
                    continue;
                }
                let alpha = outer.overlap(n, &inner, l);
                let (r1, r2) = radial[col];
                let e1 = r1.value - self.g * ratio * r1.derivative;
                let e3 = Complex64::new(r1.value, r2.value)
                    - self.g * ratio * Complex64::new(r1.derivative, r2.derivative);
                matrix[[row, col]] = -alpha * e3;
                rhs[row] += alpha * e1 * i_pow(n) * incident[col];
            }
        }

        let amplitudes = solve_coupled_system(&matrix, &rhs, m)?;
        let weight = neumann_factor(m) * (m as f64 * PI).cos();
        Ok((m..=n_max)
            .enumerate()
            .map(|(col, n)| amplitudes[col] / i_pow(n) * (weight * scattered[col]))
            .sum())
    }
}

impl ScatteringModel for ProlateSpheroidModalSeries {
    fn info(&self) -> &ModelInfo {
        &INFO
    }

    fn parameters(&self) -> &'static [ParameterSpec] {
        PARAMETERS
    }

    fn solve_single(&self, row: &RunRow) -> Result<TsEstimate> {
        let boundary_type = row.boundary_type()?;
        let target = if boundary_type == BoundaryType::FluidFilled {
            Some(Fluid::from_row(row, "target_c", "target_rho")?)
        } else {
            None
        };
        let solution = self.solve(
            boundary_type,
            Fluid::medium(row)?,
            row.number("a")?,
            row.number("b")?,
            row.number("theta")?,
            row.number("f")?,
            target,
        )?;
        Ok(TsEstimate::with_truncation(
            solution.ts(),
            solution.truncation(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ts(boundary_type: BoundaryType, target: Option<Fluid>) -> f64 {
        ts_in(Fluid::seawater(), boundary_type, target)
    }

    fn ts_in(medium: Fluid, boundary_type: BoundaryType, target: Option<Fluid>) -> f64 {
        ProlateSpheroidModalSeries::new()
            .solve(boundary_type, medium, 0.07, 0.01, 90.0, 38_000.0, target)
            .unwrap()
            .ts()
    }

    #[test]
    fn test_spheroid_coordinates() {
        let spheroid = Spheroid::new(0.07, 0.01).unwrap();
        // ξ₀ q = a and q² (ξ₀² - 1) = b²
        assert_abs_diff_eq!(spheroid.xi * spheroid.q, 0.07, epsilon = 1e-15);
        assert_abs_diff_eq!(
            spheroid.q.powi(2) * (spheroid.xi.powi(2) - 1.0),
            1e-4,
            epsilon = 1e-15
        );
        assert!(Spheroid::new(0.01, 0.01).unwrap_err().is_domain_error());
    }

    #[test]
    fn test_rigid_and_pressure_release() {
        assert_abs_diff_eq!(ts(BoundaryType::FixedRigid, None), -30.070954, epsilon = 0.01);
        assert_abs_diff_eq!(
            ts(BoundaryType::PressureRelease, None),
            -28.624147,
            epsilon = 0.01
        );
    }

    #[test]
    fn test_weak_fluid_spheroid() {
        let weak = Some(Fluid::new(1480.3, 1028.9));
        let benchmark_water = Fluid::new(1477.3, 1026.8);
        assert_abs_diff_eq!(
            ts_in(benchmark_water, BoundaryType::FluidFilled, weak),
            -77.2005,
            epsilon = 0.01
        );
        assert_abs_diff_eq!(ts(BoundaryType::FluidFilled, weak), -77.3452, epsilon = 0.01);
    }

    #[test]
    fn test_gas_filled_spheroid() {
        // Interior size parameter is about four times the exterior one
        let gas = ts(BoundaryType::FluidFilled, Some(Fluid::new(345.0, 1.24)));
        assert_abs_diff_eq!(gas, -28.6236, epsilon = 0.01);
        assert_abs_diff_eq!(gas, ts(BoundaryType::PressureRelease, None), epsilon = 0.01);
    }

    #[test]
    fn test_gas_filled_spheroid_is_stable_under_truncation() {
        let gas = Some(Fluid::new(345.0, 1.24));
        let solve = |extra_modes| {
            let truncation = TruncationPolicy {
                extra_modes,
                ..TruncationPolicy::default()
            };
            ProlateSpheroidModalSeries::with_truncation(truncation)
                .solve(
                    BoundaryType::FluidFilled,
                    Fluid::seawater(),
                    0.07,
                    0.01,
                    90.0,
                    38_000.0,
                    gas,
                )
                .unwrap()
                .ts()
        };
        assert_abs_diff_eq!(solve(6), solve(14), epsilon = 0.005);
    }

    #[test]
    fn test_oblate_is_out_of_domain() {
        let err = ProlateSpheroidModalSeries::new()
            .solve(
                BoundaryType::FixedRigid,
                Fluid::seawater(),
                0.01,
                0.02,
                90.0,
                38_000.0,
                None,
            )
            .unwrap_err();
        assert!(err.is_domain_error());
    }
}
