//! Modal series solution for fluid-like spheres and fluid shells
//!
//! The exterior field of mode n is jₙ(ka) + Aₙ hₙ(ka). The boundary type
//! decides which interior fields couple to Aₙ:
//!
//! | boundary type | unknowns | system |
//! |---|---|---|
//! | fixed rigid | Aₙ | closed form |
//! | pressure release | Aₙ | closed form |
//! | fluid filled | Aₙ, interior | 2×2 |
//! | fluid shell, pressure-release interior | Aₙ, shell jₙ, shell yₙ | 3×3 |
//! | fluid shell, fluid interior | Aₙ, shell jₙ, shell yₙ, interior | 4×4 |

use super::{Fluid, legendre_weight, real};
use crate::boundary::BoundaryType;
use crate::error::{Result, ScatterError};
use crate::modal::{
    ModalSolution, TruncationPolicy, clamp_size, solve_mode_system, sum_modes, wavenumber,
};
use crate::model::{
    AnalyticalType, ModelInfo, ScatteringModel, TsEstimate, check_boundary, check_max_ka,
};
use crate::params::{ParameterSpec, RunRow, ValueKind};
use math_echo_special::SphericalBesselTable;
use ndarray::array;
use num_complex::Complex64;
use std::f64::consts::PI;

const BOUNDARY_TYPES: &[BoundaryType] = &[
    BoundaryType::FixedRigid,
    BoundaryType::PressureRelease,
    BoundaryType::FluidFilled,
    BoundaryType::FluidShellFluidInterior,
    BoundaryType::FluidShellPressureReleaseInterior,
];

const FLUID_INTERIOR: &[BoundaryType] = &[
    BoundaryType::FluidFilled,
    BoundaryType::FluidShellFluidInterior,
];

const SHELLS: &[BoundaryType] = &[
    BoundaryType::FluidShellFluidInterior,
    BoundaryType::FluidShellPressureReleaseInterior,
];

static INFO: ModelInfo = ModelInfo {
    name: "mss",
    long_name: "modal series solution",
    analytical_type: AnalyticalType::Exact,
    boundary_types: BOUNDARY_TYPES,
    shapes: &[],
    max_ka: Some(20.0),
};

static PARAMETERS: &[ParameterSpec] = &[
    ParameterSpec::new("medium_c", "m/s", ValueKind::Positive),
    ParameterSpec::new("medium_rho", "kg/m³", ValueKind::Positive),
    ParameterSpec::new("a", "m", ValueKind::Positive),
    ParameterSpec::new("f", "Hz", ValueKind::Positive),
    ParameterSpec::new("boundary_type", "", ValueKind::Boundary),
    ParameterSpec::new("target_c", "m/s", ValueKind::Positive).when_boundary(FLUID_INTERIOR),
    ParameterSpec::new("target_rho", "kg/m³", ValueKind::Positive).when_boundary(FLUID_INTERIOR),
    ParameterSpec::new("shell_c", "m/s", ValueKind::Positive).when_boundary(SHELLS),
    ParameterSpec::new("shell_rho", "kg/m³", ValueKind::Positive).when_boundary(SHELLS),
    ParameterSpec::new("shell_thickness", "m", ValueKind::Positive).when_boundary(SHELLS),
];

/// A fluid shell of uniform thickness
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidShell {
    pub material: Fluid,
    /// [m]
    pub thickness: f64,
}

/// One resolved sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereProblem {
    pub boundary_type: BoundaryType,
    pub medium: Fluid,
    /// Outer radius [m]
    pub radius: f64,
    /// [Hz]
    pub frequency: f64,
    /// Interior fluid, for fluid-filled spheres and fluid-interior shells
    pub target: Option<Fluid>,
    pub shell: Option<FluidShell>,
}

impl SphereProblem {
    /// A sphere with no interior or shell
    pub fn new(boundary_type: BoundaryType, medium: Fluid, radius: f64, frequency: f64) -> Self {
        Self {
            boundary_type,
            medium,
            radius,
            frequency,
            target: None,
            shell: None,
        }
    }

    pub fn with_target(mut self, target: Fluid) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_shell(mut self, material: Fluid, thickness: f64) -> Self {
        self.shell = Some(FluidShell {
            material,
            thickness,
        });
        self
    }

    /// Read the values this row's boundary type needs
    pub fn from_row(row: &RunRow) -> Result<Self> {
        let boundary_type = row.boundary_type()?;
        let mut problem = Self::new(
            boundary_type,
            Fluid::medium(row)?,
            row.number("a")?,
            row.number("f")?,
        );
        if FLUID_INTERIOR.contains(&boundary_type) {
            problem.target = Some(Fluid::from_row(row, "target_c", "target_rho")?);
        }
        if SHELLS.contains(&boundary_type) {
            problem.shell = Some(FluidShell {
                material: Fluid::from_row(row, "shell_c", "shell_rho")?,
                thickness: row.number("shell_thickness")?,
            });
        }
        Ok(problem)
    }

    fn target(&self) -> Result<Fluid> {
        self.target.ok_or_else(|| ScatterError::MissingParameter {
            name: "target_c".to_string(),
        })
    }

    fn shell(&self) -> Result<FluidShell> {
        let shell = self.shell.ok_or_else(|| ScatterError::MissingParameter {
            name: "shell_c".to_string(),
        })?;
        if shell.thickness >= self.radius {
            return Err(ScatterError::DegenerateGeometry {
                reason: format!(
                    "shell thickness {} m leaves no interior in a sphere of radius {} m",
                    shell.thickness, self.radius
                ),
            });
        }
        Ok(shell)
    }
}

/// Modal series solution for spheres (`mss`)
#[derive(Debug, Clone, Default)]
pub struct ModalSeriesSphere {
    truncation: TruncationPolicy,
}

impl ModalSeriesSphere {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_truncation(truncation: TruncationPolicy) -> Self {
        Self { truncation }
    }

    pub fn truncation(&self) -> &TruncationPolicy {
        &self.truncation
    }

    /// Backscattering amplitude of one sphere
    pub fn solve(&self, problem: &SphereProblem) -> Result<ModalSolution> {
        check_boundary(&INFO, problem.boundary_type)?;
        let policy = &self.truncation;
        let ladder = policy.ladder_order();
        let bt = problem.boundary_type;
        let medium = problem.medium;
        let omega = 2.0 * PI * problem.frequency;
        let k = wavenumber(medium.c, problem.frequency);
        let a = problem.radius;
        check_max_ka(&INFO, k * a)?;
        let x = clamp_size(k * a);
        let outer = SphericalBesselTable::new(ladder, x);

        let series = match bt {
            BoundaryType::FixedRigid => sum_modes(policy, x, |n| {
                Ok(-outer.dj(n) / outer.dh(n) * legendre_weight(n))
            })?,
            BoundaryType::PressureRelease => sum_modes(policy, x, |n| {
                Ok(-outer.j(n) / outer.h(n) * legendre_weight(n))
            })?,
            BoundaryType::FluidFilled => {
                let target = problem.target()?;
                let gh = (target.rho / medium.rho) * (target.c / medium.c);
                let x1 = clamp_size(omega / target.c * a);
                let inner = SphericalBesselTable::new(ladder, x1);
                let max_size = x.max(x1);
                sum_modes(policy, max_size, |n| {
                    let matrix = array![
                        [outer.h(n), real(-inner.j(n))],
                        [outer.dh(n), real(-inner.dj(n) / gh)],
                    ];
                    let rhs = array![real(-outer.j(n)), real(-outer.dj(n))];
                    let coefficients = solve_mode_system(&matrix, &rhs, n, bt, max_size)?;
                    Ok(coefficients[0] * legendre_weight(n))
                })?
            }
            BoundaryType::FluidShellFluidInterior
            | BoundaryType::FluidShellPressureReleaseInterior => {
                let shell = problem.shell()?;
                let b = a - shell.thickness;
                let k2 = omega / shell.material.c;
                let q2 = (medium.rho / shell.material.rho) * (k2 / k);
                let shell_a = SphericalBesselTable::new(ladder, clamp_size(k2 * a));
                let shell_b = SphericalBesselTable::new(ladder, clamp_size(k2 * b));
                let mut max_size = x.max(k2 * a);

                let interior = if bt == BoundaryType::FluidShellFluidInterior {
                    let target = problem.target()?;
                    let k3 = omega / target.c;
                    let q3 = (shell.material.rho / target.rho) * (k3 / k2);
                    max_size = max_size.max(k3 * b);
                    Some((SphericalBesselTable::new(ladder, clamp_size(k3 * b)), q3))
                } else {
                    None
                };

                let zero = Complex64::default();
                sum_modes(policy, max_size, |n| {
                    let coefficients = match &interior {
                        None => {
                            let matrix = array![
                                [outer.h(n), real(-shell_a.j(n)), real(-shell_a.y(n))],
                                [
                                    outer.dh(n),
                                    real(-q2 * shell_a.dj(n)),
                                    real(-q2 * shell_a.dy(n))
                                ],
                                [zero, real(shell_b.j(n)), real(shell_b.y(n))],
                            ];
                            let rhs = array![real(-outer.j(n)), real(-outer.dj(n)), zero];
                            solve_mode_system(&matrix, &rhs, n, bt, max_size)?
                        }
                        Some((core, q3)) => {
                            let matrix = array![
                                [outer.h(n), real(-shell_a.j(n)), real(-shell_a.y(n)), zero],
                                [
                                    outer.dh(n),
                                    real(-q2 * shell_a.dj(n)),
                                    real(-q2 * shell_a.dy(n)),
                                    zero
                                ],
                                [
                                    zero,
                                    real(shell_b.j(n)),
                                    real(shell_b.y(n)),
                                    real(-core.j(n))
                                ],
                                [
                                    zero,
                                    real(shell_b.dj(n)),
                                    real(shell_b.dy(n)),
                                    real(-q3 * core.dj(n))
                                ],
                            ];
                            let rhs = array![real(-outer.j(n)), real(-outer.dj(n)), zero, zero];
                            solve_mode_system(&matrix, &rhs, n, bt, max_size)?
                        }
                    };
                    Ok(coefficients[0] * legendre_weight(n))
                })?
            }
            BoundaryType::Elastic | BoundaryType::ElasticShell => {
                return Err(ScatterError::UnsupportedBoundaryType {
                    model: INFO.name.to_string(),
                    boundary_type: bt.to_string(),
                });
            }
        };

        Ok(ModalSolution::from_series(
            series,
            Complex64::new(0.0, -1.0 / (k * a)),
            a,
        ))
    }
}

impl ScatteringModel for ModalSeriesSphere {
    fn info(&self) -> &ModelInfo {
        &INFO
    }

    fn parameters(&self) -> &'static [ParameterSpec] {
        PARAMETERS
    }

    fn solve_single(&self, row: &RunRow) -> Result<TsEstimate> {
        let solution = self.solve(&SphereProblem::from_row(row)?)?;
        Ok(TsEstimate::with_truncation(
            solution.ts(),
            solution.truncation(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ModelParameters, SharedParameters};
    use approx::assert_abs_diff_eq;
    use std::sync::Arc;

    fn sphere(boundary_type: BoundaryType) -> SphereProblem {
        SphereProblem::new(boundary_type, Fluid::seawater(), 0.01, 38_000.0)
    }

    fn ts(problem: &SphereProblem) -> f64 {
        ModalSeriesSphere::new().solve(problem).unwrap().ts()
    }

    #[test]
    fn test_rigid_sphere_benchmark() {
        let solution = ModalSeriesSphere::new()
            .solve(&sphere(BoundaryType::FixedRigid))
            .unwrap();
        assert!(solution.converged);
        assert_abs_diff_eq!(solution.ts(), -49.0883, epsilon = 0.01);
    }

    #[test]
    fn test_pressure_release_and_gas() {
        assert_abs_diff_eq!(
            ts(&sphere(BoundaryType::PressureRelease)),
            -44.99786,
            epsilon = 0.01
        );
        let gas = sphere(BoundaryType::FluidFilled).with_target(Fluid::new(345.0, 1.24));
        assert_abs_diff_eq!(ts(&gas), -44.98876, epsilon = 0.01);
    }

    #[test]
    fn test_weak_fluid_sphere() {
        let weak = sphere(BoundaryType::FluidFilled)
            .with_target(Fluid::new(1480.3, 1028.9));
        assert_abs_diff_eq!(ts(&weak), -94.2787, epsilon = 0.02);
    }

    #[test]
    fn test_fluid_shells() {
        let shell = Fluid::new(1480.3, 1028.9);
        let released =
            sphere(BoundaryType::FluidShellPressureReleaseInterior).with_shell(shell, 0.001);
        assert_abs_diff_eq!(ts(&released), -45.75292, epsilon = 0.01);

        let gas = sphere(BoundaryType::FluidShellFluidInterior)
            .with_shell(shell, 0.001)
            .with_target(Fluid::new(345.0, 1.24));
        assert_abs_diff_eq!(ts(&gas), -45.74787, epsilon = 0.01);
    }

    #[test]
    fn test_rigid_sphere_rayleigh_limit() {
        // |f| → (5/6) a (ka)² as ka → 0
        let mut problem = sphere(BoundaryType::FixedRigid);
        problem.frequency = 500.0;
        let ka = wavenumber(problem.medium.c, problem.frequency) * problem.radius;
        let expected = 20.0 * (5.0 / 6.0 * problem.radius * ka * ka).log10();
        assert_abs_diff_eq!(ts(&problem), expected, epsilon = 0.01);
    }

    #[test]
    fn test_benchmark_weak_sphere() {
        let weak = SphereProblem::new(
            BoundaryType::FluidFilled,
            Fluid::new(1477.3, 1026.8),
            0.01,
            38_000.0,
        )
        .with_target(Fluid::new(1480.3, 1028.9));
        assert_abs_diff_eq!(ts(&weak), -94.1345, epsilon = 0.01);
    }

    #[test]
    fn test_above_max_ka() {
        let mut problem = sphere(BoundaryType::FixedRigid);
        let k = wavenumber(problem.medium.c, problem.frequency);
        problem.radius = 19.9 / k;
        assert!(ModalSeriesSphere::new().solve(&problem).is_ok());

        problem.radius = 20.5 / k;
        let err = ModalSeriesSphere::new().solve(&problem).unwrap_err();
        assert!(err.is_domain_error());
        assert_eq!(ModalSeriesSphere::new().info().max_ka, Some(20.0));
    }

    #[test]
    fn test_shell_thicker_than_radius() {
        let problem = sphere(BoundaryType::FluidShellPressureReleaseInterior)
            .with_shell(Fluid::new(1480.3, 1028.9), 0.02);
        let err = ModalSeriesSphere::new().solve(&problem).unwrap_err();
        assert!(err.is_numeric_error());
    }

    #[test]
    fn test_solve_single_from_row() {
        let model = ModalSeriesSphere::new();
        let params = ModelParameters::new()
            .with("medium_c", 1477.4)
            .with("medium_rho", 1026.8)
            .with("a", 0.01)
            .with("f", 38_000.0)
            .with("boundary_type", "fluid filled");
        let shared = SharedParameters::new();
        let err = model.validate_parameters(&params, &shared).unwrap_err();
        assert_eq!(
            err,
            ScatterError::MissingParameter {
                name: "target_c".to_string()
            }
        );

        let row = RunRow::new(
            0,
            params
                .with("boundary_type", BoundaryType::PressureRelease)
                .iter()
                .map(|(name, value)| (name.to_string(), value.values()[0].clone()))
                .collect(),
            Arc::new(shared),
        );
        let estimate = model.solve_single(&row).unwrap();
        assert!(estimate.is_converged());
        assert_abs_diff_eq!(estimate.ts, -44.99786, epsilon = 0.01);
    }

    #[test]
    fn test_elastic_is_unsupported() {
        let err = ModalSeriesSphere::new()
            .solve(&sphere(BoundaryType::Elastic))
            .unwrap_err();
        assert!(err.is_configuration_error());
    }
}
