//! Elastic spheres and elastic shells (`es`)
//!
//! Inside an elastic body the field is a longitudinal potential and a
//! transverse (shear) potential, each a combination of spherical Bessel
//! functions. The boundary conditions at a fluid-solid interface are
//! continuity of normal displacement, normal stress equal to minus the
//! pressure, and vanishing shear stress.

use super::{Fluid, legendre_weight, real};
use crate::boundary::BoundaryType;
use crate::error::{Result, ScatterError};
use crate::modal::{
    ModalSolution, TruncationPolicy, clamp_size, solve_mode_system, sum_modes, wavenumber,
};
use crate::model::{AnalyticalType, ModelInfo, ScatteringModel, TsEstimate, check_boundary};
use crate::params::{
    ModelParameters, ParameterSpec, RunRow, SharedParameters, ValueKind, validate_parameter_set,
};
use math_echo_special::{SphericalBesselTable, SphericalKind};
use ndarray::{Array1, array};
use num_complex::Complex64;
use std::f64::consts::PI;

const SOLID: &[BoundaryType] = &[BoundaryType::Elastic];
const SHELL: &[BoundaryType] = &[BoundaryType::ElasticShell];
const BOTH: &[BoundaryType] = &[BoundaryType::Elastic, BoundaryType::ElasticShell];

static INFO: ModelInfo = ModelInfo {
    name: "es",
    long_name: "elastic sphere",
    analytical_type: AnalyticalType::Exact,
    boundary_types: BOTH,
    shapes: &[],
    max_ka: None,
};

static PARAMETERS: &[ParameterSpec] = &[
    ParameterSpec::new("medium_c", "m/s", ValueKind::Positive),
    ParameterSpec::new("medium_rho", "kg/m³", ValueKind::Positive),
    ParameterSpec::new("a", "m", ValueKind::Positive),
    ParameterSpec::new("f", "Hz", ValueKind::Positive),
    ParameterSpec::new("boundary_type", "", ValueKind::Boundary).optional(),
    ParameterSpec::new("target_longitudinal_c", "m/s", ValueKind::Positive).when_boundary(SOLID),
    ParameterSpec::new("target_transverse_c", "m/s", ValueKind::Positive).when_boundary(SOLID),
    ParameterSpec::new("target_rho", "kg/m³", ValueKind::Positive).when_boundary(BOTH),
    ParameterSpec::new("shell_longitudinal_c", "m/s", ValueKind::Positive).when_boundary(SHELL),
    ParameterSpec::new("shell_transverse_c", "m/s", ValueKind::Positive).when_boundary(SHELL),
    ParameterSpec::new("shell_rho", "kg/m³", ValueKind::Positive).when_boundary(SHELL),
    ParameterSpec::new("shell_thickness", "m", ValueKind::Positive).when_boundary(SHELL),
    ParameterSpec::new("target_c", "m/s", ValueKind::Positive).when_boundary(SHELL),
];

/// Isotropic elastic material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticMaterial {
    /// Longitudinal (compressional) wave speed [m/s]
    pub longitudinal_c: f64,
    /// Transverse (shear) wave speed [m/s]
    pub transverse_c: f64,
    /// [kg/m³]
    pub rho: f64,
}

impl ElasticMaterial {
    pub fn new(longitudinal_c: f64, transverse_c: f64, rho: f64) -> Self {
        Self {
            longitudinal_c,
            transverse_c,
            rho,
        }
    }

    /// Lamé parameters (λ, μ) [Pa]
    pub fn lame(&self) -> (f64, f64) {
        let mu = self.rho * self.transverse_c.powi(2);
        let lambda = self.rho * self.longitudinal_c.powi(2) - 2.0 * mu;
        (lambda, mu)
    }
}

/// What sits inside the fluid medium
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElasticTarget {
    Solid(ElasticMaterial),
    /// A shell of `thickness` filled with `interior` fluid
    Shell {
        shell: ElasticMaterial,
        thickness: f64,
        interior: Fluid,
    },
}

/// Displacements and stresses of the two potentials at one radius
///
/// Suffix `l` is the longitudinal potential, `t` the transverse one.
#[derive(Debug, Clone, Copy)]
struct InterfaceRows {
    radial_l: f64,
    radial_t: f64,
    normal_l: f64,
    normal_t: f64,
    shear_l: f64,
    shear_t: f64,
}

/// Evaluate [`InterfaceRows`] for mode `n` at radius `r`
///
/// `long` and `trans` hold the ladders at kL·r and kT·r, and `kind` picks
/// the regular or irregular solution for both potentials.
fn interface_rows(
    n: usize,
    r: f64,
    material: &ElasticMaterial,
    omega: f64,
    long: &SphericalBesselTable,
    trans: &SphericalBesselTable,
    kind: SphericalKind,
) -> InterfaceRows {
    let (lambda, mu) = material.lame();
    let kl = omega / material.longitudinal_c;
    let kt = omega / material.transverse_c;
    let nn = (n * (n + 1)) as f64;
    let xt = kt * r;

    let zl = long.value(kind, n);
    let dzl = long.derivative(kind, n);
    let d2zl = long.second_derivative(kind, n);
    let zt = trans.value(kind, n);
    let dzt = trans.derivative(kind, n);
    let d2zt = trans.second_derivative(kind, n);

    let radial_l = kl * dzl;
    let radial_t = nn * zt / r;
    let tangential_l = zl / r;
    let tangential_t = (zt + xt * dzt) / r;

    let d_radial_l = kl * kl * d2zl;
    let d_radial_t = nn * (kt * dzt / r - zt / (r * r));
    let d_tangential_l = kl * dzl / r - zl / (r * r);
    let d_tangential_t = (2.0 * kt * dzt + kt * xt * d2zt) / r - (zt + xt * dzt) / (r * r);

    InterfaceRows {
        radial_l,
        radial_t,
        normal_l: -lambda * kl * kl * zl + 2.0 * mu * d_radial_l,
        normal_t: 2.0 * mu * d_radial_t,
        shear_l: mu * (radial_l / r + d_tangential_l - tangential_l / r),
        shear_t: mu * (radial_t / r + d_tangential_t - tangential_t / r),
    }
}

/// Ladders of one material at one radius
struct MaterialTables {
    long: SphericalBesselTable,
    trans: SphericalBesselTable,
}

impl MaterialTables {
    fn new(ladder: usize, material: &ElasticMaterial, omega: f64, r: f64) -> Self {
        Self {
            long: SphericalBesselTable::new(
                ladder,
                clamp_size(omega / material.longitudinal_c * r),
            ),
            trans: SphericalBesselTable::new(ladder, clamp_size(omega / material.transverse_c * r)),
        }
    }

    fn rows(
        &self,
        n: usize,
        r: f64,
        material: &ElasticMaterial,
        omega: f64,
        kind: SphericalKind,
    ) -> InterfaceRows {
        interface_rows(n, r, material, omega, &self.long, &self.trans, kind)
    }
}

/// Modal series solution for elastic spheres and shells
#[derive(Debug, Clone, Default)]
pub struct ElasticSphere {
    truncation: TruncationPolicy,
}

impl ElasticSphere {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_truncation(truncation: TruncationPolicy) -> Self {
        Self { truncation }
    }

    /// Backscattering amplitude of an elastic target of outer radius `a`
    pub fn solve(
        &self,
        medium: Fluid,
        a: f64,
        frequency: f64,
        target: &ElasticTarget,
    ) -> Result<ModalSolution> {
        let policy = &self.truncation;
        let ladder = policy.ladder_order();
        let omega = 2.0 * PI * frequency;
        let k = wavenumber(medium.c, frequency);
        let x = clamp_size(k * a);
        let outer = SphericalBesselTable::new(ladder, x);
        // Converts the pressure gradient to normal displacement
        let ext = k / (medium.rho * omega * omega);
        let zero = Complex64::default();

        let series = match *target {
            ElasticTarget::Solid(material) => {
                let bt = BoundaryType::Elastic;
                let tables = MaterialTables::new(ladder, &material, omega, a);
                let max_size = x.max(omega / material.transverse_c * a);
                sum_modes(policy, max_size, |n| {
                    let s = tables.rows(n, a, &material, omega, SphericalKind::First);
                    let mut matrix = array![
                        [ext * outer.dh(n), real(-s.radial_l), real(-s.radial_t)],
                        [outer.h(n), real(s.normal_l), real(s.normal_t)],
                        [zero, real(s.shear_l), real(s.shear_t)],
                    ];
                    if n == 0 {
                        matrix.row_mut(2).assign(&array![zero, zero, real(1.0)]);
                    }
                    let rhs = array![real(-ext * outer.dj(n)), real(-outer.j(n)), zero];
                    let coefficients = solve_mode_system(&matrix, &rhs, n, bt, max_size)?;
                    Ok(coefficients[0] * legendre_weight(n))
                })?
            }
            ElasticTarget::Shell {
                shell,
                thickness,
                interior,
            } => {
                let bt = BoundaryType::ElasticShell;
                if thickness >= a {
                    return Err(ScatterError::DegenerateGeometry {
                        reason: format!(
                            "shell thickness {thickness} m leaves no interior in a sphere of radius {a} m"
                        ),
                    });
                }
                let b = a - thickness;
                let at_a = MaterialTables::new(ladder, &shell, omega, a);
                let at_b = MaterialTables::new(ladder, &shell, omega, b);
                let k3 = omega / interior.c;
                let core = SphericalBesselTable::new(ladder, clamp_size(k3 * b));
                let inn = k3 / (interior.rho * omega * omega);
                let max_size = x.max(omega / shell.transverse_c * a).max(k3 * b);

                sum_modes(policy, max_size, |n| {
                    let aj = at_a.rows(n, a, &shell, omega, SphericalKind::First);
                    let ay = at_a.rows(n, a, &shell, omega, SphericalKind::Second);
                    let bj = at_b.rows(n, b, &shell, omega, SphericalKind::First);
                    let by = at_b.rows(n, b, &shell, omega, SphericalKind::Second);

                    // Unknowns: A, L·j, L·y, T·j, T·y, interior
                    let mut matrix = array![
                        [
                            ext * outer.dh(n),
                            real(-aj.radial_l),
                            real(-ay.radial_l),
                            real(-aj.radial_t),
                            real(-ay.radial_t),
                            zero,
                        ],
                        [
                            outer.h(n),
                            real(aj.normal_l),
                            real(ay.normal_l),
                            real(aj.normal_t),
                            real(ay.normal_t),
                            zero,
                        ],
                        [
                            zero,
                            real(aj.shear_l),
                            real(ay.shear_l),
                            real(aj.shear_t),
                            real(ay.shear_t),
                            zero,
                        ],
                        [
                            zero,
                            real(bj.radial_l),
                            real(by.radial_l),
                            real(bj.radial_t),
                            real(by.radial_t),
                            real(-inn * core.dj(n)),
                        ],
                        [
                            zero,
                            real(bj.normal_l),
                            real(by.normal_l),
                            real(bj.normal_t),
                            real(by.normal_t),
                            real(core.j(n)),
                        ],
                        [
                            zero,
                            real(bj.shear_l),
                            real(by.shear_l),
                            real(bj.shear_t),
                            real(by.shear_t),
                            zero,
                        ],
                    ];
                    if n == 0 {
                        // No shear at n = 0: pin both transverse amplitudes
                        matrix.row_mut(2).fill(zero);
                        matrix[[2, 3]] = real(1.0);
                        matrix.row_mut(5).fill(zero);
                        matrix[[5, 4]] = real(1.0);
                    }
                    let mut rhs = Array1::from_elem(6, zero);
                    rhs[0] = real(-ext * outer.dj(n));
                    rhs[1] = real(-outer.j(n));
                    let coefficients = solve_mode_system(&matrix, &rhs, n, bt, max_size)?;
                    Ok(coefficients[0] * legendre_weight(n))
                })?
            }
        };

        Ok(ModalSolution::from_series(
            series,
            Complex64::new(0.0, -1.0 / (k * a)),
            a,
        ))
    }

    fn target_from_row(row: &RunRow, boundary_type: BoundaryType) -> Result<ElasticTarget> {
        match boundary_type {
            BoundaryType::Elastic => Ok(ElasticTarget::Solid(ElasticMaterial::new(
                row.number("target_longitudinal_c")?,
                row.number("target_transverse_c")?,
                row.number("target_rho")?,
            ))),
            BoundaryType::ElasticShell => Ok(ElasticTarget::Shell {
                shell: ElasticMaterial::new(
                    row.number("shell_longitudinal_c")?,
                    row.number("shell_transverse_c")?,
                    row.number("shell_rho")?,
                ),
                thickness: row.number("shell_thickness")?,
                interior: Fluid::from_row(row, "target_c", "target_rho")?,
            }),
            other => Err(ScatterError::UnsupportedBoundaryType {
                model: INFO.name.to_string(),
                boundary_type: other.to_string(),
            }),
        }
    }
}

impl ScatteringModel for ElasticSphere {
    fn info(&self) -> &ModelInfo {
        &INFO
    }

    fn parameters(&self) -> &'static [ParameterSpec] {
        PARAMETERS
    }

    /// An absent `boundary_type` means an elastic solid, whose material
    /// parameters are then required
    fn validate_parameters(
        &self,
        expandable: &ModelParameters,
        shared: &SharedParameters,
    ) -> Result<()> {
        validate_parameter_set(&INFO, PARAMETERS, expandable, shared)?;
        if !expandable.contains("boundary_type") {
            for name in ["target_longitudinal_c", "target_transverse_c", "target_rho"] {
                if !expandable.contains(name) {
                    return Err(ScatterError::MissingParameter {
                        name: name.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn solve_single(&self, row: &RunRow) -> Result<TsEstimate> {
        let boundary_type = row.boundary_type_or(BoundaryType::Elastic)?;
        check_boundary(&INFO, boundary_type)?;
        let target = Self::target_from_row(row, boundary_type)?;
        let solution = self.solve(
            Fluid::medium(row)?,
            row.number("a")?,
            row.number("f")?,
            &target,
        )?;
        Ok(TsEstimate::with_truncation(
            solution.ts(),
            solution.truncation(),
        ))
    }
}
