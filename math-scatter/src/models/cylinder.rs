//! Deformed cylinder model (`dcm`)
//!
//! A finite cylinder is treated as a slice of an infinite one: the modal
//! series of the infinite cylinder at the normal wavenumber K = k sin θ is
//! weighted by the directivity sinc(kL cos θ) of a line of length L.

use super::{Fluid, neumann_factor, real};
use crate::boundary::BoundaryType;
use crate::error::{Result, ScatterError};
use crate::modal::{
    ModalSolution, TruncationPolicy, clamp_size, sinc, solve_mode_system, sum_modes, wavenumber,
};
use crate::model::{
    AnalyticalType, ModelInfo, ScatteringModel, TsEstimate, check_boundary, check_max_ka,
};
use crate::params::{ParameterSpec, RunRow, ValueKind};
use math_echo_special::CylindricalBesselTable;
use ndarray::array;
use std::f64::consts::PI;

const FLUID: &[BoundaryType] = &[BoundaryType::FluidFilled];

static INFO: ModelInfo = ModelInfo {
    name: "dcm",
    long_name: "deformed cylinder model",
    analytical_type: AnalyticalType::Approximate,
    boundary_types: &[
        BoundaryType::FixedRigid,
        BoundaryType::PressureRelease,
        BoundaryType::FluidFilled,
    ],
    shapes: &[],
    max_ka: Some(20.0),
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

/// Bessel ladders that grow on demand
///
/// Cylindrical functions come from `spec_math` one order at a time, so the
/// table is sized to the first truncation pass and rebuilt when a probe or
/// extension runs past it.
struct GrowingTable {
    table: CylindricalBesselTable,
}

impl GrowingTable {
    fn new(order: usize, x: f64) -> Self {
        Self {
            table: CylindricalBesselTable::new(order, x),
        }
    }

    fn at(&mut self, n: usize) -> &CylindricalBesselTable {
        if n > self.table.max_order() {
            let x = self.table.argument();
            self.table = CylindricalBesselTable::new(2 * n, x);
        }
        &self.table
    }
}

/// Deformed cylinder model for straight finite cylinders
#[derive(Debug, Clone, Default)]
pub struct DeformedCylinder {
    truncation: TruncationPolicy,
}

impl DeformedCylinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_truncation(truncation: TruncationPolicy) -> Self {
        Self { truncation }
    }

    /// Backscattering amplitude of a cylinder of `radius` and `length`
    ///
    /// `theta` is in degrees, with 90° at normal incidence. `target` is the
    /// interior fluid for fluid-filled cylinders.
    #[allow(clippy::too_many_arguments)]
    pub fn solve(
        &self,
        boundary_type: BoundaryType,
        medium: Fluid,
        radius: f64,
        length: f64,
        theta: f64,
        frequency: f64,
        target: Option<Fluid>,
    ) -> Result<ModalSolution> {
        check_boundary(&INFO, boundary_type)?;
        let k = wavenumber(medium.c, frequency);
        check_max_ka(&INFO, k * radius)?;

        let policy = &self.truncation;
        let (sin, cos) = theta.to_radians().sin_cos();
        let ka_normal = clamp_size(k * sin.abs() * radius);
        let first_pass = policy.initial_order(ka_normal) + policy.probe_modes;
        let mut outer = GrowingTable::new(first_pass, ka_normal);
        let bt = boundary_type;

        let series = match bt {
            BoundaryType::FixedRigid => sum_modes(policy, ka_normal, |m| {
                let t = outer.at(m);
                Ok(-t.dj(m) / t.dh(m) * term_weight(m))
            })?,
            BoundaryType::PressureRelease => sum_modes(policy, ka_normal, |m| {
                let t = outer.at(m);
                Ok(-t.j(m) / t.h(m) * term_weight(m))
            })?,
            BoundaryType::FluidFilled => {
                let target = target.ok_or_else(|| ScatterError::MissingParameter {
                    name: "target_c".to_string(),
                })?;
                let gh = (target.rho / medium.rho) * (target.c / medium.c);
                let inner_size = clamp_size(ka_normal * medium.c / target.c);
                let max_size = ka_normal.max(inner_size);
                let mut inner = GrowingTable::new(first_pass, inner_size);
                sum_modes(policy, max_size, |m| {
                    let o = outer.at(m);
                    let (h, dh, j, dj) = (o.h(m), o.dh(m), o.j(m), o.dj(m));
                    let i = inner.at(m);
                    let matrix = array![[h, real(-i.j(m))], [dh, real(-i.dj(m) / gh)]];
                    let rhs = array![real(-j), real(-dj)];
                    let coefficients = solve_mode_system(&matrix, &rhs, m, bt, max_size)?;
                    Ok(coefficients[0] * term_weight(m))
                })?
            }
            other => {
                return Err(ScatterError::UnsupportedBoundaryType {
                    model: INFO.name.to_string(),
                    boundary_type: other.to_string(),
                });
            }
        };

        let directivity = sinc(k * length * cos);
        Ok(ModalSolution::from_series(
            series,
            real(directivity / PI),
            length,
        ))
    }
}

/// εₘ (-1)ᵐ
fn term_weight(m: usize) -> f64 {
    let sign = if m % 2 == 0 { 1.0 } else { -1.0 };
    sign * neumann_factor(m)
}

impl ScatteringModel for DeformedCylinder {
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
