//! High-pass model (`hp`)
//!
//! Stanton's (1989) heuristic formulas join the Rayleigh limit of a
//! small fluid-like body to the geometric limit of a large one. They cover
//! spheres, prolate spheroids, straight cylinders and uniformly bent
//! cylinders, optionally with empirical factors for irregular shapes.

use super::decibels;
use crate::boundary::{BoundaryType, Shape};
use crate::error::Result;
use crate::modal::{sinc, wavenumber};
use crate::model::{
    AnalyticalType, ModelInfo, ScatteringModel, TsEstimate, check_boundary, check_max_ka,
};
use crate::params::{ParameterSpec, RunRow, ValueKind};
use std::f64::consts::PI;

/// Contrast standing in for an infinitely rigid, dense target
const RIGID_CONTRAST: f64 = 1e20;

const RIGID: &[BoundaryType] = &[BoundaryType::FixedRigid];

static INFO: ModelInfo = ModelInfo {
    name: "hp",
    long_name: "high pass",
    analytical_type: AnalyticalType::Approximate,
    boundary_types: &[
        BoundaryType::FluidFilled,
        BoundaryType::Elastic,
        BoundaryType::FixedRigid,
    ],
    shapes: &[
        Shape::Sphere,
        Shape::ProlateSpheroid,
        Shape::Cylinder,
        Shape::BentCylinder,
    ],
    max_ka: Some(20.0),
};

static PARAMETERS: &[ParameterSpec] = &[
    ParameterSpec::new("shape", "", ValueKind::Shape),
    ParameterSpec::new("medium_c", "m/s", ValueKind::Positive),
    ParameterSpec::new("a", "m", ValueKind::Positive),
    ParameterSpec::new("f", "Hz", ValueKind::Positive),
    ParameterSpec::new("boundary_type", "", ValueKind::Boundary),
    ParameterSpec::new("medium_rho", "kg/m³", ValueKind::Positive).unless_boundary(RIGID),
    ParameterSpec::new("target_c", "m/s", ValueKind::Positive).unless_boundary(RIGID),
    ParameterSpec::new("target_rho", "kg/m³", ValueKind::Positive).unless_boundary(RIGID),
    ParameterSpec::new("theta", "°", ValueKind::Real).when_shape(&[Shape::Cylinder]),
    ParameterSpec::new("L", "m", ValueKind::Positive).when_shape(&[
        Shape::ProlateSpheroid,
        Shape::Cylinder,
        Shape::BentCylinder,
    ]),
    ParameterSpec::new("rho_c", "m", ValueKind::Positive).when_shape(&[Shape::BentCylinder]),
    ParameterSpec::new("irregular", "", ValueKind::Flag).optional(),
];

/// Empirical corrections (F, G) for irregular shapes
///
/// Fluid-filled bodies get a damped resonance G around a shape-specific
/// ka; elastic and rigid bodies only change F.
fn irregular_factors(shape: Shape, boundary_type: BoundaryType, ka: f64) -> (f64, f64) {
    let fluid = boundary_type == BoundaryType::FluidFilled;
    let resonance = |centre: f64| 1.0 - 0.8 * (-2.5 * (ka - centre).powi(2)).exp();
    match (shape, fluid) {
        (Shape::Sphere, true) => (40.0 * ka.powf(-0.4), resonance(2.25)),
        (Shape::Sphere, false) => (15.0 * ka.powf(-1.9), 1.0),
        (Shape::ProlateSpheroid, true) => (2.5 * ka.powf(1.65), resonance(2.3)),
        (Shape::ProlateSpheroid, false) => (1.8 * ka.powf(-0.4), 1.0),
        (Shape::Cylinder, true) => (3.0 * ka.powf(0.65), resonance(2.0)),
        (Shape::Cylinder, false) => (3.5 / ka, 1.0),
        (Shape::BentCylinder, true) => (3.0 * ka.powf(0.65), resonance(2.0)),
        (Shape::BentCylinder, false) => (2.5 / ka, 1.0),
    }
}

/// Stanton high-pass model
#[derive(Debug, Clone, Copy, Default)]
pub struct HighPass;

impl HighPass {
    pub fn new() -> Self {
        Self
    }

    /// Backscattering cross-section σ_bs [m²] of one row
    pub fn sigma(&self, row: &RunRow) -> Result<f64> {
        let shape = row.shape()?;
        let boundary_type = row.boundary_type()?;
        check_boundary(&INFO, boundary_type)?;
        let medium_c = row.number("medium_c")?;
        let a = row.number("a")?;
        let k = wavenumber(medium_c, row.number("f")?);
        let ka = k * a;
        check_max_ka(&INFO, ka)?;

        let (g, h) = if boundary_type == BoundaryType::FixedRigid {
            (RIGID_CONTRAST, RIGID_CONTRAST)
        } else {
            (
                row.number("target_rho")? / row.number("medium_rho")?,
                row.number("target_c")? / medium_c,
            )
        };
        let gh2 = g * h * h;
        let reflection = (g * h - 1.0) / (g * h + 1.0);
        let alpha_sphere = (1.0 - gh2) / (3.0 * gh2) + (1.0 - g) / (1.0 + 2.0 * g);
        let alpha_cylinder = (1.0 - gh2) / (2.0 * gh2) + (1.0 - g) / (1.0 + g);

        let (f, g_factor) = if row.flag_or("irregular", false)? {
            irregular_factors(shape, boundary_type, ka)
        } else {
            (1.0, 1.0)
        };
        let r2f = reflection * reflection * f;

        let sigma = match shape {
            Shape::Sphere => {
                let core = ka.powi(4) * alpha_sphere.powi(2);
                a * a * core * g_factor / (1.0 + 4.0 * core / r2f)
            }
            Shape::ProlateSpheroid => {
                let length = row.number("L")?;
                let core = ka.powi(4) * alpha_cylinder.powi(2);
                length * length / 9.0 * core * g_factor / (1.0 + 16.0 / 9.0 * core / r2f)
            }
            Shape::Cylinder => {
                let length = row.number("L")?;
                let (sin, cos) = row.number("theta")?.to_radians().sin_cos();
                let directivity = sinc(k * length * cos);
                let core = (k * sin * a).powi(4) * alpha_cylinder.powi(2);
                0.25 * length * length * core * directivity.powi(2) * g_factor
                    / (1.0 + PI * core / r2f)
            }
            Shape::BentCylinder => {
                let length = row.number("L")?;
                let rho_c = row.number("rho_c")?;
                let core = ka.powi(4) * alpha_cylinder.powi(2);
                0.25 * length * length * core * g_factor
                    / (1.0 + length * length * core / (rho_c * a * r2f))
            }
        };
        Ok(sigma)
    }
}

impl ScatteringModel for HighPass {
    fn info(&self) -> &ModelInfo {
        &INFO
    }

    fn parameters(&self) -> &'static [ParameterSpec] {
        PARAMETERS
    }

    fn solve_single(&self, row: &RunRow) -> Result<TsEstimate> {
        Ok(TsEstimate::new(decibels(self.sigma(row)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ModelParameters, Scalar, SharedParameters};
    use approx::assert_abs_diff_eq;
    use indexmap::IndexMap;
    use std::sync::Arc;

    fn row(values: &[(&str, Scalar)]) -> RunRow {
        let values: IndexMap<String, Scalar> = values
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        RunRow::new(0, values, Arc::new(SharedParameters::new()))
    }

    fn sphere(boundary_type: &str, target: Option<(f64, f64)>) -> RunRow {
        let mut values = vec![
            ("shape", Scalar::from("sphere")),
            ("medium_c", Scalar::from(1500.0)),
            ("medium_rho", Scalar::from(1024.0)),
            ("a", Scalar::from(0.01)),
            ("f", Scalar::from(38_000.0)),
            ("boundary_type", Scalar::from(boundary_type)),
        ];
        if let Some((c, rho)) = target {
            values.push(("target_c", Scalar::from(c)));
            values.push(("target_rho", Scalar::from(rho)));
        }
        row(&values)
    }

    fn ts(row: &RunRow) -> f64 {
        HighPass.solve_single(row).unwrap().ts
    }

    #[test]
    fn test_sphere_benchmarks() {
        assert_abs_diff_eq!(ts(&sphere("fixed rigid", None)), -46.25757, epsilon = 1e-3);
        assert_abs_diff_eq!(
            ts(&sphere("elastic", Some((1600.0, 1600.0)))),
            -58.19255,
            epsilon = 1e-3
        );
        assert_abs_diff_eq!(
            ts(&sphere("fluid filled", Some((1510.0, 1025.0)))),
            -94.49679,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_cylinder_broadside_peak() {
        let cylinder = |theta: f64| {
            row(&[
                ("shape", Scalar::from("cylinder")),
                ("medium_c", Scalar::from(1500.0)),
                ("a", Scalar::from(0.005)),
                ("f", Scalar::from(38_000.0)),
                ("boundary_type", Scalar::from("fixed rigid")),
                ("L", Scalar::from(0.05)),
                ("theta", Scalar::from(theta)),
            ])
        };
        let broadside = ts(&cylinder(90.0));
        assert!(broadside.is_finite());
        assert!(ts(&cylinder(75.0)) < broadside);
    }

    #[test]
    fn test_irregular_sphere_differs() {
        let mut values = vec![
            ("shape", Scalar::from("sphere")),
            ("medium_c", Scalar::from(1500.0)),
            ("a", Scalar::from(0.01)),
            ("f", Scalar::from(38_000.0)),
            ("boundary_type", Scalar::from("fixed rigid")),
        ];
        let smooth = ts(&row(&values));
        values.push(("irregular", Scalar::from(true)));
        let irregular = ts(&row(&values));
        assert!((smooth - irregular).abs() > 0.1);
    }

    #[test]
    fn test_above_max_ka() {
        let mut large = sphere("fixed rigid", None);
        large = RunRow::new(
            0,
            large
                .values()
                .iter()
                .map(|(name, value)| {
                    let value = if name == "a" {
                        Scalar::from(0.2)
                    } else {
                        value.clone()
                    };
                    (name.clone(), value)
                })
                .collect(),
            large.shared_handle().clone(),
        );
        let err = HighPass.solve_single(&large).unwrap_err();
        assert!(err.is_domain_error());
    }

    #[test]
    fn test_shape_specific_requirements() {
        let shared = SharedParameters::new();
        let params = ModelParameters::new()
            .with("shape", vec!["sphere", "bent cylinder"])
            .with("medium_c", 1500.0)
            .with("a", 0.01)
            .with("f", 38_000.0)
            .with("boundary_type", "fixed rigid")
            .with("L", 0.1);
        let err = HighPass.validate_parameters(&params, &shared).unwrap_err();
        assert_eq!(err.to_string(), "missing required parameter 'rho_c'");

        let rigid_only = ModelParameters::new()
            .with("shape", "sphere")
            .with("medium_c", 1500.0)
            .with("a", 0.01)
            .with("f", 38_000.0)
            .with("boundary_type", "fixed rigid");
        assert!(HighPass.validate_parameters(&rigid_only, &shared).is_ok());
    }
}
