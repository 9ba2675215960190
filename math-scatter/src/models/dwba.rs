//! Distorted-wave Born approximation along a body outline (`dwba`)
//!
//! Valid for weakly scattering fluid bodies whose density and sound-speed
//! contrasts are close to one. The body is a line of circular discs, each
//! contributing the form function of a thin cylindrical slice; the
//! contributions are integrated along the centreline with the trapezoid
//! rule.

use super::{Fluid, real};
use crate::boundary::BoundaryType;
use crate::error::Result;
use crate::geometry::{BodyOutline, dot, norm, sub};
use crate::modal::wavenumber;
use crate::model::{
    AnalyticalType, ModelInfo, ScatteringModel, TsEstimate, check_boundary, check_max_ka,
};
use crate::params::{ParameterSpec, RunRow, ValueKind};
use math_echo_special::bessel_j;
use num_complex::Complex64;

/// Below this |cos β| the slice is seen end-on and J₁(x)/cos β → k₂a
const END_ON: f64 = 1e-10;

static INFO: ModelInfo = ModelInfo {
    name: "dwba",
    long_name: "distorted-wave Born approximation",
    analytical_type: AnalyticalType::Approximate,
    boundary_types: &[BoundaryType::FluidFilled],
    shapes: &[],
    max_ka: Some(20.0),
};

static PARAMETERS: &[ParameterSpec] = &[
    ParameterSpec::new("medium_c", "m/s", ValueKind::Positive),
    ParameterSpec::new("medium_rho", "kg/m³", ValueKind::Positive),
    ParameterSpec::new("theta", "°", ValueKind::Real),
    ParameterSpec::new("f", "Hz", ValueKind::Positive),
    ParameterSpec::new("target_c", "m/s", ValueKind::Positive),
    ParameterSpec::new("target_rho", "kg/m³", ValueKind::Positive),
    ParameterSpec::new("outline", "", ValueKind::Outline),
    ParameterSpec::new("boundary_type", "", ValueKind::Boundary).optional(),
];

/// DWBA model for weakly scattering bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct Dwba;

impl Dwba {
    pub fn new() -> Self {
        Self
    }

    /// Backscattering amplitude [m] of `outline` filled with `target`
    ///
    /// `theta` is in degrees; the incident direction is (cos θ, 0, sin θ).
    pub fn amplitude(
        &self,
        outline: &BodyOutline,
        medium: Fluid,
        target: Fluid,
        theta: f64,
        frequency: f64,
    ) -> Result<Complex64> {
        let k1 = wavenumber(medium.c, frequency);
        check_max_ka(&INFO, k1 * outline.max_radius())?;

        let g = target.rho / medium.rho;
        let h = target.c / medium.c;
        let k2 = k1 / h;
        let gamma_kappa = (1.0 - g * h * h) / (g * h * h);
        let gamma_rho = (g - 1.0) / g;
        let contrast = gamma_kappa - gamma_rho;
        let (sin, cos) = theta.to_radians().sin_cos();
        let direction = [cos, 0.0, sin];

        let integrand: Vec<Complex64> = outline
            .centres
            .iter()
            .zip(&outline.tangents)
            .zip(&outline.radii)
            .map(|((&centre, &tangent), &a)| {
                let along = dot(direction, tangent);
                let cos_beta = (1.0 - along * along).max(0.0).sqrt();
                let slice = if cos_beta < END_ON {
                    k2 * a
                } else {
                    bessel_j(1, 2.0 * k2 * a * cos_beta) / cos_beta
                };
                Complex64::from_polar(contrast * a * slice, 2.0 * k2 * dot(direction, centre))
            })
            .collect();

        let sum: Complex64 = outline
            .centres
            .windows(2)
            .zip(integrand.windows(2))
            .map(|(centres, values)| {
                (values[0] + values[1]) * (0.5 * norm(sub(centres[1], centres[0])))
            })
            .sum();
        Ok(sum * real(k1 / 4.0))
    }
}

impl ScatteringModel for Dwba {
    fn info(&self) -> &ModelInfo {
        &INFO
    }

    fn parameters(&self) -> &'static [ParameterSpec] {
        PARAMETERS
    }

    fn solve_single(&self, row: &RunRow) -> Result<TsEstimate> {
        check_boundary(&INFO, row.boundary_type_or(BoundaryType::FluidFilled)?)?;
        let amplitude = self.amplitude(
            row.shared().outline("outline")?,
            Fluid::medium(row)?,
            Fluid::from_row(row, "target_c", "target_rho")?,
            row.number("theta")?,
            row.number("f")?,
        )?;
        Ok(TsEstimate::new(20.0 * amplitude.norm().log10()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DEFAULT_DISC_SPACING;
    use crate::params::{ModelParameters, SharedParameters};
    use approx::assert_abs_diff_eq;

    fn weak() -> Fluid {
        Fluid::new(1480.3, 1028.9)
    }

    fn ts(outline: &BodyOutline, theta: f64) -> f64 {
        let amplitude = Dwba
            .amplitude(outline, Fluid::seawater(), weak(), theta, 38_000.0)
            .unwrap();
        20.0 * amplitude.norm().log10()
    }

    #[test]
    fn test_weak_benchmarks() {
        let sphere = BodyOutline::spheroid(0.01, 0.01, DEFAULT_DISC_SPACING).unwrap();
        assert_abs_diff_eq!(ts(&sphere, 90.0), -94.2367, epsilon = 0.01);
        let spheroid = BodyOutline::spheroid(0.07, 0.01, DEFAULT_DISC_SPACING).unwrap();
        assert_abs_diff_eq!(ts(&spheroid, 90.0), -77.3344, epsilon = 0.01);
        let cylinder = BodyOutline::cylinder(0.01, 0.07, DEFAULT_DISC_SPACING).unwrap();
        assert_abs_diff_eq!(ts(&cylinder, 90.0), -84.9301, epsilon = 0.01);
    }

    #[test]
    fn test_end_on_slices_are_finite() {
        let cylinder = BodyOutline::cylinder(0.01, 0.07, 1e-3).unwrap();
        assert!(ts(&cylinder, 0.0).is_finite());
        assert!(ts(&cylinder, 0.0) < ts(&cylinder, 90.0));
    }

    #[test]
    fn test_no_contrast_is_silent() {
        let cylinder = BodyOutline::cylinder(0.01, 0.07, 1e-3).unwrap();
        let amplitude = Dwba
            .amplitude(&cylinder, Fluid::seawater(), Fluid::seawater(), 90.0, 38_000.0)
            .unwrap();
        assert_abs_diff_eq!(amplitude.norm(), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_outline_must_be_shared() {
        let params = ModelParameters::new()
            .with("medium_c", 1477.4)
            .with("medium_rho", 1026.8)
            .with("theta", 90.0)
            .with("f", 38_000.0)
            .with("target_c", 1480.3)
            .with("target_rho", 1028.9);
        let shared = SharedParameters::new();
        let err = Dwba.validate_parameters(&params, &shared).unwrap_err();
        assert_eq!(err.to_string(), "missing required parameter 'outline'");

        let shared = shared.with(
            "outline",
            BodyOutline::cylinder(0.01, 0.07, DEFAULT_DISC_SPACING).unwrap(),
        );
        assert!(Dwba.validate_parameters(&params, &shared).is_ok());
    }
}
