//! Kirchhoff approximation over a closed triangle mesh (`ka`)
//!
//! The body stays fixed and the incident wave vector is rotated by the
//! pitch and roll angles. Each facet lit by the incident wave contributes a
//! phase-shifted patch of specular reflection.

use super::real;
use crate::boundary::BoundaryType;
use crate::error::{Result, ScatterError};
use crate::geometry::{TriangleMesh, dot};
use crate::modal::wavenumber;
use crate::model::{
    AnalyticalType, ModelInfo, ScatteringModel, TsEstimate, check_boundary, check_max_ka,
};
use crate::params::{ParameterSpec, RunRow, ValueKind};
use num_complex::Complex64;

static INFO: ModelInfo = ModelInfo {
    name: "ka",
    long_name: "Kirchhoff approximation",
    analytical_type: AnalyticalType::Approximate,
    boundary_types: &[BoundaryType::PressureRelease],
    shapes: &[],
    max_ka: Some(20.0),
};

static PARAMETERS: &[ParameterSpec] = &[
    ParameterSpec::new("medium_c", "m/s", ValueKind::Positive),
    ParameterSpec::new("theta", "°", ValueKind::Real),
    ParameterSpec::new("phi", "°", ValueKind::Real),
    ParameterSpec::new("f", "Hz", ValueKind::Positive),
    ParameterSpec::new("boundary_type", "", ValueKind::Boundary),
    ParameterSpec::new("mesh", "", ValueKind::Mesh),
];

/// Unit incident direction for pitch `theta` and roll `phi` in degrees
///
/// The z axis is rotated by roll -φ about x, then by pitch θ - 90° about y,
/// so θ = 90°, φ = 0° is a wave travelling along +z.
pub fn incident_direction(theta: f64, phi: f64) -> [f64; 3] {
    let (sin_b, cos_b) = (theta - 90.0).to_radians().sin_cos();
    let (sin_p, cos_p) = phi.to_radians().sin_cos();
    [sin_b * cos_p, sin_p, cos_b * cos_p]
}

/// Kirchhoff approximation for pressure-release surfaces
#[derive(Debug, Clone, Copy, Default)]
pub struct KirchhoffApproximation;

impl KirchhoffApproximation {
    pub fn new() -> Self {
        Self
    }

    /// Backscattering amplitude [m] of `mesh`
    pub fn amplitude(
        &self,
        mesh: &TriangleMesh,
        medium_c: f64,
        theta: f64,
        phi: f64,
        frequency: f64,
    ) -> Result<Complex64> {
        let k = wavenumber(medium_c, frequency);
        check_max_ka(&INFO, k * mesh.bounding_radius())?;
        let direction = incident_direction(theta, phi);

        let mut lit = 0usize;
        let sum: Complex64 = mesh
            .facets()
            .filter_map(|facet| {
                let cosine = dot(facet.normal, direction);
                // Half weight for grazing facets
                let step = if cosine > 0.0 {
                    1.0
                } else if cosine == 0.0 {
                    0.5
                } else {
                    return None;
                };
                lit += 1;
                let phase = 2.0 * k * dot(facet.centroid, direction);
                Some(Complex64::from_polar(step * cosine * facet.area, phase))
            })
            .sum();

        if lit == 0 {
            return Err(ScatterError::DegenerateGeometry {
                reason: "no mesh facet faces the incident wave".to_string(),
            });
        }
        let wavelength = medium_c / frequency;
        Ok(sum * real(1.0 / wavelength))
    }
}

impl ScatteringModel for KirchhoffApproximation {
    fn info(&self) -> &ModelInfo {
        &INFO
    }

    fn parameters(&self) -> &'static [ParameterSpec] {
        PARAMETERS
    }

    fn solve_single(&self, row: &RunRow) -> Result<TsEstimate> {
        check_boundary(&INFO, row.boundary_type()?)?;
        let mesh = row.shared().mesh("mesh")?;
        let amplitude = self.amplitude(
            mesh,
            row.number("medium_c")?,
            row.number("theta")?,
            row.number("phi")?,
            row.number("f")?,
        )?;
        Ok(TsEstimate::new(20.0 * amplitude.norm().log10()))
    }
}
