//! Kirchhoff ray mode model (`krm`)
//!
//! Clay & Horne (1994). The fish body is a stack of short fluid cylinders
//! treated with the Kirchhoff approximation. Each inclusion (typically a
//! swimbladder) is either a stack of soft or fluid cylinders or, when it is
//! small compared with the wavelength, a single cylinder mode solution
//! (Clay 1992).

use crate::boundary::BoundaryType;
use crate::error::{Result, ScatterError};
use crate::geometry::KrmShape;
use crate::modal::{sinc, wavenumber};
use crate::model::{AnalyticalType, ModelInfo, ScatteringModel, TsEstimate, check_boundary};
use crate::params::{
    ModelParameters, ParameterSpec, RunRow, SharedParameters, ValueKind, validate_parameter_set,
};
use math_echo_special::{bessel_j, bessel_y};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Inclusions with k·a below this use the mode solution
const MODE_SOLUTION_KA: f64 = 0.15;

/// Validated pitch range [°]
const THETA_RANGE: (f64, f64) = (65.0, 115.0);

static INFO: ModelInfo = ModelInfo {
    name: "krm",
    long_name: "Kirchhoff ray mode",
    analytical_type: AnalyticalType::Approximate,
    boundary_types: &[BoundaryType::FluidFilled],
    shapes: &[],
    max_ka: None,
};

static PARAMETERS: &[ParameterSpec] = &[
    ParameterSpec::new("medium_c", "m/s", ValueKind::Positive),
    ParameterSpec::new("medium_rho", "kg/m³", ValueKind::Positive),
    ParameterSpec::new("theta", "°", ValueKind::Real),
    ParameterSpec::new("f", "Hz", ValueKind::Positive),
    ParameterSpec::new("organism", "", ValueKind::Organism),
    ParameterSpec::new("high_ka_medium", "", ValueKind::Text).optional(),
    ParameterSpec::new("low_ka_medium", "", ValueKind::Text).optional(),
    ParameterSpec::new("boundary_type", "", ValueKind::Boundary).optional(),
];

/// Fluid that surrounds the inclusions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InclusionMedium {
    /// The fish body
    #[default]
    Body,
    /// The water around the fish
    Water,
}

impl InclusionMedium {
    fn parse(name: &str, value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "body" => Ok(Self::Body),
            "water" | "medium" => Ok(Self::Water),
            other => Err(ScatterError::invalid(
                name,
                format!("expected 'body' or 'water', got '{other}'"),
            )),
        }
    }

    fn from_row(row: &RunRow, name: &str) -> Result<Self> {
        Self::parse(name, row.text_or(name, "body")?)
    }
}

/// Kirchhoff ray mode model
#[derive(Debug, Clone, Copy, Default)]
pub struct KirchhoffRayMode;

/// Per-segment quantities shared by the Kirchhoff sums
struct Segments {
    /// Mean half-width of each segment [m]
    radius: Vec<f64>,
    /// Segment length projected onto the incidence plane [m]
    delta_u: Vec<f64>,
}

impl Segments {
    fn new(shape: &KrmShape, theta: f64) -> Self {
        let sin = theta.sin();
        Self {
            radius: shape.w.windows(2).map(|w| (w[0] + w[1]) / 4.0).collect(),
            delta_u: shape.x.windows(2).map(|x| (x[1] - x[0]) * sin).collect(),
        }
    }
}

/// Segment averages of v = x cos θ + z sin θ along one surface
fn projected(x: &[f64], z: &[f64], theta: f64) -> Vec<f64> {
    let (sin, cos) = theta.sin_cos();
    let v: Vec<f64> = x.iter().zip(z).map(|(x, z)| x * cos + z * sin).collect();
    v.windows(2).map(|pair| (pair[0] + pair[1]) / 2.0).collect()
}

/// Scattering length of a fluid shape [m]
///
/// `k` is the wavenumber around the organism, `k_b` the one used inside
/// the surrounding fluid of the shape.
fn fluid_kirchhoff(
    shape: &KrmShape,
    k: f64,
    k_b: f64,
    reflection: f64,
    transmission: f64,
    theta: f64,
) -> Complex64 {
    let segments = Segments::new(shape, theta);
    let v_upper = projected(&shape.x, &shape.z_upper, theta);
    let v_lower = projected(&shape.x, &shape.z_lower, theta);
    let i = Complex64::i();

    let sum: Complex64 = (0..segments.radius.len())
        .map(|s| {
            let z_upper = (shape.z_upper[s] + shape.z_upper[s + 1]) / 2.0;
            let psi_b = -PI * k_b * z_upper / (2.0 * (k_b * z_upper + 0.4));
            let front = (-2.0 * i * k * v_upper[s]).exp();
            let back = (-2.0 * i * k * v_upper[s]
                + 2.0 * i * k_b * (v_upper[s] - v_lower[s])
                + i * psi_b)
                .exp();
            (k * segments.radius[s]).sqrt() * segments.delta_u[s] * (front - transmission * back)
        })
        .sum();
    -i * reflection / (2.0 * PI.sqrt()) * sum
}

/// Scattering length of a soft (gas-filled) shape [m]
fn soft_kirchhoff(
    shape: &KrmShape,
    k: f64,
    k_b: f64,
    reflection: f64,
    transmission: f64,
    theta: f64,
) -> Complex64 {
    let segments = Segments::new(shape, theta);
    let v_upper = projected(&shape.x, &shape.z_upper, theta);
    let i = Complex64::i();
    let sin = theta.sin();

    let sum: Complex64 = segments
        .radius
        .iter()
        .zip(&segments.delta_u)
        .zip(&v_upper)
        .map(|((&a, &delta_u), &v)| {
            let ka = k * a;
            let amplitude = ka / (ka + 0.083);
            let psi_p = ka / (40.0 + ka) - 1.05;
            amplitude
                * ((k_b * a + 1.0) * sin).sqrt()
                * (-i * (2.0 * k_b * v + psi_p)).exp()
                * delta_u
        })
        .sum();
    -i * reflection * transmission / (2.0 * PI.sqrt()) * sum
}

/// Low-ka mode solution for a finite fluid cylinder [m]
///
/// `g` and `h` are the surrounding-to-cylinder density and sound-speed
/// ratios, `a` and `length` the equivalent radius and length.
fn mode_solution(g: f64, h: f64, k: f64, a: f64, length: f64, theta: f64) -> Complex64 {
    let ka = k * a;
    let kca = ka / h;
    // J0' = -J1 and Y0' = -Y1
    let dj0 = |x: f64| -bessel_j(1, x);
    let dy0 = |x: f64| -bessel_y(1, x);
    let c0 = (dj0(kca) * bessel_y(0, ka) - g * h * dy0(ka) * bessel_j(0, kca))
        / (dj0(kca) * bessel_j(0, ka) - g * h * dj0(ka) * bessel_j(0, kca));
    let b0 = -1.0 / Complex64::new(1.0, c0);
    let chi = -PI / 4.0;
    Complex64::from_polar(length / PI * sinc(k * length * theta.cos()), chi - PI / 4.0) * b0
}

impl KirchhoffRayMode {
    pub fn new() -> Self {
        Self
    }

    /// Backscattering length [m] of the whole organism
    ///
    /// `theta` is in degrees and must lie within 65° to 115°.
    #[allow(clippy::too_many_arguments)]
    pub fn scattering_length(
        &self,
        organism: &crate::geometry::KrmOrganism,
        medium_c: f64,
        medium_rho: f64,
        theta: f64,
        frequency: f64,
        high_ka_medium: InclusionMedium,
        low_ka_medium: InclusionMedium,
    ) -> Result<Complex64> {
        if !(THETA_RANGE.0..=THETA_RANGE.1).contains(&theta) {
            return Err(ScatterError::out_of_domain(
                INFO.name,
                format!(
                    "theta = {theta}° is outside {}° to {}°",
                    THETA_RANGE.0, THETA_RANGE.1
                ),
            ));
        }
        let theta = theta.to_radians();
        let body = &organism.body;
        let k = wavenumber(medium_c, frequency);
        let k_b = wavenumber(body.c, frequency);
        let r_wb = (body.rho * body.c - medium_rho * medium_c)
            / (body.rho * body.c + medium_rho * medium_c);
        let transmission = 1.0 - r_wb * r_wb;
        let k_inclusion = match high_ka_medium {
            InclusionMedium::Body => k_b,
            InclusionMedium::Water => k,
        };

        let mut total = fluid_kirchhoff(body, k, k_b, r_wb, transmission, theta);
        for inclusion in &organism.inclusions {
            let gp = inclusion.rho / body.rho;
            let hp = inclusion.c / body.c;
            let r_bc = (gp * hp - 1.0) / (gp * hp + 1.0);
            let a_e = inclusion.equivalent_radius();

            total += if k * a_e < MODE_SOLUTION_KA {
                let (gp, hp) = match low_ka_medium {
                    InclusionMedium::Body => (gp, hp),
                    InclusionMedium::Water => (inclusion.rho / medium_rho, inclusion.c / medium_c),
                };
                mode_solution(1.0 / gp, 1.0 / hp, k, a_e, inclusion.length(), theta)
            } else {
                match inclusion.boundary {
                    BoundaryType::PressureRelease => {
                        soft_kirchhoff(inclusion, k, k_inclusion, r_bc, transmission, theta)
                    }
                    BoundaryType::FluidFilled => {
                        fluid_kirchhoff(inclusion, k, k_inclusion, r_bc, transmission, theta)
                    }
                    other => {
                        return Err(ScatterError::DegenerateGeometry {
                            reason: format!("KRM inclusions cannot have a {other} boundary"),
                        });
                    }
                }
            };
        }
        Ok(total)
    }
}

impl ScatteringModel for KirchhoffRayMode {
    fn info(&self) -> &ModelInfo {
        &INFO
    }

    fn parameters(&self) -> &'static [ParameterSpec] {
        PARAMETERS
    }

    /// Also rejects unknown inclusion-medium choices
    fn validate_parameters(
        &self,
        expandable: &ModelParameters,
        shared: &SharedParameters,
    ) -> Result<()> {
        validate_parameter_set(&INFO, PARAMETERS, expandable, shared)?;
        for name in ["high_ka_medium", "low_ka_medium"] {
            if let Some(value) = expandable.get(name) {
                for choice in value.values().iter().filter_map(|v| v.as_text()) {
                    InclusionMedium::parse(name, choice)?;
                }
            }
        }
        Ok(())
    }

    fn solve_single(&self, row: &RunRow) -> Result<TsEstimate> {
        check_boundary(&INFO, row.boundary_type_or(BoundaryType::FluidFilled)?)?;
        let length = self.scattering_length(
            row.shared().organism("organism")?,
            row.number("medium_c")?,
            row.number("medium_rho")?,
            row.number("theta")?,
            row.number("f")?,
            InclusionMedium::from_row(row, "high_ka_medium")?,
            InclusionMedium::from_row(row, "low_ka_medium")?,
        )?;
        Ok(TsEstimate::new(20.0 * length.norm().log10()))
    }
}
