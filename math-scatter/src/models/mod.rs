//! Scattering models, one module per shape family
//!
//! Exact modal-series models: [`ModalSeriesSphere`], [`ElasticSphere`] and
//! [`ProlateSpheroidModalSeries`]. Approximate models:
//! [`DeformedCylinder`], [`HighPass`], [`KirchhoffApproximation`],
//! [`KirchhoffRayMode`], [`Dwba`] and [`PhaseTrackingDwba`].

pub mod cylinder;
pub mod dwba;
pub mod elastic;
pub mod high_pass;
pub mod kirchhoff;
pub mod krm;
pub mod pt_dwba;
pub mod sphere;
pub mod spheroid;

pub use cylinder::DeformedCylinder;
pub use dwba::Dwba;
pub use elastic::{ElasticMaterial, ElasticSphere, ElasticTarget};
pub use high_pass::HighPass;
pub use kirchhoff::KirchhoffApproximation;
pub use krm::KirchhoffRayMode;
pub use pt_dwba::PhaseTrackingDwba;
pub use sphere::{FluidShell, ModalSeriesSphere, SphereProblem};
pub use spheroid::ProlateSpheroidModalSeries;

use crate::error::Result;
use crate::params::RunRow;
use num_complex::Complex64;

/// Sound speed and density of a fluid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fluid {
    /// Sound speed [m/s]
    pub c: f64,
    /// Density [kg/m³]
    pub rho: f64,
}

impl Fluid {
    pub fn new(c: f64, rho: f64) -> Self {
        Self { c, rho }
    }

    /// Seawater at 38 kHz benchmark conditions
    pub fn seawater() -> Self {
        Self::new(1477.4, 1026.8)
    }

    /// Acoustic impedance ρc [kg/(m²·s)]
    pub fn impedance(&self) -> f64 {
        self.rho * self.c
    }

    /// Read a fluid from two named row values
    pub(crate) fn from_row(row: &RunRow, c: &str, rho: &str) -> Result<Self> {
        Ok(Self::new(row.number(c)?, row.number(rho)?))
    }

    /// The surrounding medium of a row
    pub(crate) fn medium(row: &RunRow) -> Result<Self> {
        Self::from_row(row, "medium_c", "medium_rho")
    }
}

#[inline]
pub(crate) fn real(v: f64) -> Complex64 {
    Complex64::new(v, 0.0)
}

/// (-1)ⁿ (2n + 1), the backscattering weight of a spherical mode
#[inline]
pub(crate) fn legendre_weight(n: usize) -> f64 {
    let sign = if n % 2 == 0 { 1.0 } else { -1.0 };
    sign * (2 * n + 1) as f64
}

/// Neumann factor εₘ: 1 for m = 0, 2 otherwise
#[inline]
pub(crate) fn neumann_factor(m: usize) -> f64 {
    if m == 0 { 1.0 } else { 2.0 }
}

/// Backscattering cross-section in dB, with zero mapped to -∞
pub(crate) fn decibels(sigma: f64) -> f64 {
    10.0 * sigma.log10()
}
