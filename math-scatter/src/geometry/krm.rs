//! Body and inclusion shapes for the Kirchhoff ray mode model
//!
//! A shape is sampled at stations along its length. At each station it has
//! a width and upper and lower surface heights, with x increasing
//! towards the tail and z towards the dorsal side.

use crate::boundary::BoundaryType;
use crate::error::{Result, ScatterError};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// One sampled shape with its material properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrmShape {
    /// Fluid filled or pressure release
    pub boundary: BoundaryType,
    /// Station positions along the body [m]
    pub x: Vec<f64>,
    /// Width at each station [m]
    pub w: Vec<f64>,
    /// Upper surface height [m]
    pub z_upper: Vec<f64>,
    /// Lower surface height [m]
    pub z_lower: Vec<f64>,
    /// Sound speed of the shape's material [m/s]
    pub c: f64,
    /// Density of the shape's material [kg/m³]
    pub rho: f64,
}

impl KrmShape {
    pub fn validate(&self) -> Result<()> {
        let n = self.x.len();
        if n < 3 {
            return Err(ScatterError::DegenerateGeometry {
                reason: format!("KRM shape needs at least 3 stations, got {n}"),
            });
        }
        if self.w.len() != n || self.z_upper.len() != n || self.z_lower.len() != n {
            return Err(ScatterError::DegenerateGeometry {
                reason: "KRM shape arrays differ in length".to_string(),
            });
        }
        if self
            .x
            .iter()
            .chain(&self.w)
            .chain(&self.z_upper)
            .chain(&self.z_lower)
            .any(|v| !v.is_finite())
        {
            return Err(ScatterError::DegenerateGeometry {
                reason: "KRM shape has non-finite coordinates".to_string(),
            });
        }
        if self.x.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(ScatterError::DegenerateGeometry {
                reason: "KRM stations must increase along the body".to_string(),
            });
        }
        if !matches!(
            self.boundary,
            BoundaryType::FluidFilled | BoundaryType::PressureRelease
        ) {
            return Err(ScatterError::DegenerateGeometry {
                reason: format!("KRM shapes cannot have a {} boundary", self.boundary),
            });
        }
        if !(self.c > 0.0 && self.rho > 0.0 && self.c.is_finite() && self.rho.is_finite()) {
            return Err(ScatterError::DegenerateGeometry {
                reason: "KRM shape sound speed and density must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Body volume from elliptical cross-sections [m³]
    ///
    /// The last station reuses the second spacing as its thickness.
    pub fn volume(&self) -> f64 {
        let n = self.x.len();
        let thickness = |i: usize| {
            if i + 1 < n {
                self.x[i + 1] - self.x[i]
            } else {
                self.x[2] - self.x[1]
            }
        };
        (0..n)
            .map(|i| PI * (self.z_upper[i] - self.z_lower[i]) * self.w[i] * thickness(i))
            .sum()
    }

    /// Distance from the first to the last station [m]
    pub fn length(&self) -> f64 {
        match (self.x.first(), self.x.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Radius of the cylinder with the same volume and length [m]
    pub fn equivalent_radius(&self) -> f64 {
        (self.volume() / (PI * self.length())).sqrt()
    }
}

/// An organism: a fluid body with zero or more inclusions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrmOrganism {
    pub name: String,
    pub body: KrmShape,
    #[serde(default)]
    pub inclusions: Vec<KrmShape>,
}

impl KrmOrganism {
    pub fn validate(&self) -> Result<()> {
        self.body.validate()?;
        if self.body.boundary != BoundaryType::FluidFilled {
            return Err(ScatterError::DegenerateGeometry {
                reason: "KRM body must be fluid filled".to_string(),
            });
        }
        self.inclusions.iter().try_for_each(KrmShape::validate)
    }

    /// Ellipsoidal fish with a gas-filled swimbladder, sampled at `stations`
    pub fn ellipsoidal_fish(length: f64, stations: usize) -> Self {
        let section = |scale: f64,
                       offset: f64,
                       half_height: f64,
                       half_width: f64,
                       c: f64,
                       rho: f64,
                       boundary: BoundaryType| {
            let n = stations.max(3);
            let mut shape = KrmShape {
                boundary,
                x: Vec::with_capacity(n),
                w: Vec::with_capacity(n),
                z_upper: Vec::with_capacity(n),
                z_lower: Vec::with_capacity(n),
                c,
                rho,
            };
            let span = scale * length;
            for i in 0..n {
                let x = offset + span * i as f64 / (n - 1) as f64;
                let u = 2.0 * (x - offset) / span - 1.0;
                let r = (1.0 - u * u).max(0.0).sqrt();
                shape.x.push(x);
                shape.w.push(2.0 * half_width * r);
                shape.z_upper.push(half_height * r);
                shape.z_lower.push(-half_height * r);
            }
            shape
        };
        Self {
            name: "ellipsoidal fish".to_string(),
            body: section(
                1.0,
                0.0,
                0.08 * length,
                0.05 * length,
                1570.0,
                1070.0,
                BoundaryType::FluidFilled,
            ),
            inclusions: vec![section(
                0.3,
                0.25 * length,
                0.02 * length,
                0.015 * length,
                345.0,
                1.24,
                BoundaryType::PressureRelease,
            )],
        }
    }
}
