//! Boundary-condition and shape vocabularies
//!
//! Tags are matched after folding case and treating hyphens, underscores
//! and runs of spaces as a single space, so `"fixed_rigid"`,
//! `"Fixed-Rigid"` and `"fixed rigid"` name the same condition.

use crate::error::ScatterError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

fn normalize_tag(value: &str) -> String {
    value
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Boundary condition at the outer surface of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryType {
    /// Zero normal velocity
    FixedRigid,
    /// Zero pressure
    PressureRelease,
    /// Fluid interior with its own density and sound speed
    FluidFilled,
    /// Fluid shell around a fluid interior
    FluidShellFluidInterior,
    /// Fluid shell around a pressure-release interior
    FluidShellPressureReleaseInterior,
    /// Homogeneous elastic solid
    Elastic,
    /// Elastic shell around a fluid interior
    ElasticShell,
}

impl BoundaryType {
    /// Every boundary type, in declaration order
    pub const ALL: [BoundaryType; 7] = [
        Self::FixedRigid,
        Self::PressureRelease,
        Self::FluidFilled,
        Self::FluidShellFluidInterior,
        Self::FluidShellPressureReleaseInterior,
        Self::Elastic,
        Self::ElasticShell,
    ];

    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FixedRigid => "fixed rigid",
            Self::PressureRelease => "pressure release",
            Self::FluidFilled => "fluid filled",
            Self::FluidShellFluidInterior => "fluid shell fluid interior",
            Self::FluidShellPressureReleaseInterior => "fluid shell pressure release interior",
            Self::Elastic => "elastic",
            Self::ElasticShell => "elastic shell",
        }
    }

    /// Relative pivot substituted for a singular pivot in the Rayleigh regime
    ///
    /// Interior and shell systems carry Neumann-function columns that are
    /// many orders of magnitude larger at tiny size parameters, so their
    /// floors sit higher than the single-interface fluid system.
    pub fn rayleigh_pivot_floor(&self) -> f64 {
        match self {
            Self::FixedRigid | Self::PressureRelease | Self::FluidFilled => 1e-14,
            Self::FluidShellFluidInterior
            | Self::FluidShellPressureReleaseInterior
            | Self::Elastic
            | Self::ElasticShell => 1e-12,
        }
    }
}

impl fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoundaryType {
    type Err = ScatterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = normalize_tag(s);
        Self::ALL
            .into_iter()
            .find(|bt| bt.as_str() == tag)
            .ok_or_else(|| ScatterError::UnknownBoundaryType {
                value: s.to_string(),
            })
    }
}

impl Serialize for BoundaryType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BoundaryType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Body shape for the shape-generic approximations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Sphere,
    ProlateSpheroid,
    Cylinder,
    BentCylinder,
}

impl Shape {
    /// Every shape, in declaration order
    pub const ALL: [Shape; 4] = [
        Self::Sphere,
        Self::ProlateSpheroid,
        Self::Cylinder,
        Self::BentCylinder,
    ];

    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::ProlateSpheroid => "prolate spheroid",
            Self::Cylinder => "cylinder",
            Self::BentCylinder => "bent cylinder",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shape {
    type Err = ScatterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = normalize_tag(s);
        Self::ALL
            .into_iter()
            .find(|shape| shape.as_str() == tag)
            .ok_or_else(|| ScatterError::UnknownShape {
                value: s.to_string(),
            })
    }
}

impl Serialize for Shape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
