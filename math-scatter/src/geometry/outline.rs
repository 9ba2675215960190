//! Body outlines as a sequence of circular discs along a centreline

use super::mesh::norm;
use crate::error::{Result, ScatterError};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Default spacing between outline discs [m]
pub const DEFAULT_DISC_SPACING: f64 = 1e-4;

/// Discs along a (possibly curved) centreline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyOutline {
    /// Disc centres [m]
    pub centres: Vec<[f64; 3]>,
    /// Unit tangent of the centreline at each disc
    pub tangents: Vec<[f64; 3]>,
    /// Disc radii [m]
    pub radii: Vec<f64>,
}

impl BodyOutline {
    /// Build an outline, normalising the tangents
    pub fn new(centres: Vec<[f64; 3]>, tangents: Vec<[f64; 3]>, radii: Vec<f64>) -> Result<Self> {
        let tangents = tangents
            .into_iter()
            .map(|t| {
                let len = norm(t);
                [t[0] / len, t[1] / len, t[2] / len]
            })
            .collect();
        let outline = Self {
            centres,
            tangents,
            radii,
        };
        outline.validate()?;
        Ok(outline)
    }

    pub fn validate(&self) -> Result<()> {
        let n = self.centres.len();
        if n < 2 {
            return Err(ScatterError::DegenerateGeometry {
                reason: format!("outline needs at least 2 discs, got {n}"),
            });
        }
        if self.tangents.len() != n || self.radii.len() != n {
            return Err(ScatterError::DegenerateGeometry {
                reason: format!(
                    "outline has {} centres, {} tangents and {} radii",
                    n,
                    self.tangents.len(),
                    self.radii.len()
                ),
            });
        }
        if self.centres.iter().flatten().any(|v| !v.is_finite())
            || self.tangents.iter().flatten().any(|v| !v.is_finite())
        {
            return Err(ScatterError::DegenerateGeometry {
                reason: "outline has non-finite centres or zero-length tangents".to_string(),
            });
        }
        if self.radii.iter().any(|r| !(r.is_finite() && *r >= 0.0)) {
            return Err(ScatterError::DegenerateGeometry {
                reason: "outline radii must be finite and non-negative".to_string(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.centres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centres.is_empty()
    }

    pub fn max_radius(&self) -> f64 {
        self.radii.iter().copied().fold(0.0, f64::max)
    }

    /// Prolate spheroid with semi-axes `major` (along x) and `minor`
    ///
    /// Discs are placed at x = A - A·cos(v) for v evenly spaced on [0, π],
    /// which crowds them towards the tips where the radius changes fastest.
    pub fn spheroid(major: f64, minor: f64, spacing: f64) -> Result<Self> {
        check_dimensions(&[("major", major), ("minor", minor), ("spacing", spacing)])?;
        let n = ((2.0 * major / spacing).round() as usize).max(2);
        let step = PI / (n - 1) as f64;
        let (centres, radii): (Vec<[f64; 3]>, Vec<f64>) = (0..n)
            .map(|i| {
                let v = i as f64 * step;
                ([major - major * v.cos(), 0.0, 0.0], minor * v.sin())
            })
            .unzip();
        Ok(Self {
            centres,
            tangents: vec![[1.0, 0.0, 0.0]; n],
            radii,
        })
    }

    /// Straight cylinder of `radius` and `length` along x
    pub fn cylinder(radius: f64, length: f64, spacing: f64) -> Result<Self> {
        check_dimensions(&[("radius", radius), ("length", length), ("spacing", spacing)])?;
        let n = ((length / spacing).round() as usize).max(2);
        let step = length / (n - 1) as f64;
        Ok(Self {
            centres: (0..n).map(|i| [i as f64 * step, 0.0, 0.0]).collect(),
            tangents: vec![[1.0, 0.0, 0.0]; n],
            radii: vec![radius; n],
        })
    }
}

fn check_dimensions(values: &[(&str, f64)]) -> Result<()> {
    for (name, value) in values {
        if !(value.is_finite() && *value > 0.0) {
            return Err(ScatterError::invalid(
                name,
                format!("must be positive, got {value}"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_spheroid_outline() {
        let outline = BodyOutline::spheroid(0.07, 0.01, DEFAULT_DISC_SPACING).unwrap();
        assert_eq!(outline.len(), 1400);
        assert_relative_eq!(outline.centres[0][0], 0.0);
        assert_relative_eq!(outline.centres[1399][0], 0.14, max_relative = 1e-12);
        assert_relative_eq!(outline.radii[0], 0.0, epsilon = 1e-15);
        assert_relative_eq!(outline.max_radius(), 0.01, max_relative = 1e-5);
    }

    #[test]
    fn test_cylinder_outline() {
        let outline = BodyOutline::cylinder(0.01, 0.07, DEFAULT_DISC_SPACING).unwrap();
        assert_eq!(outline.len(), 700);
        assert_relative_eq!(outline.centres[699][0], 0.07, max_relative = 1e-12);
        assert!(outline.radii.iter().all(|&r| r == 0.01));
    }

    #[test]
    fn test_new_normalises_and_validates() {
        let outline = BodyOutline::new(
            vec![[0.0; 3], [0.0, 0.0, 1.0]],
            vec![[0.0, 0.0, 2.0], [0.0, 0.0, 3.0]],
            vec![0.1, 0.1],
        )
        .unwrap();
        assert_relative_eq!(outline.tangents[1][2], 1.0);

        assert!(BodyOutline::new(vec![[0.0; 3]], vec![[1.0, 0.0, 0.0]], vec![0.1]).is_err());
        assert!(BodyOutline::new(
            vec![[0.0; 3], [1.0, 0.0, 0.0]],
            vec![[0.0; 3], [1.0, 0.0, 0.0]],
            vec![0.1, 0.1]
        )
        .is_err());
        assert!(BodyOutline::spheroid(-1.0, 0.01, 1e-4).is_err());
    }
}
