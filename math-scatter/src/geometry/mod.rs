//! Target geometries consumed by the approximate models
//!
//! - [`TriangleMesh`]: closed surfaces for the Kirchhoff approximation
//! - [`BodyOutline`]: centreline discs for the distorted-wave Born approximation
//! - voxel grids for the phase-tracking variant
//! - [`KrmOrganism`]: sampled body and inclusions for the Kirchhoff ray mode model

mod krm;
mod mesh;
mod outline;
mod voxel;

pub use krm::{KrmOrganism, KrmShape};
pub use mesh::{Facet, TriangleMesh};
pub use outline::{BodyOutline, DEFAULT_DISC_SPACING};
pub use voxel::{rotate_nearest, voxel_sphere};

pub(crate) use mesh::{dot, norm, sub};
