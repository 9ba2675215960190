//! Special functions for acoustic scattering
//!
//! This crate provides the special functions needed by modal-series
//! scattering solutions:
//!
//! - Spherical Bessel functions (jₙ, yₙ) and Hankel functions hₙ⁽¹⁾
//! - Cylindrical Bessel functions (Jₙ, Yₙ) and Hankel functions Hₙ⁽¹⁾
//! - Legendre polynomials (Pₙ) and unit-norm associated functions (P̄ₙᵐ)
//! - Prolate spheroidal angular and radial functions
//!
//! Functions are evaluated as whole ladders of orders at a single argument,
//! which is how modal series consume them.

pub mod cylindrical;
pub mod error;
mod legendre;
pub mod spheroidal;
pub mod spherical;

pub use cylindrical::*;
pub use error::{Result, SpecialFunctionError};
pub use legendre::*;
pub use spheroidal::{ProlateSpheroidal, RadialPair, WRONSKIAN_TOLERANCE};
pub use spherical::*;
