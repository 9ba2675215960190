//! Acoustic target strength of fish and plankton
//!
//! Each model turns one fully resolved set of parameters (a [`RunRow`])
//! into a backscattering target strength in dB re 1 m²:
//!
//! - Exact modal series for spheres, layered spheres, elastic spheres and
//!   shells, and prolate spheroids
//! - Approximate models: the deformed finite cylinder, Stanton's high-pass
//!   formulas, the Kirchhoff approximation over a triangle mesh, the
//!   Kirchhoff ray mode model, and two flavours of the distorted-wave Born
//!   approximation
//!
//! Models are looked up by short name through [`model_by_name`] and share
//! the [`ScatteringModel`] contract, so a batch driver can validate a whole
//! parameter set before solving any row.
//!
//! # Example
//!
//! ```
//! use math_echo_scatter::{BoundaryType, ModalSeriesSphere, models::Fluid, SphereProblem};
//!
//! let problem = SphereProblem::new(BoundaryType::FixedRigid, Fluid::seawater(), 0.01, 38_000.0);
//! let solution = ModalSeriesSphere::new().solve(&problem).unwrap();
//! assert!((solution.ts() + 49.088).abs() < 0.01);
//! ```

pub mod boundary;
pub mod error;
pub mod geometry;
pub mod modal;
pub mod model;
pub mod models;
pub mod params;
pub mod registry;

pub use boundary::{BoundaryType, Shape};
pub use error::{Result, ScatterError};
pub use modal::{ModalSolution, TruncationPolicy};
pub use model::{AnalyticalType, ModelInfo, ScatteringModel, TruncationReport, TsEstimate};
pub use models::{
    DeformedCylinder, Dwba, ElasticSphere, HighPass, KirchhoffApproximation, KirchhoffRayMode,
    ModalSeriesSphere, PhaseTrackingDwba, ProlateSpheroidModalSeries, SphereProblem,
};
pub use params::{
    ModelParameters, ParamValue, ParameterSpec, RunRow, Scalar, SharedParameters, SharedValue,
    ValueKind,
};
pub use registry::{MODEL_NAMES, all_models, model_by_name, model_with_truncation};
