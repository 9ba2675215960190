//! The contract every scattering model implements

use crate::boundary::{BoundaryType, Shape};
use crate::error::{Result, ScatterError};
use crate::params::{
    ModelParameters, ParameterSpec, RunRow, SharedParameters, validate_parameter_set,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a model solves the wave equation exactly or approximates it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticalType {
    Exact,
    Approximate,
}

/// Static description of a model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    /// Short name used by the registry
    pub name: &'static str,
    pub long_name: &'static str,
    pub analytical_type: AnalyticalType,
    pub boundary_types: &'static [BoundaryType],
    /// Shapes accepted by the `shape` parameter (empty when there is none)
    pub shapes: &'static [Shape],
    /// Largest validated size parameter ka, if the model has one
    pub max_ka: Option<f64>,
}

/// How a modal series was truncated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruncationReport {
    /// Highest mode summed
    pub order: usize,
    /// Probe modes fell below the tolerance
    pub converged: bool,
    /// |probe sum| / |amplitude|
    pub tail_ratio: f64,
}

/// Target strength of one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TsEstimate {
    /// Target strength [dB re 1 m²]
    pub ts: f64,
    /// Present for modal-series models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncation: Option<TruncationReport>,
}

impl TsEstimate {
    pub fn new(ts: f64) -> Self {
        Self {
            ts,
            truncation: None,
        }
    }

    pub fn with_truncation(ts: f64, truncation: TruncationReport) -> Self {
        Self {
            ts,
            truncation: Some(truncation),
        }
    }

    /// False only when a modal series stopped before meeting its tolerance
    pub fn is_converged(&self) -> bool {
        self.truncation.map_or(true, |t| t.converged)
    }
}

/// A scattering model for one family of targets
///
/// Implementations are stateless apart from configuration, so a single
/// instance is shared by every worker of a batch.
pub trait ScatteringModel: Send + Sync + fmt::Debug {
    fn info(&self) -> &ModelInfo;

    /// Declared parameters, their units and when they are required
    fn parameters(&self) -> &'static [ParameterSpec];

    /// Check a whole parameter set before any run is solved
    ///
    /// Every error returned here is a configuration error.
    fn validate_parameters(
        &self,
        expandable: &ModelParameters,
        shared: &SharedParameters,
    ) -> Result<()> {
        validate_parameter_set(self.info(), self.parameters(), expandable, shared)
    }

    /// Target strength of one fully resolved run
    fn solve_single(&self, row: &RunRow) -> Result<TsEstimate>;
}

/// Reject a size parameter above the model's validated range
pub(crate) fn check_max_ka(info: &ModelInfo, ka: f64) -> Result<()> {
    match info.max_ka {
        Some(max_ka) if ka > max_ka => Err(ScatterError::out_of_domain(
            info.name,
            format!("ka = {ka:.3} is above the validated maximum of {max_ka}"),
        )),
        _ => Ok(()),
    }
}

/// Reject a boundary type the model does not implement
pub(crate) fn check_boundary(info: &ModelInfo, boundary_type: BoundaryType) -> Result<()> {
    if info.boundary_types.contains(&boundary_type) {
        Ok(())
    } else {
        Err(ScatterError::UnsupportedBoundaryType {
            model: info.name.to_string(),
            boundary_type: boundary_type.to_string(),
        })
    }
}
