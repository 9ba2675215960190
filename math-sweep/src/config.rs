//! JSON sweep configuration
//!
//! A configuration names a model, says how to run it and lists its
//! parameters:
//!
//! ```json
//! {
//!   "model": "mss",
//!   "execution": { "mode": "parallel", "workers": 4 },
//!   "parameters": {
//!     "medium_c": 1477.4, "medium_rho": 1026.8,
//!     "a": [0.01, 0.02], "f": [38000, 120000],
//!     "boundary_type": "fixed rigid"
//!   }
//! }
//! ```

use crate::dispatch::{Dispatcher, SweepInput, SweepResult};
use crate::error::{Result, SweepError};
use math_echo_scatter::{
    ModelParameters, ScatteringModel, SharedParameters, TruncationPolicy, model_with_truncation,
};
use math_echo_solvers::ParallelConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Where the rows of a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}

/// Execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Worker count in parallel mode (None = one per core)
    #[serde(default)]
    pub workers: Option<usize>,
    /// Rows handed to a worker at a time
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_chunk_size() -> usize {
    16
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            workers: None,
            chunk_size: default_chunk_size(),
        }
    }
}

impl ExecutionConfig {
    pub fn parallel(workers: Option<usize>) -> Self {
        Self {
            mode: ExecutionMode::Parallel,
            workers,
            ..Self::default()
        }
    }

    pub fn parallel_config(&self) -> ParallelConfig {
        ParallelConfig {
            enabled: self.mode == ExecutionMode::Parallel,
            num_threads: self.workers,
            chunk_size: self.chunk_size,
        }
    }
}

/// Modal-series truncation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruncationConfig {
    #[serde(default = "default_extra_modes")]
    pub extra_modes: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_probe_modes")]
    pub probe_modes: usize,
    #[serde(default = "default_max_order")]
    pub max_order: usize,
}

fn default_extra_modes() -> usize {
    10
}

fn default_tolerance() -> f64 {
    1e-4
}

fn default_probe_modes() -> usize {
    3
}

fn default_max_order() -> usize {
    400
}

impl Default for TruncationConfig {
    fn default() -> Self {
        Self {
            extra_modes: default_extra_modes(),
            tolerance: default_tolerance(),
            probe_modes: default_probe_modes(),
            max_order: default_max_order(),
        }
    }
}

impl From<TruncationConfig> for TruncationPolicy {
    fn from(config: TruncationConfig) -> Self {
        Self {
            extra_modes: config.extra_modes,
            tolerance: config.tolerance,
            probe_modes: config.probe_modes,
            max_order: config.max_order,
        }
    }
}

/// Shape of the sweep output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLayout {
    /// A scalar, or the TS sequence in row order
    #[default]
    Series,
    /// A labelled grid over the sequence-valued parameters
    Grid,
}

/// A complete sweep: model, execution and parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Registry name of the model
    pub model: String,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub truncation: TruncationConfig,
    #[serde(default)]
    pub layout: OutputLayout,
    pub parameters: ModelParameters,
    #[serde(default)]
    pub shared: SharedParameters,
}

impl SweepConfig {
    pub fn new(model: impl Into<String>, parameters: ModelParameters) -> Self {
        Self {
            model: model.into(),
            execution: ExecutionConfig::default(),
            truncation: TruncationConfig::default(),
            layout: OutputLayout::default(),
            parameters,
            shared: SharedParameters::new(),
        }
    }

    pub fn with_execution(mut self, execution: ExecutionConfig) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_shared(mut self, shared: SharedParameters) -> Self {
        self.shared = shared;
        self
    }

    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| SweepError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The configured model, with this configuration's truncation
    pub fn build_model(&self) -> Result<Box<dyn ScatteringModel>> {
        Ok(model_with_truncation(&self.model, self.truncation.into())?)
    }

    pub fn build_dispatcher(&self) -> Result<Dispatcher> {
        Dispatcher::from_config(&self.execution.parallel_config())
    }

    /// Validate, expand and solve the whole sweep
    pub fn run(&self) -> Result<SweepResult> {
        let model = self.build_model()?;
        let input = match self.layout {
            OutputLayout::Series => SweepInput::Parameters(self.parameters.clone()),
            OutputLayout::Grid => SweepInput::Grid(self.parameters.clone()),
        };
        self.build_dispatcher()?
            .dispatch(model.as_ref(), &input, self.shared.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config = SweepConfig::from_json(
            r#"{"model": "hp", "parameters": {"a": [0.01, 0.02], "shape": "sphere"}}"#,
        )
        .unwrap();
        assert_eq!(config.execution, ExecutionConfig::default());
        assert_eq!(config.execution.chunk_size, 16);
        assert_eq!(
            TruncationPolicy::from(config.truncation),
            TruncationPolicy::default()
        );
        assert_eq!(config.layout, OutputLayout::Series);
        assert_eq!(config.parameters.get("a").unwrap().len(), 2);
        assert!(config.shared.is_empty());
    }

    #[test]
    fn test_execution_modes() {
        let config: ExecutionConfig =
            serde_json::from_str(r#"{"mode": "parallel", "workers": 2, "chunk_size": 4}"#)
                .unwrap();
        let parallel = config.parallel_config();
        assert!(parallel.enabled);
        assert_eq!(parallel.num_threads, Some(2));
        assert_eq!(parallel.chunk_size, 4);
        assert!(serde_json::from_str::<ExecutionConfig>(r#"{"mode": "cluster"}"#).is_err());
    }

    #[test]
    fn test_round_trip_and_bad_files() {
        let config = SweepConfig::new(
            "mss",
            ModelParameters::new().with("a", vec![0.01, 0.02]),
        )
        .with_execution(ExecutionConfig::parallel(Some(2)));
        let json = config.to_json().unwrap();
        assert_eq!(SweepConfig::from_json(&json).unwrap(), config);

        let err = SweepConfig::from_file("/nonexistent/sweep.json").unwrap_err();
        assert!(matches!(err, SweepError::Io { .. }));
        let err = SweepConfig::from_json("{\"model\": 3}").unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_unknown_model() {
        let config = SweepConfig::new("bem", ModelParameters::new());
        let err = config.build_model().unwrap_err();
        assert!(err.is_configuration_error());
    }
}
