//! Error types for parameter sweeps

use math_echo_scatter::ScatterError;
use math_echo_solvers::ParallelError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole sweep
///
/// Per-row failures never appear here; they are kept in the
/// [`ResultSet`](crate::ResultSet) in place of the row's estimate.
#[derive(Error, Debug)]
pub enum SweepError {
    /// Parameter validation or model lookup failed
    #[error(transparent)]
    Scatter(#[from] ScatterError),

    /// A table or grid that does not fit its declared shape
    #[error("malformed container: {reason}")]
    Container {
        /// What is inconsistent
        reason: String,
    },

    /// Reading a configuration file failed
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A configuration document is not valid JSON for its type
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The worker pool could not be built
    #[error(transparent)]
    Pool(#[from] ParallelError),
}

impl SweepError {
    /// True for errors caused by the caller's parameters or configuration
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Self::Scatter(err) => err.is_configuration_error(),
            Self::Container { .. } | Self::Json(_) => true,
            Self::Io { .. } | Self::Pool(_) => false,
        }
    }

    pub(crate) fn container(reason: impl Into<String>) -> Self {
        Self::Container {
            reason: reason.into(),
        }
    }
}

/// Result type for sweeps
pub type Result<T> = std::result::Result<T, SweepError>;
