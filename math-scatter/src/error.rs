//! Error types for scattering models
//!
//! Errors fall into three classes. Configuration errors are detected while
//! validating a parameter set and abort a batch before any solve runs. Domain
//! and numeric errors belong to a single run and are reported in its place.

use math_echo_solvers::LuError;
use math_echo_special::SpecialFunctionError;
use thiserror::Error;

/// Errors raised by parameter validation and by scattering solves
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScatterError {
    /// A parameter name the model does not know
    #[error("unknown parameter '{name}'")]
    UnknownParameter {
        /// Offending name
        name: String,
    },

    /// A parameter the model needs for this combination is absent
    #[error("missing required parameter '{name}'")]
    MissingParameter {
        /// Missing name
        name: String,
    },

    /// A parameter given both as expandable and as shared
    #[error("parameter '{name}' is given both as expandable and as shared")]
    ConflictingParameter {
        /// Offending name
        name: String,
    },

    /// A parameter given in the wrong mapping
    #[error("parameter '{name}' must be given as {expected}")]
    MisplacedParameter {
        /// Offending name
        name: String,
        /// Where the parameter belongs ("expandable" or "shared")
        expected: &'static str,
    },

    /// A value of the wrong kind or outside its physical range
    #[error("invalid value for '{name}': {reason}")]
    InvalidValue {
        /// Parameter name
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// A boundary-type tag outside the vocabulary
    #[error("unknown boundary type '{value}'")]
    UnknownBoundaryType {
        /// The unparsed tag
        value: String,
    },

    /// A recognised boundary type the model does not implement
    #[error("model '{model}' does not support boundary type '{boundary_type}'")]
    UnsupportedBoundaryType {
        /// Model short name
        model: String,
        /// Canonical boundary-type name
        boundary_type: String,
    },

    /// A shape tag outside the vocabulary
    #[error("unknown shape '{value}'")]
    UnknownShape {
        /// The unparsed tag
        value: String,
    },

    /// A recognised shape the model does not implement
    #[error("model '{model}' does not support shape '{shape}'")]
    UnsupportedShape {
        /// Model short name
        model: String,
        /// Canonical shape name
        shape: String,
    },

    /// No model is registered under this name
    #[error("unknown model '{name}'")]
    UnknownModel {
        /// Requested name
        name: String,
    },

    /// Inputs outside the validated range of an approximation
    #[error("{model}: {reason}")]
    OutOfDomain {
        /// Model short name
        model: String,
        /// Which limit was exceeded
        reason: String,
    },

    /// A modal boundary-condition system could not be solved
    #[error("singular boundary-condition system at mode {mode}: {source}")]
    SingularSystem {
        /// Mode index of the failing system
        mode: usize,
        /// Underlying factorization failure
        source: LuError,
    },

    /// A modal term evaluated to NaN or infinity
    #[error("modal term {mode} is not finite")]
    NonFiniteTerm {
        /// Mode index of the term
        mode: usize,
    },

    /// Special function evaluation failed
    #[error(transparent)]
    SpecialFunction(#[from] SpecialFunctionError),

    /// A geometry that cannot produce a scattering integral
    #[error("degenerate geometry: {reason}")]
    DegenerateGeometry {
        /// What is wrong with the geometry
        reason: String,
    },
}

impl ScatterError {
    /// True for errors detected while validating a parameter set
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownParameter { .. }
                | Self::MissingParameter { .. }
                | Self::ConflictingParameter { .. }
                | Self::MisplacedParameter { .. }
                | Self::InvalidValue { .. }
                | Self::UnknownBoundaryType { .. }
                | Self::UnsupportedBoundaryType { .. }
                | Self::UnknownShape { .. }
                | Self::UnsupportedShape { .. }
                | Self::UnknownModel { .. }
        )
    }

    /// True for inputs outside an approximation's validated range
    pub fn is_domain_error(&self) -> bool {
        matches!(self, Self::OutOfDomain { .. })
    }

    /// True for numerical failures of a single solve
    pub fn is_numeric_error(&self) -> bool {
        matches!(
            self,
            Self::SingularSystem { .. }
                | Self::NonFiniteTerm { .. }
                | Self::SpecialFunction(_)
                | Self::DegenerateGeometry { .. }
        )
    }

    /// Mode index of a numeric failure, when there is one
    pub fn mode(&self) -> Option<usize> {
        match self {
            Self::SingularSystem { mode, .. } | Self::NonFiniteTerm { mode } => Some(*mode),
            Self::SpecialFunction(err) => err.degree(),
            _ => None,
        }
    }

    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_domain(model: &str, reason: impl Into<String>) -> Self {
        Self::OutOfDomain {
            model: model.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for scattering models
pub type Result<T> = std::result::Result<T, ScatterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let missing = ScatterError::MissingParameter {
            name: "a".to_string(),
        };
        assert!(missing.is_configuration_error());
        assert!(!missing.is_domain_error());

        let domain = ScatterError::out_of_domain("hp", "ka above 20");
        assert!(domain.is_domain_error());
        assert!(!domain.is_numeric_error());
        assert_eq!(domain.to_string(), "hp: ka above 20");

        let singular = ScatterError::SingularSystem {
            mode: 7,
            source: LuError::SingularMatrix { column: 1 },
        };
        assert!(singular.is_numeric_error());
        assert_eq!(singular.mode(), Some(7));
    }

    #[test]
    fn test_special_function_mode() {
        let err: ScatterError = SpecialFunctionError::WronskianMismatch {
            m: 1,
            n: 4,
            relative_error: 1e-3,
        }
        .into();
        assert!(err.is_numeric_error());
        assert_eq!(err.mode(), Some(4));
    }
}
