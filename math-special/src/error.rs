//! Error types for special function evaluation

use thiserror::Error;

/// Errors raised while evaluating special functions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpecialFunctionError {
    /// An argument is outside the domain of the function
    #[error("invalid argument for {function}: {reason}")]
    InvalidArgument {
        /// Function that rejected the argument
        function: &'static str,
        /// Why the argument was rejected
        reason: String,
    },

    /// Radial functions of the first and second kind are inconsistent
    #[error(
        "spheroidal radial functions for m={m}, n={n} fail the Wronskian check (relative error {relative_error:.3e})"
    )]
    WronskianMismatch {
        /// Azimuthal order
        m: usize,
        /// Degree
        n: usize,
        /// |W·c(ξ²-1) - 1|
        relative_error: f64,
    },

    /// The expansion coefficients of a spheroidal mode could not be resolved
    #[error("spheroidal expansion for m={m}, n={n} is degenerate")]
    DegenerateExpansion {
        /// Azimuthal order
        m: usize,
        /// Degree
        n: usize,
    },
}

impl SpecialFunctionError {
    /// Degree of the mode that failed, if the error is tied to one
    pub fn degree(&self) -> Option<usize> {
        match self {
            Self::WronskianMismatch { n, .. } | Self::DegenerateExpansion { n, .. } => Some(*n),
            Self::InvalidArgument { .. } => None,
        }
    }
}

/// Result type for special function evaluation
pub type Result<T> = std::result::Result<T, SpecialFunctionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SpecialFunctionError::WronskianMismatch {
            m: 2,
            n: 5,
            relative_error: 1.5e-3,
        };
        let msg = err.to_string();
        assert!(msg.contains("m=2, n=5"));
        assert!(msg.contains("1.500e-3"));
        assert_eq!(err.degree(), Some(5));

        let err = SpecialFunctionError::InvalidArgument {
            function: "prolate spheroidal",
            reason: "c must be positive".to_string(),
        };
        assert_eq!(err.degree(), None);
        assert!(err.to_string().contains("c must be positive"));
    }
}
