//! Error handling and error types for treemip.
//!
//! Every fallible operation in the crate returns [`Result`], whose error
//! side is [`TreeMipError`]. Predictor shape problems surface as
//! [`TreeMipError::NoModel`], which is raised before an encoder adds
//! anything to the optimization model.

use std::io;
use thiserror::Error;

/// Main error type for the treemip library.
#[derive(Error, Debug)]
pub enum TreeMipError {
    /// The predictor cannot be represented as MIP constraints
    #[error("Cannot model predictor {predictor}: {message}")]
    NoModel {
        /// Short description of the offending predictor
        predictor: String,
        /// Why it cannot be modelled
        message: String,
    },

    /// Structurally invalid tree arrays
    #[error("Invalid tree: {message}")]
    InvalidTree { message: String },

    /// Invalid ensemble definition
    #[error("Invalid ensemble: {message}")]
    InvalidEnsemble { message: String },

    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Dimension mismatch errors
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// A variable handle that does not belong to the model
    #[error("Unknown variable: index {index}, model has {length} variables")]
    UnknownVariable { index: usize, length: usize },

    /// Predictor file serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        #[from]
        source: io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

/// Type alias for Results using TreeMipError
pub type Result<T> = std::result::Result<T, TreeMipError>;

impl TreeMipError {
    /// Create a "predictor not representable" error
    pub fn no_model<P, M>(predictor: P, message: M) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        TreeMipError::NoModel {
            predictor: predictor.into(),
            message: message.into(),
        }
    }

    /// Create an invalid tree error
    pub fn invalid_tree<S: Into<String>>(message: S) -> Self {
        TreeMipError::InvalidTree {
            message: message.into(),
        }
    }

    /// Create an invalid ensemble error
    pub fn invalid_ensemble<S: Into<String>>(message: S) -> Self {
        TreeMipError::InvalidEnsemble {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        TreeMipError::Config {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        TreeMipError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        TreeMipError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an unknown variable error
    pub fn unknown_variable(index: usize, length: usize) -> Self {
        TreeMipError::UnknownVariable { index, length }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        TreeMipError::Serialization {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            TreeMipError::NoModel { .. } => "no_model",
            TreeMipError::InvalidTree { .. } => "invalid_tree",
            TreeMipError::InvalidEnsemble { .. } => "invalid_ensemble",
            TreeMipError::Config { .. } => "config",
            TreeMipError::InvalidParameter { .. } => "invalid_parameter",
            TreeMipError::DimensionMismatch { .. } => "dimension_mismatch",
            TreeMipError::UnknownVariable { .. } => "unknown_variable",
            TreeMipError::Serialization { .. } => "serialization",
            TreeMipError::IO { .. } => "io",
            TreeMipError::Json { .. } => "json",
        }
    }
}

/// Convenience macro for early returns on a failed condition
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_model_error() {
        let err = TreeMipError::no_model("DecisionTree(nodes=3)", "output dimension 2");
        assert_eq!(err.category(), "no_model");
        let message = err.to_string();
        assert!(message.contains("DecisionTree(nodes=3)"));
        assert!(message.contains("output dimension 2"));
    }

    #[test]
    fn test_parameter_errors() {
        let err = TreeMipError::invalid_parameter("epsilon", "-1", "must be non-negative");
        assert_eq!(err.category(), "invalid_parameter");
        assert!(err.to_string().contains("epsilon"));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = TreeMipError::dimension_mismatch("(10, 1)", "(10, 2)");
        assert_eq!(err.category(), "dimension_mismatch");
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: expected (10, 1), got (10, 2)"
        );
    }

    #[test]
    fn test_ensure_macro() {
        fn check(value: usize) -> Result<usize> {
            ensure!(value < 3, TreeMipError::unknown_variable(value, 3));
            Ok(value)
        }

        assert!(check(1).is_ok());
        assert!(matches!(
            check(5),
            Err(TreeMipError::UnknownVariable { index: 5, length: 3 })
        ));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: TreeMipError = io_err.into();
        assert!(matches!(err, TreeMipError::IO { .. }));
        assert_eq!(err.category(), "io");
    }
}
