//! Error types for the SPSA optimizer.

use thiserror::Error;

/// Errors raised by the optimizer itself.
#[derive(Debug, Error)]
pub enum SpsaError {
    /// Invalid constructor arguments or schedule constants.
    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },

    /// A parameter array changed shape between steps of the same run.
    #[error("Shape mismatch for parameter {index}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        index: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// The parameter collection changed length between steps of the same run.
    #[error("Parameter count mismatch: expected {expected} arrays, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// A configuration document could not be deserialized.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// A configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpsaError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Whether this error reports a parameter layout disagreement.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(
            self,
            Self::ShapeMismatch { .. } | Self::LengthMismatch { .. }
        )
    }
}

impl From<serde_yaml::Error> for SpsaError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for SpsaError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Error returned by a single optimization step.
///
/// Objective failures are carried as-is in [`StepError::Objective`]; the
/// optimizer never inspects or wraps the inner value.
#[derive(Debug, Error)]
pub enum StepError<E> {
    /// The optimizer rejected the call before or after evaluating.
    #[error(transparent)]
    Optimizer(#[from] SpsaError),

    /// The objective returned an error.
    #[error("Objective evaluation failed: {0}")]
    Objective(E),
}

impl<E> StepError<E> {
    /// Extract the objective's error, if that is what failed.
    pub fn into_objective(self) -> Option<E> {
        match self {
            Self::Objective(e) => Some(e),
            Self::Optimizer(_) => None,
        }
    }
}

impl From<StepError<std::convert::Infallible>> for SpsaError {
    fn from(e: StepError<std::convert::Infallible>) -> Self {
        match e {
            StepError::Optimizer(e) => e,
            StepError::Objective(never) => match never {},
        }
    }
}

/// Result type for optimizer configuration and bookkeeping.
pub type SpsaResult<T> = Result<T, SpsaError>;
