//! Error types.
//!
//! Two layers:
//!
//! - [`PricingError`]: typed failures of the fitting / exceedance / premium core.
//!   Callers can match on the variant and pick their own messaging.
//! - [`AppError`]: what the binary reports (a message plus a process exit code).

use thiserror::Error;

/// Minimum number of distinct positive observations required for a fit.
pub const MIN_DISTINCT_OBSERVATIONS: usize = 2;

/// Result alias for the pricing core.
pub type PricingResult<T> = Result<T, PricingError>;

/// Failures of the pricing core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Too few valid observations left after cleaning.
    #[error("Insufficient data: need at least {required} distinct positive observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// The likelihood solver did not reach valid positive parameters.
    #[error("Weibull fit did not converge after {iterations} iterations: {reason}")]
    FitConvergence { iterations: u32, reason: String },

    /// Out-of-domain input to exceedance or premium computation.
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

impl PricingError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn insufficient_data(actual: usize) -> Self {
        Self::InsufficientData {
            required: MIN_DISTINCT_OBSERVATIONS,
            actual,
        }
    }

    pub fn fit_convergence(iterations: u32, reason: impl Into<String>) -> Self {
        Self::FitConvergence {
            iterations,
            reason: reason.into(),
        }
    }

    /// Process exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            PricingError::InvalidArgument { .. } => 2,
            PricingError::InsufficientData { .. } => 3,
            PricingError::FitConvergence { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
