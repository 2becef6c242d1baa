use thiserror::Error;

/// Errors raised by the labelling engine and its file layer.
///
/// Reaching the round limit without a fixpoint is not represented here; it is
/// reported through [`PropagationState::MaxIterReached`](crate::PropagationState).
#[derive(Debug, Error)]
pub enum CcError {
    /// Malformed input: missing columns, null or mixed-type identifiers.
    /// Raised before any propagation round runs.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// An internal invariant broke mid-computation. No partial result survives.
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("packed edge file: {0}")]
    Pack(#[from] bincode::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CcError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        CcError::InvalidInput(msg.into())
    }

    pub(crate) fn integrity(msg: impl Into<String>) -> Self {
        CcError::IntegrityViolation(msg.into())
    }

    /// Is this a rejection of the caller's input (as opposed to an engine fault or IO)?
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, CcError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, CcError>;
