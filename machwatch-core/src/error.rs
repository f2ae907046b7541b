//! Prediction boundary errors

use thiserror::Error;

/// Everything that can go wrong when submitting a snapshot
///
/// None of these are fatal: the caller logs them and moves on to the next
/// tick without touching simulator state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    /// The service could not be reached (connect failure, timeout)
    #[error("prediction service unreachable: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("prediction service returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The body could not be understood
    #[error("malformed prediction response: {0}")]
    Malformed(String),
}
