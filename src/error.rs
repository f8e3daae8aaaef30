use thiserror::Error;

/// Speedometer telemetry error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TelemetryError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for telemetry operations
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Map a poisoned lock into an internal error naming the guarded resource
pub(crate) fn lock_poisoned(what: &str) -> TelemetryError {
    TelemetryError::Internal(format!("Failed to acquire {} lock", what))
}
