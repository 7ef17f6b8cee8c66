//! Error types for the Life Morale engine
//!
//! Only structurally malformed requests fail. Partial or out-of-range field
//! data is coerced at the boundary and reported through `InputFlag`s instead.

use thiserror::Error;

/// Errors that can occur while scoring a request
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
