//! Gateway error types.

use thiserror::Error;

/// A specialized `Result` type for gateway operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Represents errors raised by the request gateway.
///
/// Failures are returned unchanged: `Transport` carries the underlying
/// client error by value and `Status` preserves the exact response status
/// and body, so callers observe the original failure rather than a
/// gateway-shaped summary.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GatewayError {
    /// The request could not be sent or the response could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("request failed with status {status}")]
    Status {
        /// Response status code.
        status: reqwest::StatusCode,
        /// Response body, captured for diagnostics.
        body: String,
    },

    /// A request body could not be encoded as JSON.
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// A successful response carried a body that did not decode into the
    /// expected type. Does not indicate backend unavailability.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] reqwest::Error),

    /// The configured base URL and request path do not form a valid URL.
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
}

impl GatewayError {
    /// Status code of a `Status` failure, if that is what this is.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
