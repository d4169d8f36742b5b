//! Realtime channel error types.

use thiserror::Error;

/// A specialized `Result` type for realtime channel operations.
pub type RealtimeResult<T> = std::result::Result<T, RealtimeError>;

/// Errors surfaced by the notifications channel.
///
/// Connection drops are deliberately absent: they are absorbed by the
/// reconnection loop and never reach the caller.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum RealtimeError {
    /// The configured base URL and path do not form a valid WebSocket URL.
    #[error("invalid notifications endpoint: {0}")]
    Endpoint(String),
}
