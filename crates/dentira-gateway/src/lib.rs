//! # Dentira Gateway
//!
//! The request gateway wraps every HTTP call the Dentira client makes:
//!
//! - resolves which bearer token to attach — the locally-set credential
//!   store token wins, otherwise the session provider is consulted, and when
//!   neither yields a token the request goes out unauthenticated;
//! - attaches `Authorization: Bearer <token>` and any configured headers;
//! - on any failure (transport error or non-success status) flips the
//!   process-wide degraded flag, logs a diagnostic entry, and returns the
//!   original failure unchanged.
//!
//! The gateway performs no retries and swallows nothing; it is an
//! observability-and-signaling layer. Whether degraded mode leads to cached
//! or synthetic content is decided by the data-fetch collaborators that read
//! the flag.

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod resolver;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use gateway::RequestGateway;
pub use resolver::TokenResolver;
