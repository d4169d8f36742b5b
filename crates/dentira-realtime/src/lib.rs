//! # Dentira Realtime
//!
//! Authenticated push channel for the Dentira client. Given a bearer token,
//! [`NotificationChannel`] maintains exactly one WebSocket stream to the
//! backend's `/notifications` endpoint:
//!
//! - the first frame after connecting is the `{"token": ...}` handshake;
//! - dropped connections are retried automatically on a fixed delay (no
//!   backoff) up to a configured attempt cap, after which the channel stays
//!   down until the token changes or the channel is recreated;
//! - inbound frames decode into a typed [`ServerEvent`] sum and flow over a
//!   channel into the [`NotificationCache`], keeping transport and
//!   cache-update logic apart;
//! - changing the token tears the current connection down *before* the
//!   replacement is created, so two live connections never coexist. No
//!   token means no connection at all.

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]

pub mod cache;
pub mod channel;
pub mod config;
pub mod error;
pub mod events;

pub use cache::{Notification, NotificationCache};
pub use channel::{ChannelState, NotificationChannel};
pub use config::{RealtimeConfig, ReconnectPolicy};
pub use error::{RealtimeError, RealtimeResult};
pub use events::{Handshake, NotificationAlert, ServerEvent};
