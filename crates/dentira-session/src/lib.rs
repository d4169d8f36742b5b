//! # Dentira Session
//!
//! Operator inactivity monitoring for the Dentira client. The core is an
//! explicit finite-state machine over {Active, Warning, Expired}:
//!
//! - `warn_after` seconds without qualifying activity open the warning with
//!   a countdown initialized to the configured warning duration;
//! - the countdown decrements once per elapsed second; the explicit
//!   "stay logged in" action — and nothing else — returns to Active;
//! - reaching zero expires the session exactly once. The monitor owns no
//!   sign-out logic; collaborators observe `Expired` on the status channel
//!   and perform the actual sign-out.
//!
//! The FSM is driven by an injected [`Clock`], so its tests never sleep.
//! [`IdleSession`] wraps it in a 1 Hz driver task for production use.

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]

pub mod clock;
pub mod monitor;

pub use clock::{Clock, ManualClock, SystemClock};
pub use monitor::{IdleConfig, IdleMonitor, IdleSession, IdleState, IdleStatus};
