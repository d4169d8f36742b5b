//! # Dentira Auth
//!
//! Identity and credential foundation for the Dentira practice-management
//! client. This crate owns the three pieces every other client crate builds
//! on:
//!
//! - [`CredentialStore`] — the process-wide holder of the optional bearer
//!   token and the sticky degraded-mode flag, with synchronous get/set and a
//!   watch-based `subscribe()` for observers.
//! - [`Identity`] — the tagged session identity
//!   (`Authenticated { subject, role, permissions, token }` or `Anonymous`)
//!   carrying the pure permission evaluator.
//! - [`SessionProvider`] — the asynchronous source of the longer-lived
//!   sign-in session, consulted by the request gateway when the credential
//!   store holds no token.
//!
//! ## Permission model
//!
//! Permission checks are synchronous and side-effect free so they can run
//! from rendering logic. Resolution order: the `superadmin` role passes
//! everything; an explicit `"*"` grant passes everything; otherwise the
//! effective permission set is matched exactly. Identities without explicit
//! permissions fall back to the static role grant table in [`grants`].

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]

pub mod credentials;
pub mod grants;
pub mod identity;
pub mod provider;

pub use credentials::{CredentialStore, Credentials};
pub use grants::{PERMISSION_WILDCARD, ROLE_ADMIN, ROLE_SUPERADMIN, ROLE_USER, grants_for_role};
pub use identity::Identity;
pub use provider::{
    ProviderError, ProviderResult, ProviderSession, SessionProvider, SessionUser,
    StaticSessionProvider,
};
