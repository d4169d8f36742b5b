//! Session provider abstraction.
//!
//! The provider is the asynchronous source of the longer-lived identity
//! obtained at sign-in. The request gateway consults it only when the
//! credential store holds no local token; the realtime channel uses the
//! resolved token to authenticate its stream.

use std::fmt;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::Identity;

/// A specialized `Result` for provider lookups.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Errors raised while looking up the current session.
///
/// Callers that only need a token treat any error as "no token obtainable"
/// and proceed unauthenticated; the error exists so richer consumers can log
/// or surface the cause.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// The lookup itself failed (storage, IPC, upstream service).
    #[error("session lookup failed: {0}")]
    Lookup(String),
}

/// User payload attached to a provider session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Stable user identifier.
    pub id: String,
    /// Display name, if the provider knows one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Role name.
    pub role: String,
    /// Explicit permission strings; empty means role grants apply.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// The session shape returned by the provider: an access token plus the
/// signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSession {
    /// Bearer token for outbound requests.
    pub access_token: String,
    /// The signed-in user.
    pub user: SessionUser,
}

impl ProviderSession {
    /// Convert into the tagged [`Identity`] the rest of the client consumes.
    pub fn identity(&self) -> Identity {
        Identity::Authenticated {
            subject: self.user.id.clone(),
            role: self.user.role.clone(),
            permissions: self.user.permissions.clone(),
            token: self.access_token.clone(),
        }
    }
}

/// Asynchronous source of the current sign-in session.
#[async_trait]
pub trait SessionProvider: Send + Sync + fmt::Debug {
    /// The current session, or `None` when signed out.
    async fn current_session(&self) -> ProviderResult<Option<ProviderSession>>;
}

/// In-memory [`SessionProvider`] backed by a replaceable session value.
///
/// Used by tests and by embedders that manage sign-in themselves and only
/// need to hand the resulting session to this layer.
#[derive(Debug, Clone, Default)]
pub struct StaticSessionProvider {
    session: Arc<RwLock<Option<ProviderSession>>>,
}

impl StaticSessionProvider {
    /// Provider with no session (signed out).
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider pre-loaded with `session`.
    pub fn with_session(session: ProviderSession) -> Self {
        Self {
            session: Arc::new(RwLock::new(Some(session))),
        }
    }

    /// Replace the current session. `None` signs out.
    pub fn set_session(&self, session: Option<ProviderSession>) {
        let mut guard = self.session.write().unwrap_or_else(|e| e.into_inner());
        *guard = session;
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn current_session(&self) -> ProviderResult<Option<ProviderSession>> {
        let guard = self.session.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }
}
