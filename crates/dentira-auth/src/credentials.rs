//! Process-wide credential state.
//!
//! The store holds the optional bearer token plus the degraded-mode flag and
//! is shared by cloning the handle. Reads and writes are synchronous; other
//! components observe changes through [`CredentialStore::subscribe`]. The
//! degraded flag is sticky: only [`CredentialStore::reset_degraded`] clears
//! it.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

/// Current credential state: an optional bearer token and the degraded flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Locally-set bearer token. When present it wins over the session
    /// provider's token for outbound requests.
    pub token: Option<String>,
    /// True once any gateway request has failed. Downstream data fetchers
    /// read this to decide whether to serve cached or synthetic content.
    pub degraded: bool,
}

/// Cloneable handle to the single process-wide [`Credentials`] value.
///
/// Mutations are atomic single-value writes; subscribers see each change on
/// their next poll of the watch receiver.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    inner: Arc<watch::Sender<Credentials>>,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    /// Create an empty store: no token, not degraded.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Credentials::default());
        Self {
            inner: Arc::new(tx),
        }
    }

    /// Current token, if any.
    pub fn token(&self) -> Option<String> {
        self.inner.borrow().token.clone()
    }

    /// Replace the stored token. `None` clears it.
    pub fn set_token(&self, token: Option<String>) {
        debug!(present = token.is_some(), "credential token updated");
        self.inner.send_modify(|c| c.token = token);
    }

    /// Whether the backend is presumed unreachable.
    pub fn degraded(&self) -> bool {
        self.inner.borrow().degraded
    }

    /// Flip the degraded flag. Called by the request gateway on any failed
    /// request; idempotent.
    pub fn mark_degraded(&self) {
        self.inner.send_if_modified(|c| {
            if c.degraded {
                return false;
            }
            warn!("entering degraded mode");
            c.degraded = true;
            true
        });
    }

    /// Clear the degraded flag. This is the explicit-reset path; nothing
    /// clears the flag automatically.
    pub fn reset_degraded(&self) {
        self.inner.send_if_modified(|c| {
            if !c.degraded {
                return false;
            }
            debug!("degraded mode reset");
            c.degraded = false;
            true
        });
    }

    /// Copy of the full credential state.
    pub fn snapshot(&self) -> Credentials {
        self.inner.borrow().clone()
    }

    /// Receiver that observes every credential change.
    pub fn subscribe(&self) -> watch::Receiver<Credentials> {
        self.inner.subscribe()
    }
}
