//! Per-request token resolution.

use std::sync::Arc;

use tracing::debug;

use dentira_auth::{CredentialStore, SessionProvider};

/// Decides, per outbound request, which token source wins.
///
/// The credential store is read first — a locally-set token always overrides
/// the provider. Only when the store is empty is the session provider
/// queried. A provider failure resolves to "no token": the request proceeds
/// unauthenticated and the backend's rejection, if any, surfaces downstream.
#[derive(Debug, Clone)]
pub struct TokenResolver {
    store: CredentialStore,
    provider: Arc<dyn SessionProvider>,
}

impl TokenResolver {
    /// Resolver over the given store and provider.
    pub fn new(store: CredentialStore, provider: Arc<dyn SessionProvider>) -> Self {
        Self { store, provider }
    }

    /// The token to attach to the next request, if any.
    pub async fn resolve(&self) -> Option<String> {
        if let Some(token) = self.store.token() {
            return Some(token);
        }

        match self.provider.current_session().await {
            Ok(Some(session)) => Some(session.access_token),
            Ok(None) => None,
            Err(e) => {
                debug!(error = %e, "session provider lookup failed, proceeding unauthenticated");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dentira_auth::{ProviderSession, SessionUser, StaticSessionProvider};

    fn provider_with_token(token: &str) -> StaticSessionProvider {
        StaticSessionProvider::with_session(ProviderSession {
            access_token: token.into(),
            user: SessionUser {
                id: "u-1".into(),
                name: None,
                role: "user".into(),
                permissions: vec![],
            },
        })
    }

    #[tokio::test]
    async fn local_token_wins() {
        let store = CredentialStore::new();
        store.set_token(Some("local".into()));
        let resolver = TokenResolver::new(store, Arc::new(provider_with_token("remote")));

        assert_eq!(resolver.resolve().await.as_deref(), Some("local"));
    }

    #[tokio::test]
    async fn falls_back_to_provider() {
        let resolver = TokenResolver::new(
            CredentialStore::new(),
            Arc::new(provider_with_token("remote")),
        );

        assert_eq!(resolver.resolve().await.as_deref(), Some("remote"));
    }

    #[tokio::test]
    async fn no_source_means_no_token() {
        let resolver =
            TokenResolver::new(CredentialStore::new(), Arc::new(StaticSessionProvider::new()));

        assert_eq!(resolver.resolve().await, None);
    }
}
