//! The request gateway.

use std::sync::Arc;

use reqwest::{Client as HttpClient, Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use dentira_auth::{CredentialStore, SessionProvider};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::resolver::TokenResolver;

/// Wraps every outbound HTTP call the client makes.
///
/// Each request resolves a bearer token through the [`TokenResolver`] and
/// attaches it when present. Any failure — transport or non-success status —
/// marks the credential store degraded, logs, and is returned to the caller
/// unchanged. No retries happen at this layer.
pub struct RequestGateway {
    config: GatewayConfig,
    http: HttpClient,
    store: CredentialStore,
    resolver: TokenResolver,
}

impl std::fmt::Debug for RequestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGateway")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl RequestGateway {
    /// Create a gateway over the given credential store and session
    /// provider.
    pub fn new(
        config: GatewayConfig,
        store: CredentialStore,
        provider: Arc<dyn SessionProvider>,
    ) -> Self {
        let mut builder = HttpClient::builder()
            .use_rustls_tls()
            .timeout(config.timeout);

        if let Some(ref user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let http = builder.build().expect("failed to build HTTP client");
        let resolver = TokenResolver::new(store.clone(), provider);

        Self {
            config,
            http,
            store,
            resolver,
        }
    }

    /// The credential store this gateway signals degraded mode on.
    pub fn credentials(&self) -> &CredentialStore {
        &self.store
    }

    /// GET `path` and decode the JSON response body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let response = self.execute(Method::GET, path, None).await?;
        response.json().await.map_err(GatewayError::Decode)
    }

    /// POST `body` as JSON to `path` and decode the JSON response body.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> GatewayResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::POST, path, Some(body)).await?;
        response.json().await.map_err(GatewayError::Decode)
    }

    /// PUT `body` as JSON to `path` and decode the JSON response body.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> GatewayResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::PUT, path, Some(body)).await?;
        response.json().await.map_err(GatewayError::Decode)
    }

    /// DELETE `path`, discarding any response body.
    pub async fn delete(&self, path: &str) -> GatewayResult<()> {
        self.execute(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Send one request: resolve the token, attach headers, and map any
    /// failure into degraded mode.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> GatewayResult<Response> {
        let url = self.endpoint_url(path)?;
        let mut request = self.http.request(method.clone(), url);

        if let Some(token) = self.resolver.resolve().await {
            request = request.bearer_auth(token);
        } else {
            debug!(%method, path, "no token resolved, sending unauthenticated");
        }

        for (name, value) in &self.config.headers {
            request = request.header(name, value);
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                self.store.mark_degraded();
                error!(%method, path, error = %e, "request transport failure");
                return Err(GatewayError::Transport(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            self.store.mark_degraded();
            error!(%method, path, %status, "request rejected by backend");
            return Err(GatewayError::Status { status, body });
        }

        Ok(response)
    }

    fn endpoint_url(&self, path: &str) -> GatewayResult<Url> {
        let joined = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| GatewayError::Endpoint(format!("{joined}: {e}")))
    }
}
