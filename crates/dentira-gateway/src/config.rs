//! Gateway configuration.

use std::collections::HashMap;
use std::time::Duration;

/// Configuration for [`RequestGateway`](crate::RequestGateway).
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Base URL (e.g., `https://api.example.com`). Request paths are
    /// appended to it.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// User agent string (`None` disables the User-Agent header).
    pub user_agent: Option<String>,

    /// Custom headers attached to every request.
    pub headers: HashMap<String, String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: Some(format!("Dentira-Client/{}", env!("CARGO_PKG_VERSION"))),
            headers: HashMap::new(),
        }
    }
}

impl GatewayConfig {
    /// Config pointed at `base_url` with defaults for everything else.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set or disable the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Add a header attached to every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}
