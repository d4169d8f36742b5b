//! Realtime channel configuration.

use std::time::Duration;

use url::Url;

use crate::error::{RealtimeError, RealtimeResult};

/// Reconnection policy: a fixed delay between attempts, capped.
///
/// There is intentionally no backoff and no transport fallback; a dropped
/// stream is retried on the same transport at a constant cadence until the
/// cap is reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Whether reconnection is attempted at all.
    pub enabled: bool,
    /// Maximum number of reconnection attempts after a failure.
    pub max_attempts: u32,
    /// Fixed delay before each reconnection attempt.
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 10,
            delay: Duration::from_secs(3),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before connection attempt number `attempt` (0 is the initial
    /// connect), or `None` once attempts are exhausted.
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 {
            return Some(Duration::ZERO);
        }
        if !self.enabled || attempt > self.max_attempts {
            return None;
        }
        Some(self.delay)
    }
}

/// Configuration for [`NotificationChannel`](crate::NotificationChannel).
#[derive(Clone, Debug)]
pub struct RealtimeConfig {
    /// WebSocket base URL (e.g., `wss://api.example.com`).
    pub base_url: String,

    /// Notifications namespace path.
    pub path: String,

    /// Reconnection policy.
    pub reconnect: ReconnectPolicy,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            base_url: "ws://localhost:8080".to_string(),
            path: "/notifications".to_string(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl RealtimeConfig {
    /// Config pointed at `base_url` with defaults for everything else.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Override the namespace path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Override the reconnection policy.
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Full endpoint URL for the notifications stream.
    pub fn endpoint_url(&self) -> RealtimeResult<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| RealtimeError::Endpoint(format!("{joined}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_delay_policy() {
        let policy = ReconnectPolicy::default();

        // Initial connect is immediate, every retry waits the fixed delay.
        assert_eq!(policy.delay(0), Some(Duration::ZERO));
        assert_eq!(policy.delay(1), Some(Duration::from_secs(3)));
        assert_eq!(policy.delay(10), Some(Duration::from_secs(3)));
        assert_eq!(policy.delay(11), None);
    }

    #[test]
    fn disabled_policy_never_retries() {
        let policy = ReconnectPolicy {
            enabled: false,
            ..ReconnectPolicy::default()
        };

        assert_eq!(policy.delay(0), Some(Duration::ZERO));
        assert_eq!(policy.delay(1), None);
    }

    #[test]
    fn endpoint_url_joins_base_and_path() {
        let config = RealtimeConfig::new("ws://clinic.test:9000/");
        assert_eq!(
            config.endpoint_url().unwrap().as_str(),
            "ws://clinic.test:9000/notifications"
        );

        let config = RealtimeConfig::new("ws://clinic.test").with_path("push");
        assert_eq!(
            config.endpoint_url().unwrap().as_str(),
            "ws://clinic.test/push"
        );
    }

    #[test]
    fn endpoint_url_rejects_garbage() {
        let config = RealtimeConfig::new("not a url");
        assert!(matches!(
            config.endpoint_url(),
            Err(RealtimeError::Endpoint(_))
        ));
    }
}
