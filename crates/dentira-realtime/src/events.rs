//! Wire types for the notifications stream.
//!
//! Frames are JSON text. The client sends one [`Handshake`] immediately
//! after connecting; everything inbound is a [`ServerEvent`] envelope of the
//! form `{"event": "<name>", "data": {...}}`.

use serde::{Deserialize, Serialize};

/// First frame sent on every new connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handshake {
    /// Bearer token authenticating the stream.
    pub token: String,
}

/// A transient user-facing notification alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationAlert {
    /// Alert title.
    pub title: String,
    /// Alert body text.
    #[serde(default)]
    pub body: String,
    /// Additional payload fields the backend may attach.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Typed inbound event sum, decoded from the wire envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// A new notification arrived: surface an alert and invalidate the
    /// cached read-models.
    #[serde(rename = "notification.new")]
    NewNotification(NotificationAlert),

    /// Authoritative unread count pushed by the backend: written straight
    /// into the cache, no refetch.
    #[serde(rename = "notification.count")]
    CountUpdate {
        /// Current unread count.
        count: u64,
    },
}

impl ServerEvent {
    /// Decode one inbound text frame. Unknown event names and malformed
    /// payloads are errors; the caller drops them.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_new_notification() {
        let event = ServerEvent::decode(
            r#"{"event":"notification.new","data":{"title":"Recall due","body":"Patient J. Doe","appointmentId":"a-77"}}"#,
        )
        .unwrap();

        match event {
            ServerEvent::NewNotification(alert) => {
                assert_eq!(alert.title, "Recall due");
                assert_eq!(alert.body, "Patient J. Doe");
                assert_eq!(alert.extra["appointmentId"], json!("a-77"));
            }
            other => panic!("expected notification.new, got {other:?}"),
        }
    }

    #[test]
    fn decodes_count_update() {
        let event =
            ServerEvent::decode(r#"{"event":"notification.count","data":{"count":12}}"#).unwrap();
        assert_eq!(event, ServerEvent::CountUpdate { count: 12 });
    }

    #[test]
    fn body_is_optional() {
        let event = ServerEvent::decode(
            r#"{"event":"notification.new","data":{"title":"Ping"}}"#,
        )
        .unwrap();
        match event {
            ServerEvent::NewNotification(alert) => assert_eq!(alert.body, ""),
            other => panic!("expected notification.new, got {other:?}"),
        }
    }

    #[test]
    fn unknown_event_is_an_error() {
        assert!(ServerEvent::decode(r#"{"event":"billing.update","data":{}}"#).is_err());
        assert!(ServerEvent::decode("not json").is_err());
    }

    #[test]
    fn handshake_wire_shape() {
        let frame = serde_json::to_value(Handshake {
            token: "tok-1".into(),
        })
        .unwrap();
        assert_eq!(frame, json!({"token": "tok-1"}));
    }
}
