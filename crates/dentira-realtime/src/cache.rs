//! Notification read-models shared with the UI.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::events::{NotificationAlert, ServerEvent};

/// One notification as fetched from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification identifier.
    pub id: String,
    /// Title shown in the list.
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub body: String,
    /// Whether the operator has read it.
    #[serde(default)]
    pub read: bool,
}

#[derive(Debug, Default)]
struct CacheState {
    list: Option<Vec<Notification>>,
    unread_count: Option<u64>,
}

/// Cached notification list and unread count.
///
/// `None` means "not cached, fetch on next read". A pushed count is written
/// directly (trusted value); a pushed new notification invalidates both
/// models so the next read refetches, and is additionally fanned out to
/// alert subscribers for the transient on-screen toast.
#[derive(Debug)]
pub struct NotificationCache {
    state: RwLock<CacheState>,
    alerts_tx: broadcast::Sender<NotificationAlert>,
}

impl Default for NotificationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCache {
    /// Empty cache.
    pub fn new() -> Self {
        let (alerts_tx, _) = broadcast::channel(16);
        Self {
            state: RwLock::new(CacheState::default()),
            alerts_tx,
        }
    }

    /// Cached notification list, if any.
    pub fn list(&self) -> Option<Vec<Notification>> {
        self.read().list.clone()
    }

    /// Store a freshly-fetched notification list.
    pub fn set_list(&self, list: Vec<Notification>) {
        self.write().list = Some(list);
    }

    /// Cached unread count, if any.
    pub fn unread_count(&self) -> Option<u64> {
        self.read().unread_count
    }

    /// Store a freshly-fetched unread count.
    pub fn set_unread_count(&self, count: u64) {
        self.write().unread_count = Some(count);
    }

    /// Drop both read-models, forcing a refetch on next read.
    pub fn invalidate(&self) {
        debug!("notification read-models invalidated");
        let mut state = self.write();
        state.list = None;
        state.unread_count = None;
    }

    /// Receiver for transient user-facing alerts.
    pub fn subscribe_alerts(&self) -> broadcast::Receiver<NotificationAlert> {
        self.alerts_tx.subscribe()
    }

    /// Apply one inbound event.
    pub fn apply(&self, event: ServerEvent) {
        match event {
            ServerEvent::NewNotification(alert) => {
                debug!(title = %alert.title, "new notification pushed");
                self.invalidate();
                // Nobody listening is fine; the cache invalidation already
                // happened.
                let _ = self.alerts_tx.send(alert);
            }
            ServerEvent::CountUpdate { count } => {
                debug!(count, "unread count pushed");
                self.write().unread_count = Some(count);
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}
