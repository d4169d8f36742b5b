//! Connection lifecycle for the notifications stream.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use dentira_auth::CredentialStore;

use crate::cache::NotificationCache;
use crate::config::{RealtimeConfig, ReconnectPolicy};
use crate::error::RealtimeResult;
use crate::events::{Handshake, ServerEvent};

/// Connection state, published on every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No live stream (including "attempts exhausted").
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// Stream established and authenticated.
    Connected,
}

#[derive(Debug)]
struct Connection {
    token: String,
    shutdown_tx: broadcast::Sender<()>,
    tasks: Vec<tokio::task::JoinHandle<()>>,
}

/// The authenticated notifications channel.
///
/// Owns at most one live connection at a time. [`Self::set_token`] is the
/// single lifecycle entry point: a token change tears the current connection
/// down — shutdown signal, task abort, handle await — strictly before the
/// replacement is spawned, and `None` simply leaves the channel down. Inbound
/// events are decoded in the connection task and applied to the
/// [`NotificationCache`] by a separate consumer task fed over an mpsc
/// channel.
#[derive(Debug)]
pub struct NotificationChannel {
    endpoint: Url,
    reconnect: ReconnectPolicy,
    cache: Arc<NotificationCache>,
    state_tx: Arc<watch::Sender<ChannelState>>,
    connection: Mutex<Option<Connection>>,
}

impl NotificationChannel {
    /// Channel over `config`, applying events to `cache`. No connection is
    /// attempted until a token arrives.
    pub fn new(config: RealtimeConfig, cache: Arc<NotificationCache>) -> RealtimeResult<Self> {
        let endpoint = config.endpoint_url()?;
        let (state_tx, _) = watch::channel(ChannelState::Disconnected);
        Ok(Self {
            endpoint,
            reconnect: config.reconnect,
            cache,
            state_tx: Arc::new(state_tx),
            connection: Mutex::new(None),
        })
    }

    /// The cache this channel applies events to.
    pub fn cache(&self) -> &NotificationCache {
        &self.cache
    }

    /// Current connection state.
    pub fn state(&self) -> ChannelState {
        *self.state_tx.borrow()
    }

    /// Receiver observing every connection state change.
    pub fn subscribe_state(&self) -> watch::Receiver<ChannelState> {
        self.state_tx.subscribe()
    }

    /// Adopt a new bearer token.
    ///
    /// Same token: no-op. Different token: the current connection (if any)
    /// is torn down first, then a fresh connection task is spawned for the
    /// new token. `None` tears down without a replacement.
    pub async fn set_token(&self, token: Option<String>) {
        let mut connection = self.connection.lock().await;

        if connection.as_ref().map(|c| c.token.as_str()) == token.as_deref() {
            return;
        }

        self.teardown_locked(&mut connection).await;

        let Some(token) = token else {
            return;
        };

        debug!("starting notifications connection for new token");
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let (events_tx, events_rx) = mpsc::channel(64);

        let runner = tokio::spawn(run_connection(
            self.endpoint.clone(),
            token.clone(),
            self.reconnect,
            events_tx,
            Arc::clone(&self.state_tx),
            shutdown_rx,
        ));
        let consumer = tokio::spawn(run_consumer(Arc::clone(&self.cache), events_rx));

        *connection = Some(Connection {
            token,
            shutdown_tx,
            tasks: vec![runner, consumer],
        });
    }

    /// Tear the connection down unconditionally. Idempotent.
    pub async fn shutdown(&self) {
        let mut connection = self.connection.lock().await;
        self.teardown_locked(&mut connection).await;
    }

    /// Follow the credential store: the channel adopts every token change,
    /// including sign-out. The returned handle is the watcher task; abort it
    /// to stop following (the channel itself is left as-is).
    pub fn watch_credentials(
        self: &Arc<Self>,
        store: &CredentialStore,
    ) -> tokio::task::JoinHandle<()> {
        let mut rx = store.subscribe();
        let channel = Arc::clone(self);
        tokio::spawn(async move {
            let mut token = rx.borrow_and_update().token.clone();
            channel.set_token(token.clone()).await;

            while rx.changed().await.is_ok() {
                let next = rx.borrow_and_update().token.clone();
                if next != token {
                    token.clone_from(&next);
                    channel.set_token(next).await;
                }
            }
            debug!("credential watcher terminated");
        })
    }

    async fn teardown_locked(&self, connection: &mut Option<Connection>) {
        if let Some(conn) = connection.take() {
            debug!("tearing down notifications connection");
            let _ = conn.shutdown_tx.send(());
            for task in conn.tasks {
                task.abort();
                // Wait the task out so the old connection is fully gone
                // before a successor may be spawned.
                let _ = task.await;
            }
            set_state(&self.state_tx, ChannelState::Disconnected);
        }
    }
}

impl Drop for NotificationChannel {
    fn drop(&mut self) {
        if let Ok(mut connection) = self.connection.try_lock()
            && let Some(conn) = connection.take()
        {
            let _ = conn.shutdown_tx.send(());
            for task in conn.tasks {
                task.abort();
            }
        }
    }
}

/// Connect-handshake-read loop with fixed-delay reconnection.
async fn run_connection(
    endpoint: Url,
    token: String,
    reconnect: ReconnectPolicy,
    events_tx: mpsc::Sender<ServerEvent>,
    state_tx: Arc<watch::Sender<ChannelState>>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut attempt: u32 = 0;
    let session = Uuid::new_v4();
    debug!(%session, %endpoint, "notifications connection task started");

    loop {
        match reconnect.delay(attempt) {
            Some(delay) if delay.is_zero() => {}
            Some(delay) => {
                warn!(%session, attempt, ?delay, "reconnecting to notifications stream");
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = sleep(delay) => {}
                }
            }
            None => {
                error!(
                    %session,
                    max_attempts = reconnect.max_attempts,
                    "reconnection attempts exhausted, notifications stream stays down"
                );
                break;
            }
        }

        set_state(&state_tx, ChannelState::Connecting);

        let stream = tokio::select! {
            _ = shutdown_rx.recv() => break,
            connected = connect_async(endpoint.as_str()) => match connected {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!(%session, error = %e, attempt, "notifications connect failed");
                    set_state(&state_tx, ChannelState::Disconnected);
                    attempt += 1;
                    continue;
                }
            }
        };

        let (mut writer, mut reader) = stream.split();

        let handshake = match serde_json::to_string(&Handshake {
            token: token.clone(),
        }) {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, "failed to encode handshake frame");
                break;
            }
        };
        if let Err(e) = writer.send(Message::text(handshake)).await {
            warn!(%session, error = %e, attempt, "notifications handshake failed");
            set_state(&state_tx, ChannelState::Disconnected);
            attempt += 1;
            continue;
        }

        info!(%session, "notifications stream connected");
        set_state(&state_tx, ChannelState::Connected);
        attempt = 0;

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    let _ = writer.send(Message::Close(None)).await;
                    set_state(&state_tx, ChannelState::Disconnected);
                    debug!(%session, "notifications connection task terminated");
                    return;
                }
                frame = reader.next() => match frame {
                    Some(Ok(Message::Text(text))) => match ServerEvent::decode(text.as_str()) {
                        Ok(event) => {
                            if events_tx.send(event).await.is_err() {
                                debug!(%session, "event consumer gone, closing notifications stream");
                                return;
                            }
                        }
                        Err(e) => debug!(%session, error = %e, "ignoring unrecognized notifications frame"),
                    },
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = writer.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!(%session, "notifications stream closed by backend");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(%session, error = %e, "notifications stream error");
                        break;
                    }
                }
            }
        }

        set_state(&state_tx, ChannelState::Disconnected);
        attempt += 1;
    }

    set_state(&state_tx, ChannelState::Disconnected);
    debug!(%session, "notifications connection task terminated");
}

/// Applies decoded events to the cache, decoupled from the transport.
async fn run_consumer(cache: Arc<NotificationCache>, mut events_rx: mpsc::Receiver<ServerEvent>) {
    while let Some(event) = events_rx.recv().await {
        cache.apply(event);
    }
    debug!("notifications consumer terminated");
}

fn set_state(state_tx: &watch::Sender<ChannelState>, state: ChannelState) {
    state_tx.send_if_modified(|current| {
        if *current == state {
            false
        } else {
            debug!(?state, "notifications channel state changed");
            *current = state;
            true
        }
    });
}
