//! The idle monitor finite-state machine and its driver task.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};

/// Idle monitor timings.
#[derive(Debug, Clone, Copy)]
pub struct IdleConfig {
    /// Inactivity span after which the warning opens.
    pub warn_after: Duration,
    /// Length of the warning countdown.
    pub warning_duration: Duration,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            warn_after: Duration::from_secs(600),
            warning_duration: Duration::from_secs(60),
        }
    }
}

impl IdleConfig {
    /// Set the inactivity span before the warning opens.
    pub fn with_warn_after(mut self, warn_after: Duration) -> Self {
        self.warn_after = warn_after;
        self
    }

    /// Set the warning countdown length.
    pub fn with_warning_duration(mut self, warning_duration: Duration) -> Self {
        self.warning_duration = warning_duration;
        self
    }
}

/// Monitor state. `Expired` is terminal for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleState {
    /// Operator considered present.
    Active,
    /// Countdown running; sign-out is imminent unless confirmed.
    Warning,
    /// Countdown hit zero. A collaborator performs the sign-out.
    Expired,
}

/// Read-only monitor status, published on every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdleStatus {
    /// Current state.
    pub state: IdleState,
    /// Whole seconds left on the warning countdown; 0 outside Warning.
    pub remaining_seconds: u64,
}

impl IdleStatus {
    /// Whether the warning dialog should be open.
    pub fn warning_open(&self) -> bool {
        self.state == IdleState::Warning
    }
}

/// Inactivity finite-state machine.
///
/// Pure state over an injected [`Clock`]: nothing here sleeps or spawns.
/// [`IdleMonitor::poll`] performs due transitions against the clock's now
/// and is the only place state advances; activity and the stay-logged-in
/// action merely move the reference instants it compares against.
#[derive(Debug)]
pub struct IdleMonitor {
    config: IdleConfig,
    clock: Arc<dyn Clock>,
    state: IdleState,
    last_activity: Instant,
    warning_started: Option<Instant>,
}

impl IdleMonitor {
    /// Monitor in `Active`, treating creation time as the last activity.
    pub fn new(config: IdleConfig, clock: Arc<dyn Clock>) -> Self {
        let last_activity = clock.now();
        Self {
            config,
            clock,
            state: IdleState::Active,
            last_activity,
            warning_started: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> IdleState {
        self.state
    }

    /// A qualifying activity event (pointer/key/touch). Resets the
    /// inactivity timer while `Active`; deliberately ignored while the
    /// warning is open — only [`Self::stay_logged_in`] dismisses it.
    pub fn record_activity(&mut self) {
        if self.state == IdleState::Active {
            self.last_activity = self.clock.now();
        }
    }

    /// The explicit "stay logged in" action: dismisses an open warning and
    /// resets the inactivity timer. A no-op once expired.
    pub fn stay_logged_in(&mut self) {
        match self.state {
            IdleState::Active => {
                self.last_activity = self.clock.now();
            }
            IdleState::Warning => {
                debug!("warning dismissed, operator staying logged in");
                self.state = IdleState::Active;
                self.warning_started = None;
                self.last_activity = self.clock.now();
            }
            IdleState::Expired => {}
        }
    }

    /// Perform any due transition and return the resulting status.
    pub fn poll(&mut self) -> IdleStatus {
        let now = self.clock.now();
        match self.state {
            IdleState::Active => {
                if now.duration_since(self.last_activity) >= self.config.warn_after {
                    self.state = IdleState::Warning;
                    self.warning_started = Some(now);
                    info!(
                        remaining_seconds = self.config.warning_duration.as_secs(),
                        "inactivity warning opened"
                    );
                }
            }
            IdleState::Warning => {
                let started = self.warning_started.unwrap_or(now);
                if now.duration_since(started) >= self.config.warning_duration {
                    self.state = IdleState::Expired;
                    self.warning_started = None;
                    info!("idle countdown reached zero, session expired");
                }
            }
            IdleState::Expired => {}
        }
        self.status_at(now)
    }

    /// Current status without advancing state.
    pub fn status(&self) -> IdleStatus {
        self.status_at(self.clock.now())
    }

    fn status_at(&self, now: Instant) -> IdleStatus {
        let remaining_seconds = match (self.state, self.warning_started) {
            (IdleState::Warning, Some(started)) => {
                let elapsed = now.duration_since(started);
                self.config.warning_duration.saturating_sub(elapsed).as_secs()
            }
            _ => 0,
        };
        IdleStatus {
            state: self.state,
            remaining_seconds,
        }
    }
}

/// An [`IdleMonitor`] driven by a 1 Hz task.
///
/// Exactly one driver task exists per session; it polls the machine once a
/// second and publishes status changes on a watch channel. The task ends on
/// expiry (the state is terminal) or on [`IdleSession::shutdown`], and is
/// aborted when the session is dropped so no timer outlives its owner.
#[derive(Debug)]
pub struct IdleSession {
    monitor: Arc<Mutex<IdleMonitor>>,
    status_tx: Arc<watch::Sender<IdleStatus>>,
    shutdown_tx: broadcast::Sender<()>,
    task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl IdleSession {
    /// Spawn the driver over the runtime clock.
    pub fn spawn(config: IdleConfig) -> Self {
        Self::spawn_with_clock(config, Arc::new(SystemClock))
    }

    /// Spawn the driver over a custom clock.
    pub fn spawn_with_clock(config: IdleConfig, clock: Arc<dyn Clock>) -> Self {
        let monitor = Arc::new(Mutex::new(IdleMonitor::new(config, clock)));
        let initial = lock(&monitor).status();
        let (status_tx, _) = watch::channel(initial);
        let status_tx = Arc::new(status_tx);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let task = Self::spawn_driver(Arc::clone(&monitor), Arc::clone(&status_tx), shutdown_rx);

        Self {
            monitor,
            status_tx,
            shutdown_tx,
            task: Mutex::new(Some(task)),
        }
    }

    fn spawn_driver(
        monitor: Arc<Mutex<IdleMonitor>>,
        status_tx: Arc<watch::Sender<IdleStatus>>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            debug!("idle monitor task started");

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        debug!("idle monitor received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        let status = lock(&monitor).poll();
                        publish(&status_tx, status);
                        if status.state == IdleState::Expired {
                            break;
                        }
                    }
                }
            }

            debug!("idle monitor task terminated");
        })
    }

    /// Forward a qualifying activity event.
    pub fn record_activity(&self) {
        let mut monitor = lock(&self.monitor);
        monitor.record_activity();
        let status = monitor.status();
        drop(monitor);
        publish(&self.status_tx, status);
    }

    /// The explicit "stay logged in" action.
    pub fn stay_logged_in(&self) {
        let mut monitor = lock(&self.monitor);
        monitor.stay_logged_in();
        let status = monitor.status();
        drop(monitor);
        publish(&self.status_tx, status);
    }

    /// Last published status.
    pub fn status(&self) -> IdleStatus {
        *self.status_tx.borrow()
    }

    /// Receiver observing every status change, including the terminal
    /// `Expired` the sign-out collaborator acts on.
    pub fn subscribe(&self) -> watch::Receiver<IdleStatus> {
        self.status_tx.subscribe()
    }

    /// Stop the driver task. Idempotent.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
        if let Some(task) = lock(&self.task).take() {
            task.abort();
        }
    }
}

impl Drop for IdleSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn publish(status_tx: &watch::Sender<IdleStatus>, status: IdleStatus) {
    status_tx.send_if_modified(|current| {
        if *current == status {
            false
        } else {
            *current = status;
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const SEC: Duration = Duration::from_secs(1);

    fn monitor(clock: &ManualClock) -> IdleMonitor {
        IdleMonitor::new(IdleConfig::default(), Arc::new(clock.clone()))
    }

    #[test]
    fn warning_opens_after_warn_after_with_full_countdown() {
        let clock = ManualClock::new();
        let mut monitor = monitor(&clock);

        clock.advance(Duration::from_secs(599));
        assert_eq!(monitor.poll().state, IdleState::Active);

        clock.advance(SEC);
        let status = monitor.poll();
        assert_eq!(status.state, IdleState::Warning);
        assert!(status.warning_open());
        assert_eq!(status.remaining_seconds, 60);
    }

    #[test]
    fn activity_while_active_resets_without_transition() {
        let clock = ManualClock::new();
        let mut monitor = monitor(&clock);

        clock.advance(Duration::from_secs(599));
        monitor.record_activity();
        clock.advance(Duration::from_secs(599));
        assert_eq!(monitor.poll().state, IdleState::Active);

        clock.advance(SEC);
        assert_eq!(monitor.poll().state, IdleState::Warning);
    }

    #[test]
    fn countdown_decrements_once_per_second() {
        let clock = ManualClock::new();
        let mut monitor = monitor(&clock);

        clock.advance(Duration::from_secs(600));
        assert_eq!(monitor.poll().remaining_seconds, 60);

        for expected in (1..60).rev() {
            clock.advance(SEC);
            let status = monitor.poll();
            assert_eq!(status.state, IdleState::Warning);
            assert_eq!(status.remaining_seconds, expected);
        }
    }

    #[test]
    fn countdown_reaching_zero_expires_exactly_once() {
        let clock = ManualClock::new();
        let mut monitor = monitor(&clock);

        clock.advance(Duration::from_secs(600));
        monitor.poll();
        clock.advance(Duration::from_secs(60));

        let status = monitor.poll();
        assert_eq!(status.state, IdleState::Expired);
        assert_eq!(status.remaining_seconds, 0);

        // Terminal: nothing moves it afterwards.
        clock.advance(Duration::from_secs(1000));
        monitor.record_activity();
        monitor.stay_logged_in();
        assert_eq!(monitor.poll().state, IdleState::Expired);
    }

    #[test]
    fn activity_does_not_dismiss_open_warning() {
        let clock = ManualClock::new();
        let mut monitor = monitor(&clock);

        clock.advance(Duration::from_secs(600));
        monitor.poll();
        monitor.record_activity();
        clock.advance(SEC);

        let status = monitor.poll();
        assert_eq!(status.state, IdleState::Warning);
        assert_eq!(status.remaining_seconds, 59);
    }

    #[test]
    fn stay_logged_in_cancels_countdown_and_resets_timer() {
        let clock = ManualClock::new();
        let mut monitor = monitor(&clock);

        clock.advance(Duration::from_secs(600));
        monitor.poll();
        clock.advance(Duration::from_secs(30));
        monitor.poll();

        monitor.stay_logged_in();
        let status = monitor.poll();
        assert_eq!(status.state, IdleState::Active);
        assert_eq!(status.remaining_seconds, 0);

        // Fresh inactivity window from the confirmation.
        clock.advance(Duration::from_secs(599));
        assert_eq!(monitor.poll().state, IdleState::Active);
        clock.advance(SEC);
        assert_eq!(monitor.poll().state, IdleState::Warning);
    }

    #[tokio::test(start_paused = true)]
    async fn driver_publishes_warning_then_expiry() {
        let config = IdleConfig::default()
            .with_warn_after(Duration::from_secs(3))
            .with_warning_duration(Duration::from_secs(2));
        let session = IdleSession::spawn(config);
        let mut rx = session.subscribe();

        let status = *rx
            .wait_for(|s| s.state == IdleState::Warning)
            .await
            .unwrap();
        assert_eq!(status.remaining_seconds, 2);

        rx.wait_for(|s| s.state == IdleState::Expired).await.unwrap();
        assert!(session.status().state == IdleState::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn driver_honors_stay_logged_in() {
        let config = IdleConfig::default()
            .with_warn_after(Duration::from_secs(3))
            .with_warning_duration(Duration::from_secs(30));
        let session = IdleSession::spawn(config);
        let mut rx = session.subscribe();

        rx.wait_for(|s| s.state == IdleState::Warning).await.unwrap();
        session.stay_logged_in();
        let status = *rx
            .wait_for(|s| s.state == IdleState::Active)
            .await
            .unwrap();
        assert_eq!(status.remaining_seconds, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_the_timer() {
        let config = IdleConfig::default().with_warn_after(Duration::from_secs(2));
        let session = IdleSession::spawn(config);

        session.shutdown();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(session.status().state, IdleState::Active);
    }
}
