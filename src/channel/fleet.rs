//! Fleet status channel.
//!
//! Keeps one WebSocket open to `/ws/cupcake`. Every message is a full
//! `{jobs, health}` snapshot that replaces the cached jobs. When the
//! connection closes or cannot be established, the session sleeps for the
//! current backoff delay and tries again. The delay resets only once a
//! reconnected socket has delivered a snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::{Ended, Session, connect, read_text};
use crate::api::ApiClient;
use crate::core::{FleetSnapshot, ReconnectBackoff};
use crate::state::ViewState;

const CHANNEL: &str = "fleet";

struct Inner {
    api: ApiClient,
    state: ViewState,
    backoff: ReconnectBackoff,
    slot: Mutex<Option<Session>>,
    opened: AtomicU64,
    connections: Arc<AtomicU64>,
}

/// Handle to the fleet status channel. Clones share the same slot.
#[derive(Clone)]
pub struct FleetChannel {
    inner: Arc<Inner>,
}

impl FleetChannel {
    /// `backoff` is the policy each new session starts from.
    pub fn new(api: ApiClient, state: ViewState, backoff: ReconnectBackoff) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                state,
                backoff,
                slot: Mutex::new(None),
                opened: AtomicU64::new(0),
                connections: Arc::new(AtomicU64::new(0)),
            }),
        }
    }

    /// Open a fresh session, closing the current one first.
    ///
    /// Also used to force an immediate snapshot after a job mutation: the
    /// server pushes a snapshot to every newly accepted socket.
    pub async fn open(&self) -> crate::Result<()> {
        let url = self.inner.api.fleet_url()?;
        let mut slot = self.inner.slot.lock().await;
        if let Some(previous) = slot.take() {
            debug!("Replacing fleet status session");
            previous.close().await;
        }

        let state = self.inner.state.clone();
        let backoff = self.inner.backoff.clone();
        let connections = self.inner.connections.clone();
        *slot = Some(Session::spawn(move |cancel| {
            supervise(url, state, backoff, connections, cancel)
        }));
        self.inner.opened.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Close the current session, if any. No reconnect follows.
    pub async fn close(&self) {
        if let Some(session) = self.inner.slot.lock().await.take() {
            session.close().await;
            info!("Fleet status channel closed");
        }
    }

    pub async fn is_open(&self) -> bool {
        self.inner
            .slot
            .lock()
            .await
            .as_ref()
            .is_some_and(Session::is_running)
    }

    /// Number of times [`open`](Self::open) has started a session.
    pub fn open_count(&self) -> u64 {
        self.inner.opened.load(Ordering::Relaxed)
    }

    /// Number of sockets successfully connected, reconnects included.
    pub fn connection_count(&self) -> u64 {
        self.inner.connections.load(Ordering::Relaxed)
    }
}

/// Connect, pump snapshots, and reconnect with backoff until cancelled.
async fn supervise(
    url: Url,
    state: ViewState,
    mut backoff: ReconnectBackoff,
    connections: Arc<AtomicU64>,
    cancel: CancellationToken,
) {
    loop {
        let attempt = tokio::select! {
            _ = cancel.cancelled() => return,
            attempt = connect(&url) => attempt,
        };

        match attempt {
            Ok(mut stream) => {
                connections.fetch_add(1, Ordering::Relaxed);
                info!(url = %url, "Fleet status channel connected");

                let mut confirmed = false;
                let ended = read_text(&mut stream, &cancel, CHANNEL, |text| {
                    match serde_json::from_str::<FleetSnapshot>(&text) {
                        Ok(snapshot) => {
                            debug!(jobs = snapshot.jobs.len(), "Fleet snapshot received");
                            state.apply_snapshot(snapshot, Utc::now().timestamp());
                            if !confirmed {
                                backoff.confirm();
                                confirmed = true;
                            }
                        }
                        Err(e) => warn!(error = %e, "Ignoring malformed fleet snapshot"),
                    }
                    true
                })
                .await;

                if ended == Ended::Cancelled {
                    return;
                }
            }
            Err(e) => warn!(url = %url, error = %e, "Fleet status channel connect failed"),
        }

        let delay = backoff.next_delay();
        info!(delay_ms = delay.as_millis() as u64, "Fleet status channel closed, reconnecting");
        if sleep_or_cancel(delay, &cancel).await {
            return;
        }
    }
}

/// Sleep for `delay`. Returns true if cancelled first.
async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => true,
        _ = tokio::time::sleep(delay) => false,
    }
}
