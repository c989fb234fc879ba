//! Live log tail of a single job.
//!
//! Opening for a job clears the buffer, fetches the job's archived log
//! listing and streams `/api/job/{name}/log/latest`, one line per message.
//! There is no reconnect: when the server closes the socket the tail stops and
//! the user has to open it again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::{Ended, Session, connect, read_text};
use crate::api::ApiClient;
use crate::logging::LogThrottle;
use crate::state::ViewState;

const CHANNEL: &str = "log_tail";

/// Result of [`LogTail::toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailToggle {
    Opened(String),
    Closed(String),
    Switched { from: String, to: String },
}

struct ActiveTail {
    job: String,
    session: Session,
}

struct Inner {
    api: ApiClient,
    state: ViewState,
    slot: Mutex<Option<ActiveTail>>,
}

/// Handle to the log tail channel. Clones share the same slot.
#[derive(Clone)]
pub struct LogTail {
    inner: Arc<Inner>,
}

impl LogTail {
    pub fn new(api: ApiClient, state: ViewState) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                state,
                slot: Mutex::new(None),
            }),
        }
    }

    /// Open for `job` when closed or tailing another job; close when already
    /// tailing `job`.
    pub async fn toggle(&self, job: &str) -> crate::Result<TailToggle> {
        let mut slot = self.inner.slot.lock().await;
        match slot.take() {
            Some(active) if active.job == job => {
                active.session.close().await;
                self.inner.state.end_tail();
                info!(job, "Log tail closed");
                Ok(TailToggle::Closed(active.job))
            }
            Some(active) => {
                active.session.close().await;
                self.inner.state.end_tail();
                *slot = Some(self.start(job)?);
                Ok(TailToggle::Switched {
                    from: active.job,
                    to: job.to_string(),
                })
            }
            None => {
                *slot = Some(self.start(job)?);
                Ok(TailToggle::Opened(job.to_string()))
            }
        }
    }

    /// Tail `job`, replacing any current tail (even of the same job).
    pub async fn open(&self, job: &str) -> crate::Result<()> {
        let mut slot = self.inner.slot.lock().await;
        if let Some(active) = slot.take() {
            active.session.close().await;
            self.inner.state.end_tail();
        }
        *slot = Some(self.start(job)?);
        Ok(())
    }

    /// Stop tailing and clear the buffer.
    pub async fn close(&self) {
        if let Some(active) = self.inner.slot.lock().await.take() {
            active.session.close().await;
            info!(job = %active.job, "Log tail closed");
        }
        self.inner.state.end_tail();
    }

    /// Job currently tailed, if any.
    pub async fn current_job(&self) -> Option<String> {
        self.inner
            .slot
            .lock()
            .await
            .as_ref()
            .map(|active| active.job.clone())
    }

    /// True while the tail socket of the current job is still streaming.
    pub async fn is_streaming(&self) -> bool {
        self.inner
            .slot
            .lock()
            .await
            .as_ref()
            .is_some_and(|active| active.session.is_running())
    }

    fn start(&self, job: &str) -> crate::Result<ActiveTail> {
        let url = self.inner.api.log_tail_url(job)?;
        let session_id = self.inner.state.begin_tail(job);
        info!(job, "Log tail opened");

        let api = self.inner.api.clone();
        let state = self.inner.state.clone();
        let name = job.to_string();
        let session = Session::spawn(move |cancel| {
            stream_tail(api, state, name, url, session_id, cancel)
        });

        Ok(ActiveTail {
            job: job.to_string(),
            session,
        })
    }
}

async fn stream_tail(
    api: ApiClient,
    state: ViewState,
    job: String,
    url: Url,
    session_id: u64,
    cancel: CancellationToken,
) {
    let history = tokio::select! {
        _ = cancel.cancelled() => return,
        history = api.list_job_logs(&job) => history,
    };
    match history {
        Ok(history) => {
            state.set_log_history(session_id, history);
        }
        Err(e) => warn!(job = %job, error = %e, "Failed to fetch log history"),
    }

    let attempt = tokio::select! {
        _ = cancel.cancelled() => return,
        attempt = connect(&url) => attempt,
    };
    let mut stream = match attempt {
        Ok(stream) => stream,
        Err(e) => {
            warn!(job = %job, error = %e, "Log tail connect failed");
            return;
        }
    };

    let throttle = LogThrottle::new(Duration::from_secs(5));
    let ended = read_text(&mut stream, &cancel, CHANNEL, |line| {
        if throttle.should_log() {
            debug!(job = %job, "Log tail receiving lines");
        }
        state.append_line(session_id, &line)
    })
    .await;

    if ended == Ended::Closed {
        info!(job = %job, "Log tail ended by server");
    }
}
