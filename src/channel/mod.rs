//! Long-lived WebSocket push channels.
//!
//! - `fleet`: fleet-wide `{jobs, health}` snapshots, reconnects with backoff
//! - `log_tail`: live log lines of one job, no reconnect
//!
//! Each channel keeps at most one [`Session`] in its slot. Opening closes the
//! previous session first and waits for its task to finish, so a superseded
//! session can never write into state owned by its successor.

pub mod fleet;
pub mod log_tail;

use std::future::Future;

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Result;

pub use fleet::FleetChannel;
pub use log_tail::{LogTail, TailToggle};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A running channel task plus the token that stops it.
pub(crate) struct Session {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Session {
    pub(crate) fn spawn<F, Fut>(run: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(cancel.clone()));
        Self {
            cancel,
            task: Some(task),
        }
    }

    /// True while the session task is still running.
    pub(crate) fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the task and wait until it has exited.
    pub(crate) async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    tracing::error!(error = %e, "Channel task panicked");
                }
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// What ended a read loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ended {
    /// The session was closed locally.
    Cancelled,
    /// The remote side closed or the stream failed.
    Closed,
}

async fn connect(url: &Url) -> Result<WsStream> {
    let (stream, _response) = connect_async(url.as_str()).await?;
    Ok(stream)
}

/// Read text frames from `stream`, handing each to `on_text`, until the
/// stream ends or `cancel` fires. `on_text` returns `false` to stop early.
async fn read_text<F>(
    stream: &mut WsStream,
    cancel: &CancellationToken,
    channel: &'static str,
    mut on_text: F,
) -> Ended
where
    F: FnMut(String) -> bool,
{
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => {
                let _ = stream.close(None).await;
                return Ended::Cancelled;
            }
            frame = stream.next() => frame,
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                if !on_text(text) {
                    let _ = stream.close(None).await;
                    return Ended::Cancelled;
                }
            }
            Some(Ok(Message::Close(frame))) => {
                tracing::debug!(channel, ?frame, "Remote closed channel");
                return Ended::Closed;
            }
            Some(Ok(_)) => continue, // binary, ping, pong
            Some(Err(e)) => {
                // A failed stream is always followed by its closure.
                tracing::warn!(channel, error = %e, "Channel error");
                return Ended::Closed;
            }
            None => return Ended::Closed,
        }
    }
}
