//! Error types for the Cupcake client.

use thiserror::Error;

/// Errors raised by the API client and push channels.
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP request could not be completed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("server returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// The WebSocket handshake or stream failed.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A payload could not be encoded or decoded.
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured server URL cannot address the requested endpoint.
    #[error("invalid endpoint URL: {0}")]
    Url(String),

    /// The server accepted the request but did not confirm the mutation.
    #[error("{operation} '{target}' was not confirmed by the server")]
    Rejected { operation: &'static str, target: String },
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Url(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
