//! CDP error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Nothing answered on the debugging endpoint.
    #[error("No Chrome DevTools endpoint at {0}")]
    ChromeNotAvailable(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A command came back with an `error` member.
    #[error("{method} failed: {message} (code {code})")]
    Protocol {
        method: String,
        code: i64,
        message: String,
    },

    #[error("Malformed CDP payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Endpoint discovery failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("No element matches {0}")]
    ElementNotFound(String),

    #[error("Script threw: {0}")]
    JavaScript(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl CdpError {
    /// CDP's generic server error, returned e.g. for nodes without layout.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Protocol { code: -32000, .. })
    }
}
