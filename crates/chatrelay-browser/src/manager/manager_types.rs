//! Browser manager error type and its mapping into the pipeline's errors.

use chatrelay_core::CoreError;
use thiserror::Error;

use crate::cdp::CdpError;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error(transparent)]
    Cdp(#[from] CdpError),

    #[error("Chrome not found. Install Google Chrome or set browser.executable.")]
    ChromeNotFound,

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),

    #[error("Invalid cookies: {0}")]
    InvalidCookies(String),
}

impl BrowserError {
    /// The connection is gone and the next `client()` call will reconnect.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            Self::Cdp(CdpError::SessionClosed | CdpError::WebSocket(_))
        )
    }
}

impl From<BrowserError> for CoreError {
    fn from(e: BrowserError) -> Self {
        match e {
            BrowserError::Cdp(CdpError::ElementNotFound(selector)) => CoreError::ElementNotFound {
                selector,
                location: "<unknown>".to_string(),
            },
            other => CoreError::Browser(other.to_string()),
        }
    }
}
