//! Core session struct and CDP command dispatch.

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use crate::cdp::client::Transport;
use crate::cdp::error::CdpError;
use crate::cdp::protocol::CdpResponse;

/// A session attached to a single page/target.
pub struct PageSession {
    pub(super) target_id: String,
    pub(super) session_id: String,
    pub(super) transport: Transport,
    /// Events routed to this session by the client's receive loop.
    pub(super) events: tokio::sync::Mutex<mpsc::UnboundedReceiver<CdpResponse>>,
}

impl PageSession {
    pub(crate) fn new(
        target_id: String,
        session_id: String,
        transport: Transport,
        event_rx: mpsc::UnboundedReceiver<CdpResponse>,
    ) -> Self {
        Self {
            target_id,
            session_id,
            transport,
            events: tokio::sync::Mutex::new(event_rx),
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport
            .call(method, params, Some(&self.session_id))
            .await
    }

    /// Enable the Page domain. DOM, Runtime and Network commands used here
    /// work without their domains enabled, so those stay off.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    /// Wait for the next event named `method`, discarding others.
    pub(super) async fn next_event(
        events: &mut mpsc::UnboundedReceiver<CdpResponse>,
        method: &str,
    ) -> Result<CdpResponse, CdpError> {
        while let Some(event) = events.recv().await {
            if event.method.as_deref() == Some(method) {
                return Ok(event);
            }
        }
        Err(CdpError::SessionClosed)
    }

    /// Set cookies in the browser's cookie jar.
    pub async fn set_cookies(&self, cookies: Value) -> Result<(), CdpError> {
        self.call("Network.setCookies", Some(serde_json::json!({ "cookies": cookies })))
            .await?;
        Ok(())
    }
}
