//! Navigation operations for CDP page session.

use std::time::Duration;

use serde_json::json;
use tracing::debug;

use crate::cdp::error::CdpError;

use super::core::PageSession;

const WAIT_POLL: Duration = Duration::from_millis(100);

impl PageSession {
    /// Navigate and wait for the load event (not network idle).
    pub async fn navigate(&self, url: &str, timeout: Duration) -> Result<String, CdpError> {
        let mut events = self.events.lock().await;
        while events.try_recv().is_ok() {}

        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(error) = result.get("errorText") {
            return Err(CdpError::NavigationFailed(
                error.as_str().unwrap_or("Unknown error").to_string(),
            ));
        }

        let frame_id = result["frameId"].as_str().unwrap_or("main").to_string();

        tokio::time::timeout(timeout, Self::next_event(&mut events, "Page.loadEventFired"))
            .await
            .map_err(|_| {
                CdpError::Timeout(format!("Load of {} exceeded {}s", url, timeout.as_secs()))
            })??;

        debug!("Navigated to {}", url);
        Ok(frame_id)
    }

    /// Get current URL.
    pub async fn get_url(&self) -> Result<String, CdpError> {
        let result = self.evaluate("window.location.href").await?;
        Ok(result.as_str().unwrap_or("").to_string())
    }

    /// Wait for selector to match. `Ok(false)` on timeout.
    pub async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, CdpError> {
        let start = tokio::time::Instant::now();

        loop {
            if self.exists(selector).await? {
                return Ok(true);
            }

            if start.elapsed() > timeout {
                debug!("Waiting for selector '{}' timed out", selector);
                return Ok(false);
            }

            tokio::time::sleep(WAIT_POLL).await;
        }
    }
}
