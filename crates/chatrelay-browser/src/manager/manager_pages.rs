//! Per-request tabs: [`PageLease`] and the [`PageSource`] implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chatrelay_core::{ChatPage, CoreError, PageSource};
use tracing::{debug, warn};

use crate::cdp::{CdpClient, CdpError, PageSession};

use super::{BrowserError, BrowserManager};

/// A tab owned by exactly one request.
///
/// The tab is closed by [`ChatPage::close`]; a lease dropped without being
/// closed (a cancelled request) closes the tab in the background.
pub struct PageLease {
    session: Arc<PageSession>,
    client: Arc<CdpClient>,
    closed: AtomicBool,
}

impl PageLease {
    pub(super) fn new(session: PageSession, client: Arc<CdpClient>) -> Self {
        Self {
            session: Arc::new(session),
            client,
            closed: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> &PageSession {
        &self.session
    }

    /// Location for error context. Never fails.
    async fn current_location(&self) -> String {
        self.session
            .get_url()
            .await
            .unwrap_or_else(|_| "unknown".to_string())
    }

    async fn element_error(&self, selector: &str, e: CdpError) -> CoreError {
        match e {
            CdpError::ElementNotFound(_) => CoreError::ElementNotFound {
                selector: selector.to_string(),
                location: self.current_location().await,
            },
            other => BrowserError::from(other).into(),
        }
    }
}

fn browser_error(e: CdpError) -> CoreError {
    BrowserError::from(e).into()
}

#[async_trait]
impl ChatPage for PageLease {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), CoreError> {
        match self.session.navigate(url, timeout).await {
            Ok(_) => Ok(()),
            Err(CdpError::Timeout(message)) => Err(CoreError::NavigationTimeout {
                url: url.to_string(),
                message,
            }),
            Err(e) => Err(browser_error(e)),
        }
    }

    async fn location(&self) -> Result<String, CoreError> {
        self.session.get_url().await.map_err(browser_error)
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, CoreError> {
        self.session
            .wait_for_selector(selector, timeout)
            .await
            .map_err(browser_error)
    }

    async fn exists(&self, selector: &str) -> Result<bool, CoreError> {
        self.session.exists(selector).await.map_err(browser_error)
    }

    async fn text_content(&self, selector: &str) -> Result<Option<String>, CoreError> {
        self.session.text_content(selector).await.map_err(browser_error)
    }

    async fn inner_html(&self, selector: &str) -> Result<Option<String>, CoreError> {
        self.session.inner_html(selector).await.map_err(browser_error)
    }

    async fn attribute_values(
        &self,
        selector: &str,
        attribute: &str,
    ) -> Result<Vec<String>, CoreError> {
        self.session
            .attribute_values(selector, attribute)
            .await
            .map_err(browser_error)
    }

    async fn click(&self, selector: &str) -> Result<(), CoreError> {
        match self.session.click_selector(selector).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.element_error(selector, e).await),
        }
    }

    async fn has_button(&self, label: &str) -> Result<bool, CoreError> {
        self.session.has_button(label).await.map_err(browser_error)
    }

    async fn click_button(&self, label: &str) -> Result<bool, CoreError> {
        self.session.click_button(label).await.map_err(browser_error)
    }

    async fn clear_editor(&self, selector: &str) -> Result<(), CoreError> {
        match self.session.clear_editor(selector).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.element_error(selector, e).await),
        }
    }

    async fn type_text(&self, text: &str) -> Result<(), CoreError> {
        self.session.type_text(text).await.map_err(browser_error)
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<(), CoreError> {
        match self.session.fill(selector, value).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.element_error(selector, e).await),
        }
    }

    async fn press_enter(&self) -> Result<(), CoreError> {
        self.session.press_key("Enter").await.map_err(browser_error)
    }

    async fn set_input_files(&self, selector: &str, files: &[PathBuf]) -> Result<(), CoreError> {
        self.session
            .set_input_files(selector, files)
            .await
            .map_err(|e| CoreError::UploadFailure(format!("{}: {}", selector, e)))
    }

    async fn close(&self) -> Result<(), CoreError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.client
            .close_page(&self.session)
            .await
            .map_err(browser_error)?;
        debug!("Closed tab {}", self.session.target_id());
        Ok(())
    }
}

impl Drop for PageLease {
    fn drop(&mut self) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let session = self.session.clone();
        let client = self.client.clone();
        handle.spawn(async move {
            if let Err(e) = client.close_page(&session).await {
                warn!("Failed to close abandoned tab {}: {}", session.target_id(), e);
            }
        });
    }
}

#[async_trait]
impl PageSource for BrowserManager {
    async fn acquire_page(&self) -> Result<Box<dyn ChatPage>, CoreError> {
        let mut client = self.client().await?;
        let session = match client.new_page(None).await {
            Ok(session) => session,
            Err(e) => {
                let e = BrowserError::from(e);
                if !e.is_disconnect() {
                    return Err(e.into());
                }
                warn!(error = %e, "Browser connection dropped while opening a tab, reconnecting");
                client = self.client().await?;
                client.new_page(None).await.map_err(browser_error)?
            }
        };
        debug!("Acquired tab {}", session.target_id());
        Ok(Box::new(PageLease::new(session, client)))
    }
}
