//! Scripted in-memory page for exercising the pipeline without a browser.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chatrelay_config::SelectorConfig;
use parking_lot::Mutex;

use crate::error::CoreError;
use crate::page::{ChatPage, PageSource};
use crate::selectors::SelectorSet;

pub(crate) const TURN_ID: &str = "conversation-turn-3";

/// Replays scripted reads. The last entry of each script repeats once the
/// script runs out.
pub(crate) struct ScriptedPage {
    pub selectors: SelectorSet,
    pub editor: String,
    replies: Mutex<VecDeque<Option<String>>>,
    thinking: Mutex<VecDeque<bool>>,
    errors: Mutex<VecDeque<Option<String>>>,
    pub reply_html: Mutex<Option<String>>,
    pub location: Mutex<String>,
    pub location_after_submit: Mutex<Option<String>>,
    pub turn_ids: Mutex<Vec<String>>,
    pub editor_present: Mutex<bool>,
    pub wait_result: Mutex<bool>,
    pub fail_navigation: Mutex<bool>,
    pub login_button: Mutex<bool>,
    pub actions: Mutex<Vec<String>>,
    pub reply_reads: AtomicUsize,
    pub closed: AtomicUsize,
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self {
            selectors: SelectorSet::resolve(&SelectorConfig::default(), Some(TURN_ID)),
            editor: SelectorConfig::default().editor,
            replies: Mutex::new(VecDeque::new()),
            thinking: Mutex::new(VecDeque::new()),
            errors: Mutex::new(VecDeque::new()),
            reply_html: Mutex::new(None),
            location: Mutex::new("about:blank".to_string()),
            location_after_submit: Mutex::new(None),
            turn_ids: Mutex::new(vec!["conversation-turn-2".to_string(), TURN_ID.to_string()]),
            editor_present: Mutex::new(true),
            wait_result: Mutex::new(true),
            fail_navigation: Mutex::new(false),
            login_button: Mutex::new(false),
            actions: Mutex::new(Vec::new()),
            reply_reads: AtomicUsize::new(0),
            closed: AtomicUsize::new(0),
        }
    }

    pub fn with_replies<I, S>(self, replies: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        *self.replies.lock() = replies.into_iter().map(|r| r.map(Into::into)).collect();
        self
    }

    pub fn with_thinking(self, thinking: impl IntoIterator<Item = bool>) -> Self {
        *self.thinking.lock() = thinking.into_iter().collect();
        self
    }

    pub fn with_errors<I>(self, errors: I) -> Self
    where
        I: IntoIterator<Item = Option<&'static str>>,
    {
        *self.errors.lock() = errors.into_iter().map(|e| e.map(String::from)).collect();
        self
    }

    pub fn without_turn_ids(self) -> Self {
        self.turn_ids.lock().clear();
        self.selectors_fallback()
    }

    fn selectors_fallback(mut self) -> Self {
        self.selectors = SelectorSet::resolve(&SelectorConfig::default(), None);
        self
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().clone()
    }

    fn record(&self, action: impl Into<String>) {
        self.actions.lock().push(action.into());
    }

    fn next<T: Clone + Default>(script: &Mutex<VecDeque<T>>) -> T {
        let mut script = script.lock();
        if script.len() > 1 {
            script.pop_front().unwrap_or_default()
        } else {
            script.front().cloned().unwrap_or_default()
        }
    }
}

#[async_trait]
impl ChatPage for ScriptedPage {
    async fn goto(&self, url: &str, _timeout: Duration) -> Result<(), CoreError> {
        self.record(format!("goto {}", url));
        if *self.fail_navigation.lock() {
            return Err(CoreError::NavigationTimeout {
                url: url.to_string(),
                message: "scripted timeout".to_string(),
            });
        }
        *self.location.lock() = url.to_string();
        Ok(())
    }

    async fn location(&self) -> Result<String, CoreError> {
        Ok(self.location.lock().clone())
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<bool, CoreError> {
        self.record(format!("wait {}", selector));
        if selector == self.editor {
            return Ok(*self.editor_present.lock());
        }
        Ok(*self.wait_result.lock())
    }

    async fn exists(&self, selector: &str) -> Result<bool, CoreError> {
        if selector == self.selectors.thinking {
            return Ok(Self::next(&self.thinking));
        }
        if selector == self.editor {
            return Ok(*self.editor_present.lock());
        }
        Ok(false)
    }

    async fn text_content(&self, selector: &str) -> Result<Option<String>, CoreError> {
        if selector == self.selectors.error {
            return Ok(Self::next(&self.errors));
        }
        if selector == self.selectors.reply {
            self.reply_reads.fetch_add(1, Ordering::SeqCst);
            return Ok(Self::next(&self.replies));
        }
        Ok(None)
    }

    async fn inner_html(&self, selector: &str) -> Result<Option<String>, CoreError> {
        if selector == self.selectors.reply {
            return Ok(self.reply_html.lock().clone());
        }
        Ok(None)
    }

    async fn attribute_values(
        &self,
        _selector: &str,
        _attribute: &str,
    ) -> Result<Vec<String>, CoreError> {
        Ok(self.turn_ids.lock().clone())
    }

    async fn click(&self, selector: &str) -> Result<(), CoreError> {
        if selector == self.editor && !*self.editor_present.lock() {
            return Err(CoreError::ElementNotFound {
                selector: selector.to_string(),
                location: self.location.lock().clone(),
            });
        }
        self.record(format!("click {}", selector));
        Ok(())
    }

    async fn has_button(&self, label: &str) -> Result<bool, CoreError> {
        if label == "Log in" {
            return Ok(*self.login_button.lock());
        }
        Ok(false)
    }

    async fn click_button(&self, label: &str) -> Result<bool, CoreError> {
        self.record(format!("click_button {}", label));
        if label == "Log in" {
            let present = *self.login_button.lock();
            if present {
                // The form replaces the landing page once opened.
                *self.login_button.lock() = false;
            }
            return Ok(present);
        }
        if label == "Continue" {
            *self.editor_present.lock() = true;
        }
        Ok(true)
    }

    async fn clear_editor(&self, _selector: &str) -> Result<(), CoreError> {
        self.record("clear");
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), CoreError> {
        self.record(format!("type {}", text));
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<(), CoreError> {
        self.record(format!("fill {}={}", selector, value));
        Ok(())
    }

    async fn press_enter(&self) -> Result<(), CoreError> {
        self.record("enter");
        if let Some(next) = self.location_after_submit.lock().clone() {
            *self.location.lock() = next;
        }
        Ok(())
    }

    async fn set_input_files(&self, _selector: &str, files: &[PathBuf]) -> Result<(), CoreError> {
        for file in files {
            if !file.exists() {
                return Err(CoreError::UploadFailure(format!("{} missing", file.display())));
            }
        }
        self.record(format!("files {}", files.len()));
        Ok(())
    }

    async fn close(&self) -> Result<(), CoreError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Shares one scripted page, so tests can inspect it after the service closes it.
pub(crate) struct SharedPage(pub Arc<ScriptedPage>);

#[async_trait]
impl ChatPage for SharedPage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), CoreError> {
        self.0.goto(url, timeout).await
    }
    async fn location(&self) -> Result<String, CoreError> {
        self.0.location().await
    }
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, CoreError> {
        self.0.wait_for(selector, timeout).await
    }
    async fn exists(&self, selector: &str) -> Result<bool, CoreError> {
        self.0.exists(selector).await
    }
    async fn text_content(&self, selector: &str) -> Result<Option<String>, CoreError> {
        self.0.text_content(selector).await
    }
    async fn inner_html(&self, selector: &str) -> Result<Option<String>, CoreError> {
        self.0.inner_html(selector).await
    }
    async fn attribute_values(&self, selector: &str, attribute: &str) -> Result<Vec<String>, CoreError> {
        self.0.attribute_values(selector, attribute).await
    }
    async fn click(&self, selector: &str) -> Result<(), CoreError> {
        self.0.click(selector).await
    }
    async fn has_button(&self, label: &str) -> Result<bool, CoreError> {
        self.0.has_button(label).await
    }
    async fn click_button(&self, label: &str) -> Result<bool, CoreError> {
        self.0.click_button(label).await
    }
    async fn clear_editor(&self, selector: &str) -> Result<(), CoreError> {
        self.0.clear_editor(selector).await
    }
    async fn type_text(&self, text: &str) -> Result<(), CoreError> {
        self.0.type_text(text).await
    }
    async fn fill(&self, selector: &str, value: &str) -> Result<(), CoreError> {
        self.0.fill(selector, value).await
    }
    async fn press_enter(&self) -> Result<(), CoreError> {
        self.0.press_enter().await
    }
    async fn set_input_files(&self, selector: &str, files: &[PathBuf]) -> Result<(), CoreError> {
        self.0.set_input_files(selector, files).await
    }
    async fn close(&self) -> Result<(), CoreError> {
        self.0.close().await
    }
}

/// Hands out the same scripted page every time.
pub(crate) struct ScriptedSource {
    pub page: Arc<ScriptedPage>,
    pub acquired: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(page: ScriptedPage) -> Self {
        Self {
            page: Arc::new(page),
            acquired: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn acquire_page(&self) -> Result<Box<dyn ChatPage>, CoreError> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SharedPage(self.page.clone())))
    }
}
