//! The seam between the prompt pipeline and the browser driver.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CoreError;

/// One browser tab, exclusively owned by a single request.
///
/// Selector arguments are CSS selectors. Lookups that find nothing return
/// `None`/`false`/empty rather than an error; only actions on a missing
/// element fail with [`CoreError::ElementNotFound`].
#[async_trait]
pub trait ChatPage: Send + Sync {
    /// Navigate and wait for the document to be ready (not network idle).
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), CoreError>;

    /// Current location of the tab.
    async fn location(&self) -> Result<String, CoreError>;

    /// Wait until `selector` matches. `Ok(false)` on timeout.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, CoreError>;

    async fn exists(&self, selector: &str) -> Result<bool, CoreError>;

    /// Trimmed `textContent` of the first match.
    async fn text_content(&self, selector: &str) -> Result<Option<String>, CoreError>;

    /// `innerHTML` of the first match.
    async fn inner_html(&self, selector: &str) -> Result<Option<String>, CoreError>;

    /// Values of `attribute` across all matches, in document order, skipping
    /// elements without it.
    async fn attribute_values(
        &self,
        selector: &str,
        attribute: &str,
    ) -> Result<Vec<String>, CoreError>;

    async fn click(&self, selector: &str) -> Result<(), CoreError>;

    /// Whether a button or link labelled `label` is present.
    async fn has_button(&self, label: &str) -> Result<bool, CoreError>;

    /// Click the first button or link labelled `label` (visible text or
    /// `aria-label`). `Ok(false)` when there is none.
    async fn click_button(&self, label: &str) -> Result<bool, CoreError>;

    /// Focus the editor and delete everything in it.
    async fn clear_editor(&self, selector: &str) -> Result<(), CoreError>;

    /// Type into the focused element.
    async fn type_text(&self, text: &str) -> Result<(), CoreError>;

    /// Replace the value of an input.
    async fn fill(&self, selector: &str, value: &str) -> Result<(), CoreError>;

    async fn press_enter(&self) -> Result<(), CoreError>;

    /// Attach local files to a file input in one operation.
    async fn set_input_files(&self, selector: &str, files: &[PathBuf]) -> Result<(), CoreError>;

    /// Close the tab. Called exactly once per page.
    async fn close(&self) -> Result<(), CoreError>;
}

/// Hands out isolated pages against a shared browser connection.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn acquire_page(&self) -> Result<Box<dyn ChatPage>, CoreError>;
}
