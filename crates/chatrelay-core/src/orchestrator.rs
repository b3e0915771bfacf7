//! The prompt submission sequence.

use std::time::Duration;

use chatrelay_config::{ChatConfig, Config, PollerConfig, SelectorConfig};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::attachments::MaterializedAttachments;
use crate::error::CoreError;
use crate::normalizer::normalize_html;
use crate::page::ChatPage;
use crate::poller::{PollOutcome, ResponsePoller};
use crate::selectors::SelectorSet;
use crate::thread::ThreadResolver;
use crate::types::{PromptRequest, PromptResult};

/// How long to wait for the editor to become available.
const EDITOR_WAIT: Duration = Duration::from_secs(30);

/// Gets one prompt in flight on a page and waits for its reply.
///
/// Performs no retries: navigation, element and upload failures propagate to
/// the caller after being logged with the page's location.
#[derive(Clone)]
pub struct Orchestrator {
    chat: ChatConfig,
    poller: PollerConfig,
    selectors: SelectorConfig,
    resolver: ThreadResolver,
    http: reqwest::Client,
}

impl Orchestrator {
    pub fn new(config: &Config) -> Self {
        Self {
            chat: config.chat.clone(),
            poller: config.poller.clone(),
            selectors: config.selectors.clone(),
            resolver: ThreadResolver::new(config.chat.base_url.clone()),
            http: reqwest::Client::new(),
        }
    }

    /// Use a specific HTTP client for attachment downloads.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    pub fn resolver(&self) -> &ThreadResolver {
        &self.resolver
    }

    /// Run the whole sequence. Stops at the next suspension point once
    /// `cancel` fires.
    pub async fn run(
        &self,
        page: &dyn ChatPage,
        request: &PromptRequest,
        cancel: &CancellationToken,
    ) -> Result<PromptResult, CoreError> {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CoreError::Cancelled),
            result = self.submit_and_wait(page, request, cancel) => result,
        };

        if let Err(ref e) = result {
            let location = page
                .location()
                .await
                .unwrap_or_else(|_| "<unknown>".to_string());
            match e {
                CoreError::Cancelled => info!(location = %location, "Prompt cancelled"),
                _ => error!(kind = e.kind(), location = %location, error = %e, "Prompt failed"),
            }
        }

        result
    }

    async fn submit_and_wait(
        &self,
        page: &dyn ChatPage,
        request: &PromptRequest,
        cancel: &CancellationToken,
    ) -> Result<PromptResult, CoreError> {
        let thread_id = request.options.thread_id.as_deref();
        let target = self.resolver.navigation_target(thread_id);

        info!(url = %target, "Navigating");
        page.goto(&target, Duration::from_secs(self.chat.navigation_timeout_secs))
            .await?;

        if thread_id.is_some() {
            let rendered = page
                .wait_for(
                    &self.selectors.thread_context,
                    Duration::from_secs(self.chat.context_wait_secs),
                )
                .await?;
            if !rendered {
                warn!("Thread context did not render in time, continuing");
            }
        }
        sleep_ms(self.chat.post_navigation_delay_ms).await;

        if !request.attachments.is_empty() {
            self.upload_attachments(page, request).await?;
        }

        self.prepare_editor(page, thread_id.is_none()).await?;

        debug!("Typing and submitting prompt");
        page.type_text(&request.composed_prompt()).await?;
        page.press_enter().await?;

        sleep_ms(self.chat.reply_grace_ms).await;
        let turn_ids = page
            .attribute_values(&self.selectors.turn, &self.selectors.turn_id_attribute)
            .await?;
        let selectors = SelectorSet::resolve(&self.selectors, turn_ids.last().map(String::as_str));
        debug!(turn_id = ?selectors.turn_id, reply = %selectors.reply, "Selector set resolved");

        let appeared = page
            .wait_for(
                &selectors.reply_or_thinking(),
                Duration::from_secs(self.chat.reply_wait_secs),
            )
            .await?;
        if !appeared {
            warn!(
                wait_secs = self.chat.reply_wait_secs,
                "Reply container not found, polling anyway"
            );
        }

        let poller = ResponsePoller::new(page, &selectors, &self.poller, request.options.reason);
        let outcome = poller.poll(cancel).await?;
        match &outcome {
            PollOutcome::Stable(_) => {}
            PollOutcome::TimedOut(_) => {
                warn!("Response never stabilized, using last received text")
            }
            PollOutcome::ErrorDetected { error, .. } => {
                warn!(error = %error, "Chat UI error, using partial text")
            }
        }

        let response = outcome.final_text().map(str::to_string);
        let cleaned_response = match response.as_deref() {
            Some(raw) => self.clean_reply(page, &selectors, raw).await,
            None => String::new(),
        };
        if cleaned_response.is_empty() {
            warn!("Reply was empty after normalization");
        }

        let location = page.location().await?;
        let resolved = self.resolver.resolve(&location);
        info!(thread_id = ?resolved, location = %location, outcome = outcome.label(), "Prompt complete");

        Ok(PromptResult {
            thread_id: resolved,
            system_prompt: request.system_prompt.clone(),
            prompt: request.prompt.clone(),
            options: request.options.clone(),
            response,
            cleaned_response,
            outcome,
        })
    }

    async fn upload_attachments(
        &self,
        page: &dyn ChatPage,
        request: &PromptRequest,
    ) -> Result<(), CoreError> {
        info!(count = request.attachments.len(), "Uploading attachments");
        let files = MaterializedAttachments::materialize(&self.http, &request.attachments).await?;
        page.set_input_files(&self.selectors.file_input, files.paths())
            .await?;
        sleep_ms(self.chat.upload_settle_ms).await;
        Ok(())
    }

    async fn prepare_editor(&self, page: &dyn ChatPage, fresh_thread: bool) -> Result<(), CoreError> {
        let editor = &self.selectors.editor;
        if !page.wait_for(editor, EDITOR_WAIT).await? {
            return Err(CoreError::ElementNotFound {
                selector: editor.clone(),
                location: page.location().await?,
            });
        }
        page.click(editor).await?;
        sleep_ms(self.chat.editor_settle_ms).await;

        if fresh_thread {
            debug!("Clearing editor");
            page.clear_editor(editor).await?;
            sleep_ms(self.chat.clear_settle_ms).await;
        }
        Ok(())
    }

    /// Normalize the reply container's HTML, falling back to its raw text.
    async fn clean_reply(&self, page: &dyn ChatPage, selectors: &SelectorSet, raw: &str) -> String {
        let html = match page.inner_html(&selectors.reply).await {
            Ok(html) => html,
            Err(e) => {
                debug!(error = %e, "Could not snapshot reply HTML");
                None
            }
        };
        let cleaned = normalize_html(html.as_deref());
        if cleaned.is_empty() {
            normalize_html(Some(raw))
        } else {
            cleaned
        }
    }
}

async fn sleep_ms(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
