//! Stub prompt runner and state builders for route tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::response::Response;
use chatrelay_config::Config;
use chatrelay_core::{CoreError, PollOutcome, PromptRequest, PromptResult, PromptRunner};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

enum Reply {
    Text(String),
    Fail,
    /// Never finishes on its own; only cancellation ends it.
    Hang,
}

/// Answers every prompt the same way and remembers what it was asked.
pub(crate) struct StubRunner {
    reply: Reply,
    thread_id: Option<String>,
    requests: Mutex<Vec<PromptRequest>>,
    pub(crate) cancelled: Mutex<bool>,
}

impl StubRunner {
    pub(crate) fn replying(text: &str) -> Self {
        Self::with_reply(Reply::Text(text.to_string()))
    }

    pub(crate) fn failing() -> Self {
        Self::with_reply(Reply::Fail)
    }

    pub(crate) fn hanging() -> Self {
        Self::with_reply(Reply::Hang)
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            thread_id: None,
            requests: Mutex::new(Vec::new()),
            cancelled: Mutex::new(false),
        }
    }

    pub(crate) fn with_thread(mut self, thread_id: &str) -> Self {
        self.thread_id = Some(thread_id.to_string());
        self
    }

    pub(crate) fn last_request(&self) -> Option<PromptRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl PromptRunner for StubRunner {
    async fn run(
        &self,
        request: PromptRequest,
        cancel: CancellationToken,
    ) -> Result<PromptResult, CoreError> {
        self.requests.lock().push(request.clone());
        match &self.reply {
            Reply::Text(text) => Ok(PromptResult {
                thread_id: self.thread_id.clone(),
                system_prompt: request.system_prompt.clone(),
                prompt: request.prompt.clone(),
                options: request.options.clone(),
                response: Some(text.clone()),
                cleaned_response: text.clone(),
                outcome: PollOutcome::Stable(text.clone()),
            }),
            Reply::Fail => Err(CoreError::ElementNotFound {
                selector: "#prompt-textarea".to_string(),
                location: "https://chatgpt.com/".to_string(),
            }),
            Reply::Hang => {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        *self.cancelled.lock() = true;
                        Err(CoreError::Cancelled)
                    }
                    _ = tokio::time::sleep(Duration::from_secs(3600)) => Err(CoreError::Cancelled),
                }
            }
        }
    }
}

pub(crate) fn state_with(runner: Arc<StubRunner>, dev_mode: bool) -> Arc<AppState> {
    let mut config = Config::default();
    config.server.dev_mode = dev_mode;
    config.auth.api_key = Some("secret".to_string());
    Arc::new(AppState::new(runner, &config))
}

pub(crate) async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
