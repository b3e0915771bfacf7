//! `POST /v1/chat/completions`, a chat-completion shaped front for the web UI.
//!
//! The last `user` message becomes the prompt (image parts become
//! attachments), the last `system` message the system prompt, and the model
//! name picks the mode flags. The resolved web UI thread id is returned in
//! `system_fingerprint` and the `X-ChatGPT-Thread-Id` header.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chatrelay_core::{is_valid_thread_id, Attachment, PromptOptions, PromptRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::run_prompt;
use crate::error::ApiError;
use crate::state::AppState;

pub const THREAD_ID_HEADER: &str = "x-chatgpt-thread-id";
pub const DEFAULT_MODEL: &str = "gpt-4-unofficial";

/// Chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
}

/// Message content (text or parts).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Text parts joined by newlines.
    pub fn as_text(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    pub fn image_urls(&self) -> Vec<&str> {
        match self {
            MessageContent::Text(_) => Vec::new(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::ImageUrl { image_url } => Some(image_url.url()),
                    _ => None,
                })
                .collect(),
        }
    }
}

/// Content part (text or image).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

/// Image reference: `{ "url": … }` or a bare string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageUrl {
    Object {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    Bare(String),
}

impl ImageUrl {
    pub fn url(&self) -> &str {
        match self {
            ImageUrl::Object { url, .. } => url,
            ImageUrl::Bare(url) => url,
        }
    }
}

/// Chat completion request. `stream` is accepted and ignored.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub stream: Option<bool>,
    #[serde(default, rename = "threadId", alias = "thread_id")]
    pub thread_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub model: String,
    pub system_fingerprint: Option<String>,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

#[derive(Debug, Serialize)]
pub struct Choice {
    pub index: i32,
    pub message: AssistantMessage,
    pub logprobs: Option<serde_json::Value>,
    pub finish_reason: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AssistantMessage {
    pub role: &'static str,
    pub content: String,
}

/// Token usage. Always `-1`: nothing is counted.
#[derive(Debug, Serialize)]
pub struct Usage {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

impl Usage {
    fn unknown() -> Self {
        Self {
            prompt_tokens: -1,
            completion_tokens: -1,
            total_tokens: -1,
        }
    }
}

/// Turn the chat-shaped body into a prompt request.
pub(crate) fn build_request(
    body: &ChatCompletionRequest,
    default_system_prompt: Option<&str>,
) -> Result<PromptRequest, ApiError> {
    let messages = body
        .messages
        .as_deref()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| {
            ApiError::invalid(
                "'messages' is required and must be a non-empty array.",
                Some("messages"),
            )
        })?;

    let user = messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .ok_or_else(|| ApiError::invalid("No message with role 'user' found.", Some("messages")))?;

    let (prompt, image_refs) = match &user.content {
        Some(content) => (content.as_text(), content.image_urls()),
        None => (String::new(), Vec::new()),
    };
    if prompt.trim().is_empty() && image_refs.is_empty() {
        return Err(ApiError::invalid(
            "The last 'user' message has no content.",
            Some("messages"),
        ));
    }

    let attachments = image_refs
        .into_iter()
        .map(|r| {
            Attachment::parse(r).ok_or_else(|| {
                ApiError::invalid(format!("Unsupported image_url: {}", r), Some("messages"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let system_prompt = messages
        .iter()
        .rev()
        .find(|m| m.role == "system")
        .and_then(|m| m.content.as_ref())
        .map(MessageContent::as_text)
        .or_else(|| default_system_prompt.map(str::to_string));

    let thread_id = body.thread_id.clone().filter(|id| !id.is_empty());
    if let Some(id) = thread_id.as_deref() {
        if !is_valid_thread_id(id) {
            return Err(ApiError::invalid(
                format!("Invalid threadId: {}", id),
                Some("threadId"),
            ));
        }
    }

    let options =
        PromptOptions::from_model(body.model.as_deref().unwrap_or_default()).with_thread_id(thread_id);

    Ok(PromptRequest::new(prompt)
        .with_system_prompt(system_prompt)
        .with_options(options)
        .with_attachments(attachments))
}

pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatCompletionRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) =
        payload.map_err(|rejection| ApiError::invalid(rejection.body_text(), None))?;

    if body.stream == Some(true) {
        debug!("Streaming requested; answering with a single completion");
    }

    let request = build_request(&body, state.default_system_prompt.as_deref())?;
    let model = body
        .model
        .clone()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    info!(model = %model, reason = request.options.reason, search = request.options.search,
        thread_id = ?request.options.thread_id, "Chat completion requested");

    let result = run_prompt(&state, request).await.map_err(|e| {
        error!(kind = e.kind(), error = %e, "Chat completion failed");
        ApiError::from_core(&e, state.dev_mode)
    })?;

    let content = if !result.cleaned_response.is_empty() {
        result.cleaned_response.clone()
    } else {
        result.response.clone().unwrap_or_default()
    };

    let response = ChatCompletionResponse {
        id: format!("chatcmpl-{}", Uuid::new_v4()),
        object: "chat.completion",
        created: chrono::Utc::now().timestamp(),
        model,
        system_fingerprint: result.thread_id.clone(),
        choices: vec![Choice {
            index: 0,
            message: AssistantMessage {
                role: "assistant",
                content,
            },
            logprobs: None,
            finish_reason: "stop",
        }],
        usage: Usage::unknown(),
    };

    let header = HeaderValue::from_str(result.thread_id.as_deref().unwrap_or(""))
        .unwrap_or_else(|_| HeaderValue::from_static(""));
    Ok(([(THREAD_ID_HEADER, header)], Json(response)).into_response())
}

#[cfg(test)]
#[path = "openai_compat_tests.rs"]
mod tests;
