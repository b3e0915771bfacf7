//! `POST /api/prompt`, the native prompt endpoint.
//!
//! Errors use the flat `{ "error": "…" }` body older clients expect.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chatrelay_core::{is_valid_thread_id, Attachment, PromptOptions, PromptRequest};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use super::run_prompt;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptBody {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub options: PromptOptions,
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Image references: `http(s)` URLs or base64 `data:` URLs.
    #[serde(default)]
    pub attachments: Vec<String>,
}

fn legacy_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Validate the body into a prompt request.
pub(crate) fn build_request(body: PromptBody) -> Result<PromptRequest, String> {
    let prompt = body
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| "'prompt' is required".to_string())?;

    let mut options = body.options;
    let thread_id = options.thread_id.take();
    let options = options.with_thread_id(thread_id);
    if let Some(thread_id) = options.thread_id.as_deref() {
        if !is_valid_thread_id(thread_id) {
            return Err(format!("invalid threadId: {}", thread_id));
        }
    }

    let attachments = body
        .attachments
        .iter()
        .map(|r| Attachment::parse(r).ok_or_else(|| format!("unsupported attachment: {}", r)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PromptRequest::new(prompt)
        .with_system_prompt(body.system_prompt)
        .with_options(options)
        .with_attachments(attachments))
}

pub async fn prompt(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PromptBody>, JsonRejection>,
) -> Response {
    debug!("POST /api/prompt");

    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return legacy_error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let request = match build_request(body) {
        Ok(request) => request,
        Err(message) => return legacy_error(StatusCode::BAD_REQUEST, message),
    };

    match run_prompt(&state, request).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            error!(kind = e.kind(), error = %e, "POST /api/prompt failed");
            legacy_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
