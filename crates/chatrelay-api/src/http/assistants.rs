//! Assistants-style threads, messages and runs over the in-memory store.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::openai_compat::MessageContent;
use crate::error::ApiError;
use crate::processor::process_run;
use crate::state::AppState;
use crate::store::{Run, Thread, ThreadMessage};

pub const ASSISTANT_ID: &str = "asst_unofficial";

#[derive(Debug, Deserialize)]
pub struct NewMessage {
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub content: Option<MessageContent>,
}

impl NewMessage {
    fn into_pair(self) -> (String, String) {
        let content = self.content.map(|c| c.as_text()).unwrap_or_default();
        (self.role, content)
    }
}

fn default_role() -> String {
    "user".to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct NewThread {
    #[serde(default)]
    pub messages: Vec<NewMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewRun {
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

fn assistant(id: &str) -> Value {
    json!({
        "id": id,
        "object": "assistant",
        "created_at": chrono::Utc::now().timestamp(),
        "model": "gpt-4",
    })
}

pub async fn list_assistants() -> Json<Value> {
    Json(json!({ "object": "list", "data": [assistant(ASSISTANT_ID)] }))
}

pub async fn get_assistant(Path(id): Path<String>) -> Json<Value> {
    Json(assistant(&id))
}

/// An empty or missing body creates an empty thread.
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewThread>, JsonRejection>,
) -> Result<(StatusCode, Json<Thread>), ApiError> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(JsonRejection::MissingJsonContentType(_)) => NewThread::default(),
        Err(rejection) => return Err(ApiError::invalid(rejection.body_text(), None)),
    };
    let initial = body.messages.into_iter().map(NewMessage::into_pair).collect();
    Ok((StatusCode::CREATED, Json(state.store.create_thread(initial))))
}

pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> Result<Json<Thread>, ApiError> {
    state
        .store
        .get_thread(&thread_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Thread not found: {}", thread_id)))
}

pub async fn add_message(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    payload: Result<Json<NewMessage>, JsonRejection>,
) -> Result<(StatusCode, Json<ThreadMessage>), ApiError> {
    let Json(body) = payload.map_err(|r| ApiError::invalid(r.body_text(), None))?;
    let (role, content) = body.into_pair();
    let message = state.store.add_message(&thread_id, &role, &content, None)?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let messages = state.store.list_messages(&thread_id)?;
    Ok(Json(json!({ "object": "list", "data": messages })))
}

/// Queue a run and process it in the background.
pub async fn create_run(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    payload: Result<Json<NewRun>, JsonRejection>,
) -> Result<(StatusCode, Json<Run>), ApiError> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(JsonRejection::MissingJsonContentType(_)) => NewRun::default(),
        Err(rejection) => return Err(ApiError::invalid(rejection.body_text(), None)),
    };
    let run = state
        .store
        .create_run(&thread_id, body.assistant_id, body.model)?;

    tokio::spawn(process_run(state.clone(), run.id.clone()));

    Ok((StatusCode::CREATED, Json(run)))
}

pub async fn get_run(
    State(state): State<Arc<AppState>>,
    Path((thread_id, run_id)): Path<(String, String)>,
) -> Result<Json<Run>, ApiError> {
    Ok(Json(state.store.get_run(&thread_id, &run_id)?))
}

#[cfg(test)]
#[path = "assistants_tests.rs"]
mod tests;
