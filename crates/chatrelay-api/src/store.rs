//! In-memory thread, message and run store for the assistants surface.
//!
//! Uses `DashMap` so handlers and background run processing share it
//! without explicit locking. Nothing survives a restart.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// A conversation as seen by assistants-style clients.
#[derive(Debug, Clone, Serialize)]
pub struct Thread {
    pub id: String,
    pub object: &'static str,
    pub created_at: i64,
    pub metadata: serde_json::Value,
    /// The web UI thread this conversation continues, once known.
    pub chat_thread_id: Option<String>,
    #[serde(skip)]
    pub messages: Vec<ThreadMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreadMessage {
    pub id: String,
    pub object: &'static str,
    pub created_at: i64,
    pub thread_id: String,
    pub role: String,
    pub content: Vec<MessageContent>,
    pub assistant_id: Option<String>,
    pub run_id: Option<String>,
    pub metadata: serde_json::Value,
}

impl ThreadMessage {
    /// The text of the first content block.
    pub fn text(&self) -> &str {
        self.content
            .first()
            .map(|c| c.text.value.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub content_type: &'static str,
    pub text: MessageText,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageText {
    pub value: String,
    pub annotations: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunError {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Run {
    pub id: String,
    pub object: &'static str,
    pub created_at: i64,
    pub thread_id: String,
    pub assistant_id: Option<String>,
    pub status: RunStatus,
    pub model: String,
    pub last_error: Option<RunError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<i64>,
}

/// Thread-safe store for threads and runs.
pub struct ThreadStore {
    threads: DashMap<String, Thread>,
    runs: DashMap<String, Run>,
}

impl ThreadStore {
    pub fn new() -> Self {
        Self {
            threads: DashMap::new(),
            runs: DashMap::new(),
        }
    }

    /// Create a thread seeded with `(role, content)` messages.
    pub fn create_thread(&self, initial: Vec<(String, String)>) -> Thread {
        let id = format!("thread_{}", Uuid::new_v4());
        let messages = initial
            .iter()
            .map(|(role, content)| new_message(&id, role, content, None))
            .collect();
        let thread = Thread {
            id: id.clone(),
            object: "thread",
            created_at: now(),
            metadata: serde_json::json!({}),
            chat_thread_id: None,
            messages,
        };
        self.threads.insert(id, thread.clone());
        thread
    }

    pub fn get_thread(&self, id: &str) -> Option<Thread> {
        self.threads.get(id).map(|t| t.value().clone())
    }

    pub fn set_chat_thread_id(&self, id: &str, chat_thread_id: String) {
        if let Some(mut thread) = self.threads.get_mut(id) {
            thread.chat_thread_id = Some(chat_thread_id);
        }
    }

    pub fn add_message(
        &self,
        thread_id: &str,
        role: &str,
        content: &str,
        run_id: Option<&str>,
    ) -> Result<ThreadMessage, StoreError> {
        let mut thread = self
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| StoreError::ThreadNotFound(thread_id.to_string()))?;

        let message = new_message(thread_id, role, content, run_id);
        thread.messages.push(message.clone());
        Ok(message)
    }

    /// Messages in insertion order.
    pub fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, StoreError> {
        self.threads
            .get(thread_id)
            .map(|t| t.messages.clone())
            .ok_or_else(|| StoreError::ThreadNotFound(thread_id.to_string()))
    }

    pub fn create_run(
        &self,
        thread_id: &str,
        assistant_id: Option<String>,
        model: Option<String>,
    ) -> Result<Run, StoreError> {
        if !self.threads.contains_key(thread_id) {
            return Err(StoreError::ThreadNotFound(thread_id.to_string()));
        }

        let run = Run {
            id: format!("run_{}", Uuid::new_v4()),
            object: "thread.run",
            created_at: now(),
            thread_id: thread_id.to_string(),
            assistant_id,
            status: RunStatus::Queued,
            model: model.filter(|m| !m.is_empty()).unwrap_or_else(|| "gpt-4".to_string()),
            last_error: None,
            completed_at: None,
            failed_at: None,
        };
        self.runs.insert(run.id.clone(), run.clone());
        Ok(run)
    }

    /// A run, only when it belongs to `thread_id`.
    pub fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run, StoreError> {
        self.runs
            .get(run_id)
            .filter(|r| r.thread_id == thread_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| StoreError::RunNotFound(run_id.to_string()))
    }

    pub fn run(&self, run_id: &str) -> Option<Run> {
        self.runs.get(run_id).map(|r| r.value().clone())
    }

    pub fn update_run_status(&self, run_id: &str, status: RunStatus, error: Option<String>) {
        if let Some(mut run) = self.runs.get_mut(run_id) {
            run.status = status;
            match status {
                RunStatus::Completed => run.completed_at = Some(now()),
                RunStatus::Failed => {
                    run.failed_at = Some(now());
                    run.last_error = error.map(|message| RunError {
                        code: "server_error",
                        message,
                    });
                }
                _ => {}
            }
        }
    }
}

impl Default for ThreadStore {
    fn default() -> Self {
        Self::new()
    }
}

fn new_message(thread_id: &str, role: &str, content: &str, run_id: Option<&str>) -> ThreadMessage {
    ThreadMessage {
        id: format!("msg_{}", Uuid::new_v4()),
        object: "thread.message",
        created_at: now(),
        thread_id: thread_id.to_string(),
        role: role.to_string(),
        content: vec![MessageContent {
            content_type: "text",
            text: MessageText {
                value: content.to_string(),
                annotations: Vec::new(),
            },
        }],
        assistant_id: None,
        run_id: run_id.map(str::to_string),
        metadata: serde_json::json!({}),
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
