//! Background processing of assistants-style runs.

use std::sync::Arc;

use chatrelay_core::{PromptOptions, PromptRequest};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::state::AppState;
use crate::store::RunStatus;

const FALLBACK_PROMPT: &str = "continue";

/// Drive one run `queued → in_progress → completed | failed`.
///
/// The last user message is the prompt. The stored web UI thread is reused
/// and updated from the result, and the reply is appended to the thread.
pub async fn process_run(state: Arc<AppState>, run_id: String) {
    let Some(run) = state.store.run(&run_id) else {
        return;
    };
    let store = &state.store;
    store.update_run_status(&run_id, RunStatus::InProgress, None);

    let Some(thread) = store.get_thread(&run.thread_id) else {
        store.update_run_status(&run_id, RunStatus::Failed, Some("Thread not found".to_string()));
        return;
    };

    let prompt = thread
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.text().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| FALLBACK_PROMPT.to_string());

    let options = PromptOptions::from_model(&run.model).with_thread_id(thread.chat_thread_id.clone());
    info!(run_id = %run_id, thread_id = ?options.thread_id, "Processing run");

    let request = PromptRequest::new(prompt)
        .with_system_prompt(state.default_system_prompt.clone())
        .with_options(options);

    match state.runner.run(request, CancellationToken::new()).await {
        Ok(result) => {
            if let Some(chat_thread_id) = result.thread_id.clone() {
                store.set_chat_thread_id(&thread.id, chat_thread_id);
            }
            let reply = if result.cleaned_response.is_empty() {
                result.response.unwrap_or_default()
            } else {
                result.cleaned_response
            };
            if let Err(e) = store.add_message(&thread.id, "assistant", &reply, Some(&run_id)) {
                store.update_run_status(&run_id, RunStatus::Failed, Some(e.to_string()));
                return;
            }
            store.update_run_status(&run_id, RunStatus::Completed, None);
            info!(run_id = %run_id, "Run completed");
        }
        Err(e) => {
            error!(run_id = %run_id, kind = e.kind(), error = %e, "Run failed");
            store.update_run_status(&run_id, RunStatus::Failed, Some(e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{state_with, StubRunner};

    #[tokio::test]
    async fn test_process_run_completes_and_threads_context() {
        let runner = Arc::new(StubRunner::replying("Red, Blue, Yellow").with_thread("abc-1"));
        let state = state_with(runner.clone(), false);

        let thread = state
            .store
            .create_thread(vec![("user".to_string(), "Name 3 primary colors.".to_string())]);
        let run = state
            .store
            .create_run(&thread.id, None, Some("o1-search".to_string()))
            .unwrap();

        process_run(state.clone(), run.id.clone()).await;

        let done = state.store.run(&run.id).unwrap();
        assert_eq!(done.status, RunStatus::Completed);

        let messages = state.store.list_messages(&thread.id).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[1].text(), "Red, Blue, Yellow");
        assert_eq!(messages[1].run_id.as_deref(), Some(run.id.as_str()));

        assert_eq!(
            state.store.get_thread(&thread.id).unwrap().chat_thread_id.as_deref(),
            Some("abc-1")
        );

        let seen = runner.last_request().unwrap();
        assert_eq!(seen.prompt, "Name 3 primary colors.");
        assert!(seen.options.reason);
        assert!(seen.options.search);
        assert!(seen.options.thread_id.is_none());
    }

    #[tokio::test]
    async fn test_process_run_reuses_chat_thread() {
        let runner = Arc::new(StubRunner::replying("ok"));
        let state = state_with(runner.clone(), false);
        let thread = state.store.create_thread(Vec::new());
        state.store.set_chat_thread_id(&thread.id, "prev-thread".to_string());
        let run = state.store.create_run(&thread.id, None, None).unwrap();

        process_run(state.clone(), run.id.clone()).await;

        let seen = runner.last_request().unwrap();
        assert_eq!(seen.prompt, "continue");
        assert_eq!(seen.options.thread_id.as_deref(), Some("prev-thread"));
    }

    #[tokio::test]
    async fn test_process_run_failure_marks_run_failed() {
        let runner = Arc::new(StubRunner::failing());
        let state = state_with(runner, false);
        let thread = state
            .store
            .create_thread(vec![("user".to_string(), "hi".to_string())]);
        let run = state.store.create_run(&thread.id, None, None).unwrap();

        process_run(state.clone(), run.id.clone()).await;

        let failed = state.store.run(&run.id).unwrap();
        assert_eq!(failed.status, RunStatus::Failed);
        assert!(failed.last_error.is_some());
        assert_eq!(state.store.list_messages(&thread.id).unwrap().len(), 1);
    }
}
