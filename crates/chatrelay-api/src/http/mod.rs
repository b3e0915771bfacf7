//! HTTP interface module.
//!
//! - `/api/prompt` - native prompt endpoint
//! - `/v1/chat/completions` - chat-completion shaped endpoint
//! - `/v1/assistants`, `/v1/threads…` - assistants-style threads and runs
//! - `/`, `/health` - liveness

pub mod routes;

pub(crate) mod assistants;
pub(crate) mod auth;
pub(crate) mod monitoring;
pub(crate) mod openai_compat;
pub(crate) mod prompt;

use std::sync::Arc;

use chatrelay_core::{CoreError, PromptRequest, PromptResult};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::state::AppState;

/// Run a prompt on its own task, cancelled if the caller goes away.
///
/// Dropping the returned future (client disconnect) drops the guard, which
/// cancels the poll at its next suspension point; the task still releases
/// its page.
pub(crate) async fn run_prompt(
    state: &Arc<AppState>,
    request: PromptRequest,
) -> Result<PromptResult, CoreError> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let runner = state.runner.clone();

    match tokio::spawn(async move { runner.run(request, cancel).await }).await {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "Prompt task panicked or was aborted");
            Err(CoreError::Browser(format!("prompt task failed: {}", e)))
        }
    }
}
