//! Page acquisition around the orchestrator.

use std::sync::Arc;

use async_trait::async_trait;
use chatrelay_config::Config;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::CoreError;
use crate::login::{perform_login, Credentials};
use crate::orchestrator::Orchestrator;
use crate::page::{ChatPage, PageSource};
use crate::types::{PromptRequest, PromptResult};

/// Runs prompts to completion. The HTTP layer only sees this trait.
#[async_trait]
pub trait PromptRunner: Send + Sync {
    async fn run(
        &self,
        request: PromptRequest,
        cancel: CancellationToken,
    ) -> Result<PromptResult, CoreError>;
}

/// One page per prompt, released on every exit path.
pub struct PromptService {
    source: Arc<dyn PageSource>,
    orchestrator: Orchestrator,
}

impl PromptService {
    pub fn new(source: Arc<dyn PageSource>, orchestrator: Orchestrator) -> Self {
        Self {
            source,
            orchestrator,
        }
    }

    /// Check the session and log in if needed, on a page of its own.
    pub async fn login(
        &self,
        config: &Config,
        credentials: Option<&Credentials>,
    ) -> Result<(), CoreError> {
        let page = self.source.acquire_page().await?;
        let result = perform_login(page.as_ref(), config, credentials).await;
        release(page.as_ref()).await;
        result
    }
}

#[async_trait]
impl PromptRunner for PromptService {
    async fn run(
        &self,
        request: PromptRequest,
        cancel: CancellationToken,
    ) -> Result<PromptResult, CoreError> {
        let page = self.source.acquire_page().await?;
        let result = self.orchestrator.run(page.as_ref(), &request, &cancel).await;
        release(page.as_ref()).await;
        result
    }
}

async fn release(page: &dyn ChatPage) {
    if let Err(e) = page.close().await {
        warn!(error = %e, "Failed to close page");
    }
}
