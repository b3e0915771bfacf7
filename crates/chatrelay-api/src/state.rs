//! Application state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chatrelay_config::{AuthConfig, Config};
use chatrelay_core::PromptRunner;

use crate::store::ThreadStore;

/// Application state shared across handlers.
pub struct AppState {
    pub runner: Arc<dyn PromptRunner>,
    pub store: ThreadStore,
    pub auth: AuthConfig,
    /// Skips API key checks and exposes internal error details.
    pub dev_mode: bool,
    /// Used when a request carries no system message.
    pub default_system_prompt: Option<String>,
    start_time: Instant,
}

impl AppState {
    pub fn new(runner: Arc<dyn PromptRunner>, config: &Config) -> Self {
        Self {
            runner,
            store: ThreadStore::new(),
            auth: config.auth.clone(),
            dev_mode: config.server.dev_mode,
            default_system_prompt: config
                .chat
                .default_system_prompt
                .clone()
                .filter(|s| !s.is_empty()),
            start_time: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
