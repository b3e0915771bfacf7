//! Response stabilization.
//!
//! The chat UI streams a reply into the DOM with no completion event. The
//! poller reads the reply container at a fixed interval and declares the reply
//! finished once two consecutive reads return the same non-empty text, unless
//! that text is one of the progress captions the UI holds steady while it
//! works.

use std::time::Duration;

use chatrelay_config::PollerConfig;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::page::ChatPage;
use crate::selectors::SelectorSet;

/// Iteration and empty-read budgets for one poll run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    pub poll_limit: u32,
    pub max_empty_polls: u32,
}

impl PollBudget {
    /// Budgets from config, scaled by the reasoning multiplier in deep reasoning mode.
    pub fn from_config(config: &PollerConfig, reason: bool) -> Self {
        let factor = if reason {
            config.reasoning_multiplier.max(1)
        } else {
            1
        };
        Self {
            poll_limit: config.poll_limit.saturating_mul(factor),
            max_empty_polls: config.max_empty_polls.saturating_mul(factor),
        }
    }
}

/// How a poll run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Two consecutive identical, non-transient reads.
    Stable(String),
    /// Budget exhausted. Carries the last non-empty read, if any.
    TimedOut(Option<String>),
    /// The UI showed an error banner.
    ErrorDetected {
        error: String,
        partial: Option<String>,
    },
}

impl Default for PollOutcome {
    fn default() -> Self {
        Self::TimedOut(None)
    }
}

impl PollOutcome {
    /// The best text this run produced.
    pub fn final_text(&self) -> Option<&str> {
        match self {
            Self::Stable(text) => Some(text),
            Self::TimedOut(partial) | Self::ErrorDetected { partial, .. } => partial.as_deref(),
        }
    }

    pub fn is_stable(&self) -> bool {
        matches!(self, Self::Stable(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Stable(_) => "stable",
            Self::TimedOut(_) => "timed_out",
            Self::ErrorDetected { .. } => "error_detected",
        }
    }
}

#[derive(Debug, Default)]
struct PollState {
    previous: String,
    last_non_empty: Option<String>,
    empty_polls: u32,
    iterations: u32,
}

/// Polls one reply container until it stabilizes.
pub struct ResponsePoller<'a> {
    page: &'a dyn ChatPage,
    selectors: &'a SelectorSet,
    budget: PollBudget,
    interval: Duration,
    transient_prefixes: &'a [String],
}

impl<'a> ResponsePoller<'a> {
    pub fn new(
        page: &'a dyn ChatPage,
        selectors: &'a SelectorSet,
        config: &'a PollerConfig,
        reason: bool,
    ) -> Self {
        Self {
            page,
            selectors,
            budget: PollBudget::from_config(config, reason),
            interval: Duration::from_millis(config.interval_ms),
            transient_prefixes: &config.transient_prefixes,
        }
    }

    pub fn budget(&self) -> PollBudget {
        self.budget
    }

    /// Whether a stable read is still a progress caption.
    pub fn is_transient(&self, text: &str) -> bool {
        self.transient_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && text.starts_with(prefix.as_str()))
    }

    /// Poll until stable, out of budget, an error banner, or cancellation.
    pub async fn poll(&self, cancel: &CancellationToken) -> Result<PollOutcome, CoreError> {
        let mut state = PollState::default();

        while state.iterations < self.budget.poll_limit {
            state.iterations += 1;
            let poll = state.iterations;

            if let Some(error) = self.page.text_content(&self.selectors.error).await? {
                warn!(poll, error = %error, "Chat UI reported an error");
                return Ok(PollOutcome::ErrorDetected {
                    error,
                    partial: state.last_non_empty,
                });
            }

            let thinking = self.page.exists(&self.selectors.thinking).await?;
            let text = self
                .page
                .text_content(&self.selectors.reply)
                .await?
                .unwrap_or_default();

            if text.is_empty() {
                state.empty_polls += 1;
                debug!(
                    poll,
                    empty_polls = state.empty_polls,
                    thinking,
                    "Reply container empty"
                );
                if state.empty_polls >= self.budget.max_empty_polls && !thinking {
                    warn!(poll, "Too many empty polls without a thinking indicator");
                    return Ok(PollOutcome::TimedOut(state.last_non_empty));
                }
            } else {
                state.empty_polls = 0;
                debug!(poll, preview = %preview(&text), "Reply text");

                if text == state.previous {
                    if !self.is_transient(&text) {
                        info!(poll, "Reply stabilized");
                        return Ok(PollOutcome::Stable(text));
                    }
                    debug!(poll, "Stable text is a progress caption, still waiting");
                }
                state.last_non_empty = Some(text.clone());
            }

            state.previous = text;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(poll, "Polling cancelled");
                    return Err(CoreError::Cancelled);
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        warn!(
            iterations = state.iterations,
            "Reply never stabilized, returning last received text"
        );
        Ok(PollOutcome::TimedOut(state.last_non_empty))
    }
}

fn preview(text: &str) -> String {
    text.chars()
        .take(50)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
