//! # chatrelay core
//!
//! Drives one prompt through the chat web UI and turns the rendered reply
//! into plain text.
//!
//! ## Pieces
//!
//! - [`ChatPage`] / [`PageSource`] - the seam to the browser driver
//! - [`ThreadResolver`] - maps thread ids to navigation targets and back
//! - [`SelectorSet`] - per-request reply, thinking and error selectors
//! - [`ResponsePoller`] - waits for a streamed reply to stop changing
//! - [`normalize_html`] - HTML fragment to deterministic plain text
//! - [`Orchestrator`] - the submission sequence around all of the above
//! - [`PromptService`] - acquires a page, runs the orchestrator, releases the page

pub mod attachments;
pub mod error;
pub mod login;
pub mod normalizer;
pub mod orchestrator;
pub mod page;
pub mod poller;
pub mod selectors;
pub mod service;
pub mod thread;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use attachments::{Attachment, MaterializedAttachments};
pub use error::CoreError;
pub use login::{is_logged_in, perform_login, Credentials};
pub use normalizer::normalize_html;
pub use orchestrator::Orchestrator;
pub use page::{ChatPage, PageSource};
pub use poller::{PollBudget, PollOutcome, ResponsePoller};
pub use selectors::SelectorSet;
pub use service::{PromptRunner, PromptService};
pub use thread::{is_valid_thread_id, ThreadResolver};
pub use types::{PromptOptions, PromptRequest, PromptResult};
