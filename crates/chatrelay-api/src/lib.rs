//! # chatrelay api
//!
//! The HTTP surface in front of a [`chatrelay_core::PromptRunner`]:
//!
//! - `POST /api/prompt` - native prompt endpoint
//! - `POST /v1/chat/completions` - chat-completion shaped endpoint
//! - `/v1/assistants`, `/v1/threads…` - assistants-style threads and runs
//!   backed by an in-memory [`ThreadStore`]
//!
//! Every route except `/` and `/health` requires the shared API key unless
//! the server runs in development mode.

pub mod error;
pub mod http;
pub mod processor;
pub mod server;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::ApiError;
pub use http::routes::create_router;
pub use server::{ApiServer, ListenConfig};
pub use state::AppState;
pub use store::{Run, RunStatus, Thread, ThreadMessage, ThreadStore};
