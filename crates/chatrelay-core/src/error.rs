//! Core error types.

use thiserror::Error;

/// Structural failures that abort a single prompt.
///
/// Degraded outcomes (a reply that never stabilized, an error banner shown by
/// the assistant) are not errors; see [`crate::PollOutcome`].
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Navigation to {url} timed out: {message}")]
    NavigationTimeout { url: String, message: String },

    #[error("Element not found: {selector} (at {location})")]
    ElementNotFound { selector: String, location: String },

    #[error("Attachment upload failed: {0}")]
    UploadFailure(String),

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Prompt was cancelled")]
    Cancelled,
}

impl CoreError {
    /// Short machine-readable kind, used in logs and API error codes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NavigationTimeout { .. } => "navigation_timeout",
            Self::ElementNotFound { .. } => "element_not_found",
            Self::UploadFailure(_) => "upload_failure",
            Self::LoginFailed(_) => "login_failed",
            Self::Browser(_) => "browser_error",
            Self::Cancelled => "cancelled",
        }
    }
}
