//! Chat page, response poller and selector configuration.

use serde::{Deserialize, Serialize};

/// Navigation targets and the fixed waits around prompt submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Site root. Threads live under `<base_url>/c/<id>`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Bounded wait for an existing thread's earlier turns to render.
    #[serde(default = "default_context_wait")]
    pub context_wait_secs: u64,

    /// Bounded wait for the reply container or thinking indicator to appear.
    #[serde(default = "default_reply_wait")]
    pub reply_wait_secs: u64,

    #[serde(default = "default_post_navigation_delay")]
    pub post_navigation_delay_ms: u64,

    #[serde(default = "default_editor_settle")]
    pub editor_settle_ms: u64,

    #[serde(default = "default_clear_settle")]
    pub clear_settle_ms: u64,

    /// Delay between submitting and reading the newest turn identifier.
    #[serde(default = "default_reply_grace")]
    pub reply_grace_ms: u64,

    /// Delay after attaching files, for client-side thumbnailing.
    #[serde(default = "default_upload_settle")]
    pub upload_settle_ms: u64,

    /// System prompt used when a request carries none.
    #[serde(default)]
    pub default_system_prompt: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            navigation_timeout_secs: default_navigation_timeout(),
            context_wait_secs: default_context_wait(),
            reply_wait_secs: default_reply_wait(),
            post_navigation_delay_ms: default_post_navigation_delay(),
            editor_settle_ms: default_editor_settle(),
            clear_settle_ms: default_clear_settle(),
            reply_grace_ms: default_reply_grace(),
            upload_settle_ms: default_upload_settle(),
            default_system_prompt: None,
        }
    }
}

fn default_base_url() -> String {
    "https://chatgpt.com".to_string()
}

fn default_navigation_timeout() -> u64 {
    120
}

fn default_context_wait() -> u64 {
    15
}

fn default_reply_wait() -> u64 {
    60
}

fn default_post_navigation_delay() -> u64 {
    2000
}

fn default_editor_settle() -> u64 {
    2000
}

fn default_clear_settle() -> u64 {
    1000
}

fn default_reply_grace() -> u64 {
    1000
}

fn default_upload_settle() -> u64 {
    3000
}

/// Response stabilization budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    #[serde(default = "default_interval")]
    pub interval_ms: u64,

    /// Iteration cap in normal mode.
    #[serde(default = "default_poll_limit")]
    pub poll_limit: u32,

    /// Consecutive empty reads tolerated (without a thinking indicator) in normal mode.
    #[serde(default = "default_max_empty_polls")]
    pub max_empty_polls: u32,

    /// Budget multiplier applied in deep reasoning mode.
    #[serde(default = "default_reasoning_multiplier")]
    pub reasoning_multiplier: u32,

    /// Captions the UI shows while working; a stable read starting with one is not final.
    #[serde(default = "default_transient_prefixes")]
    pub transient_prefixes: Vec<String>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval(),
            poll_limit: default_poll_limit(),
            max_empty_polls: default_max_empty_polls(),
            reasoning_multiplier: default_reasoning_multiplier(),
            transient_prefixes: default_transient_prefixes(),
        }
    }
}

fn default_interval() -> u64 {
    1000
}

fn default_poll_limit() -> u32 {
    300
}

fn default_max_empty_polls() -> u32 {
    60
}

fn default_reasoning_multiplier() -> u32 {
    2
}

fn default_transient_prefixes() -> Vec<String> {
    ["Analyzing", "Reading", "Creating", "Searching", "Generating", "Thinking"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Named page selectors.
///
/// `reply` and `thinking` are templates: `{turn}` is replaced with either the
/// selector of the turn captured right after submission or, when no turn id
/// could be read, `last_turn`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Element wrapping one conversation turn.
    #[serde(default = "default_turn")]
    pub turn: String,

    /// Attribute carrying the turn identifier.
    #[serde(default = "default_turn_id_attribute")]
    pub turn_id_attribute: String,

    /// Fallback turn selector.
    #[serde(default = "default_last_turn")]
    pub last_turn: String,

    #[serde(default = "default_reply")]
    pub reply: String,

    #[serde(default = "default_thinking")]
    pub thinking: String,

    #[serde(default = "default_error")]
    pub error: String,

    #[serde(default = "default_editor")]
    pub editor: String,

    #[serde(default = "default_file_input")]
    pub file_input: String,

    /// Rendered content of earlier turns, awaited when continuing a thread.
    #[serde(default = "default_thread_context")]
    pub thread_context: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            turn: default_turn(),
            turn_id_attribute: default_turn_id_attribute(),
            last_turn: default_last_turn(),
            reply: default_reply(),
            thinking: default_thinking(),
            error: default_error(),
            editor: default_editor(),
            file_input: default_file_input(),
            thread_context: default_thread_context(),
        }
    }
}

fn default_turn() -> String {
    "article".to_string()
}

fn default_turn_id_attribute() -> String {
    "data-testid".to_string()
}

fn default_last_turn() -> String {
    "article:last-of-type".to_string()
}

fn default_reply() -> String {
    r#"{turn} div[data-message-author-role="assistant"] div.markdown"#.to_string()
}

fn default_thinking() -> String {
    r"{turn} div.mb-2.last\:mb-0".to_string()
}

fn default_error() -> String {
    "div.text-red-500, div.bg-red-500, .alert-error".to_string()
}

fn default_editor() -> String {
    "#prompt-textarea".to_string()
}

fn default_file_input() -> String {
    r#"input[type="file"]"#.to_string()
}

fn default_thread_context() -> String {
    "div.markdown".to_string()
}
