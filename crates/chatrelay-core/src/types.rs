//! Request and result types.

use serde::{Deserialize, Serialize};

use crate::attachments::Attachment;
use crate::poller::PollOutcome;

/// Mode flags and thread continuity for one prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptOptions {
    /// Deep reasoning mode: poll budgets are scaled up.
    #[serde(default)]
    pub reason: bool,

    /// Web search mode. Echoed back; the UI tool toggle is not driven.
    #[serde(default)]
    pub search: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl PromptOptions {
    /// Mode flags implied by a model name (`o1`/`reason`, `search`/`web`).
    pub fn from_model(model: &str) -> Self {
        let model = model.to_ascii_lowercase();
        Self {
            reason: model.contains("o1") || model.contains("reason"),
            search: model.contains("search") || model.contains("web"),
            thread_id: None,
        }
    }

    pub fn with_thread_id(mut self, thread_id: Option<String>) -> Self {
        self.thread_id = thread_id.filter(|id| !id.is_empty());
        self
    }
}

/// One inbound prompt. Consumed once.
#[derive(Debug, Clone, Default)]
pub struct PromptRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub options: PromptOptions,
    pub attachments: Vec<Attachment>,
}

impl PromptRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt.filter(|s| !s.is_empty());
        self
    }

    pub fn with_options(mut self, options: PromptOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// The text actually typed into the editor.
    pub fn composed_prompt(&self) -> String {
        match self.system_prompt.as_deref() {
            Some(system) => format!("{} | Prompt: {}", system, self.prompt),
            None => self.prompt.clone(),
        }
    }
}

/// What one prompt produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptResult {
    /// Derived from the tab's location after submission, never echoed.
    pub thread_id: Option<String>,
    pub system_prompt: Option<String>,
    pub prompt: String,
    pub options: PromptOptions,
    /// Raw text of the reply container, if anything was captured.
    pub response: Option<String>,
    /// Normalized reply text; empty when nothing was captured.
    pub cleaned_response: String,
    #[serde(skip)]
    pub outcome: PollOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composed_prompt_with_system() {
        let request = PromptRequest::new("Name 3 primary colors.")
            .with_system_prompt(Some("Answer tersely".to_string()));
        assert_eq!(
            request.composed_prompt(),
            "Answer tersely | Prompt: Name 3 primary colors."
        );
    }

    #[test]
    fn test_composed_prompt_without_system() {
        let request = PromptRequest::new("hi").with_system_prompt(Some(String::new()));
        assert!(request.system_prompt.is_none());
        assert_eq!(request.composed_prompt(), "hi");
    }

    #[test]
    fn test_options_from_model() {
        assert!(PromptOptions::from_model("o1-preview").reason);
        assert!(PromptOptions::from_model("gpt-4-reasoning").reason);
        assert!(PromptOptions::from_model("gpt-4o-search").search);
        assert!(PromptOptions::from_model("WEB").search);
        let plain = PromptOptions::from_model("gpt-4");
        assert!(!plain.reason && !plain.search);
    }

    #[test]
    fn test_options_serde_uses_camel_case() {
        let options: PromptOptions =
            serde_json::from_str(r#"{"reason":true,"threadId":"abc"}"#).unwrap();
        assert!(options.reason);
        assert!(!options.search);
        assert_eq!(options.thread_id.as_deref(), Some("abc"));

        let json = serde_json::to_value(PromptOptions::default()).unwrap();
        assert_eq!(json, serde_json::json!({"reason": false, "search": false}));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = PromptResult {
            thread_id: Some("t1".to_string()),
            system_prompt: None,
            prompt: "p".to_string(),
            options: PromptOptions::default(),
            response: Some("r".to_string()),
            cleaned_response: "r".to_string(),
            outcome: PollOutcome::Stable("r".to_string()),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["threadId"], "t1");
        assert_eq!(json["cleanedResponse"], "r");
        assert!(json.get("outcome").is_none());
    }
}
