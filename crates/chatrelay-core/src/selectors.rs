//! Per-request selector set.

use chatrelay_config::SelectorConfig;

const TURN_PLACEHOLDER: &str = "{turn}";

/// Reply, thinking and error selectors for one submitted prompt.
///
/// Built once, right after submission, from the id of the newest turn. When
/// that id could not be read the templates fall back to the last turn of any
/// kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSet {
    pub reply: String,
    pub thinking: String,
    pub error: String,
    /// The turn id the set was built from, if any.
    pub turn_id: Option<String>,
}

impl SelectorSet {
    pub fn resolve(config: &SelectorConfig, turn_id: Option<&str>) -> Self {
        let turn_id = turn_id.filter(|id| !id.is_empty());
        let turn = match turn_id {
            Some(id) => format!(
                "{}[{}=\"{}\"]",
                config.turn,
                config.turn_id_attribute,
                escape_attribute_value(id)
            ),
            None => config.last_turn.clone(),
        };

        Self {
            reply: config.reply.replace(TURN_PLACEHOLDER, &turn),
            thinking: config.thinking.replace(TURN_PLACEHOLDER, &turn),
            error: config.error.clone(),
            turn_id: turn_id.map(str::to_string),
        }
    }

    /// Reply container or thinking indicator, whichever renders first.
    pub fn reply_or_thinking(&self) -> String {
        format!("{}, {}", self.reply, self.thinking)
    }
}

/// Escape a value for use inside a double-quoted CSS attribute selector.
fn escape_attribute_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\a "),
            _ => escaped.push(c),
        }
    }
    escaped
}
