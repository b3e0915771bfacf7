//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Collapse into the first error, if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(e) => Err(ConfigError::InvalidValue {
                field: e.path,
                message: e.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_auth(config, &mut result);
        Self::validate_browser(config, &mut result);
        Self::validate_chat(config, &mut result);
        Self::validate_poller(config, &mut result);
        Self::validate_selectors(config, &mut result);

        Ok(result)
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_auth(config: &Config, result: &mut ValidationResult) {
        if config.auth.header.trim().is_empty() {
            result.add_error(ValidationError::new("auth.header", "Header name cannot be empty"));
        }

        if config.auth.key().is_none() && !config.server.dev_mode {
            result.add_warning(ValidationWarning::new(
                "auth.api_key",
                "No API key configured and dev_mode is off; every API request will be rejected",
            ));
        }
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        if config.browser.debug_port == 0 {
            result.add_error(ValidationError::new(
                "browser.debug_port",
                "Debug port cannot be 0",
            ));
        }

        if let Some(ref cookies) = config.browser.cookies_json {
            if serde_json::from_str::<Vec<serde_json::Value>>(cookies).is_err() {
                result.add_warning(ValidationWarning::new(
                    "browser.cookies_json",
                    "cookies_json is not a JSON array; no cookies will be injected",
                ));
            }
        }
    }

    fn validate_chat(config: &Config, result: &mut ValidationResult) {
        let url = &config.chat.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            result.add_error(ValidationError::new(
                "chat.base_url",
                "base_url must start with http:// or https://",
            ));
        }

        if config.chat.navigation_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "chat.navigation_timeout_secs",
                "navigation_timeout_secs must be greater than 0",
            ));
        }
    }

    fn validate_poller(config: &Config, result: &mut ValidationResult) {
        let poller = &config.poller;

        if poller.poll_limit == 0 {
            result.add_error(ValidationError::new(
                "poller.poll_limit",
                "poll_limit must be greater than 0",
            ));
        }

        if poller.max_empty_polls == 0 {
            result.add_error(ValidationError::new(
                "poller.max_empty_polls",
                "max_empty_polls must be greater than 0",
            ));
        }

        if poller.reasoning_multiplier == 0 {
            result.add_error(ValidationError::new(
                "poller.reasoning_multiplier",
                "reasoning_multiplier must be at least 1",
            ));
        }

        if poller.interval_ms < 100 {
            result.add_warning(ValidationWarning::new(
                "poller.interval_ms",
                "interval_ms below 100 polls the page very aggressively",
            ));
        }

        if poller.max_empty_polls > poller.poll_limit {
            result.add_warning(ValidationWarning::new(
                "poller.max_empty_polls",
                "max_empty_polls exceeds poll_limit and can never trigger",
            ));
        }
    }

    fn validate_selectors(config: &Config, result: &mut ValidationResult) {
        let selectors = &config.selectors;

        for (path, template) in [
            ("selectors.reply", &selectors.reply),
            ("selectors.thinking", &selectors.thinking),
        ] {
            if !template.contains("{turn}") {
                result.add_warning(ValidationWarning::new(
                    path,
                    "template has no {turn} placeholder; it will match across all turns",
                ));
            }
        }

        for (path, value) in [
            ("selectors.turn", &selectors.turn),
            ("selectors.editor", &selectors.editor),
            ("selectors.error", &selectors.error),
        ] {
            if value.trim().is_empty() {
                result.add_error(ValidationError::new(path, "selector cannot be empty"));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
