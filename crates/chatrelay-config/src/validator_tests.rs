use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    // No API key outside dev mode is only a warning.
    assert!(result.warnings.iter().any(|w| w.path == "auth.api_key"));
}

#[test]
fn test_validate_dev_mode_without_key_has_no_auth_warning() {
    let mut config = Config::default();
    config.server.dev_mode = true;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.warnings.iter().any(|w| w.path == "auth.api_key"));
}

#[test]
fn test_validate_invalid_port() {
    let mut config = Config::default();
    config.server.port = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "server.port"));
}

#[test]
fn test_validate_invalid_base_url() {
    let mut config = Config::default();
    config.chat.base_url = "chatgpt.com".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "chat.base_url"));
}

#[test]
fn test_validate_zero_poll_limit() {
    let mut config = Config::default();
    config.poller.poll_limit = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "poller.poll_limit"));
}

#[test]
fn test_validate_zero_multiplier() {
    let mut config = Config::default();
    config.poller.reasoning_multiplier = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "poller.reasoning_multiplier"));
}

#[test]
fn test_validate_empty_budget_exceeding_limit_warns() {
    let mut config = Config::default();
    config.poller.poll_limit = 10;
    config.poller.max_empty_polls = 20;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "poller.max_empty_polls"));
}

#[test]
fn test_validate_bad_cookies_json_warns() {
    let mut config = Config::default();
    config.browser.cookies_json = Some("{not json".to_string());

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "browser.cookies_json"));
}

#[test]
fn test_validate_template_without_placeholder_warns() {
    let mut config = Config::default();
    config.selectors.reply = "div.markdown".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.warnings.iter().any(|w| w.path == "selectors.reply"));
}

#[test]
fn test_validate_empty_editor_selector() {
    let mut config = Config::default();
    config.selectors.editor = " ".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "selectors.editor"));
}

#[test]
fn test_into_result_reports_first_error() {
    let mut config = Config::default();
    config.server.port = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    let err = result.into_result().unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_validation_result_methods() {
    let mut result = ValidationResult::default();
    assert!(result.is_valid());

    result.add_warning(ValidationWarning::new("test", "warning"));
    assert!(result.is_valid());

    result.add_error(ValidationError::new("test", "error"));
    assert!(!result.is_valid());
}
