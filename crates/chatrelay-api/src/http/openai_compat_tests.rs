use super::*;
use crate::http::routes::create_router;
use crate::test_support::{body_json, state_with, StubRunner};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

fn parse(body: serde_json::Value) -> ChatCompletionRequest {
    serde_json::from_value(body).unwrap()
}

fn completion_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/chat/completions")
        .header("content-type", "application/json")
        .header("x-api-key", "secret")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[test]
fn test_message_content_as_text() {
    let content = MessageContent::Text("Hello".to_string());
    assert_eq!(content.as_text(), "Hello");

    let parts: MessageContent = serde_json::from_value(json!([
        {"type": "text", "text": "Hello"},
        {"type": "image_url", "image_url": {"url": "https://example.com/a.png"}},
        {"type": "text", "text": "World"}
    ]))
    .unwrap();
    assert_eq!(parts.as_text(), "Hello\nWorld");
    assert_eq!(parts.image_urls(), vec!["https://example.com/a.png"]);
}

#[test]
fn test_build_request_picks_last_user_and_system() {
    let body = parse(json!({
        "model": "o1-search",
        "messages": [
            {"role": "system", "content": "old system"},
            {"role": "user", "content": "first"},
            {"role": "assistant", "content": "reply"},
            {"role": "system", "content": "new system"},
            {"role": "user", "content": "second"}
        ],
        "threadId": "3fa85f64-5717-4562-b3fc-2c963f66afa6"
    }));

    let request = build_request(&body, Some("default")).unwrap();
    assert_eq!(request.prompt, "second");
    assert_eq!(request.system_prompt.as_deref(), Some("new system"));
    assert!(request.options.reason);
    assert!(request.options.search);
    assert_eq!(
        request.options.thread_id.as_deref(),
        Some("3fa85f64-5717-4562-b3fc-2c963f66afa6")
    );
}

#[test]
fn test_build_request_falls_back_to_default_system_prompt() {
    let body = parse(json!({"messages": [{"role": "user", "content": "hi"}]}));
    let request = build_request(&body, Some("Answer in English")).unwrap();
    assert_eq!(request.system_prompt.as_deref(), Some("Answer in English"));
    assert!(!request.options.reason);
}

#[test]
fn test_build_request_collects_image_attachments() {
    let body = parse(json!({
        "messages": [{"role": "user", "content": [
            {"type": "text", "text": "What is this?"},
            {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,/9j/4AAQ"}},
            {"type": "image_url", "image_url": "https://example.com/b.webp"}
        ]}]
    }));
    let request = build_request(&body, None).unwrap();
    assert_eq!(request.attachments.len(), 2);
}

#[test]
fn test_build_request_rejects_missing_messages() {
    let err = build_request(&parse(json!({"model": "gpt-4"})), None).unwrap_err();
    let envelope = err.envelope();
    assert_eq!(envelope.error.error_type, "invalid_request_error");
    assert_eq!(envelope.error.param.as_deref(), Some("messages"));
}

#[test]
fn test_build_request_rejects_no_user_message() {
    let body = parse(json!({"messages": [{"role": "system", "content": "x"}]}));
    let err = build_request(&body, None).unwrap_err();
    assert_eq!(err.to_string(), "No message with role 'user' found.");
}

#[test]
fn test_build_request_rejects_unsupported_image() {
    let body = parse(json!({"messages": [{"role": "user", "content": [
        {"type": "image_url", "image_url": {"url": "ftp://host/file.png"}}
    ]}]}));
    assert!(build_request(&body, None).is_err());
}

#[tokio::test]
async fn test_chat_completion_shape() {
    let runner = Arc::new(StubRunner::replying("Red, Blue, Yellow").with_thread("abc-123"));
    let app = create_router(state_with(runner, false));

    let response = app
        .oneshot(completion_request(json!({
            "model": "gpt-4o",
            "messages": [{"role": "user", "content": "Name 3 primary colors."}],
            "stream": true
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[THREAD_ID_HEADER], "abc-123");

    let json = body_json(response).await;
    assert!(json["id"].as_str().unwrap().starts_with("chatcmpl-"));
    assert_eq!(json["object"], "chat.completion");
    assert_eq!(json["model"], "gpt-4o");
    assert_eq!(json["system_fingerprint"], "abc-123");
    assert_eq!(json["choices"][0]["message"]["role"], "assistant");
    assert_eq!(json["choices"][0]["message"]["content"], "Red, Blue, Yellow");
    assert_eq!(json["choices"][0]["finish_reason"], "stop");
    assert_eq!(json["usage"]["total_tokens"], -1);
}

#[tokio::test]
async fn test_chat_completion_default_model_and_empty_thread_header() {
    let runner = Arc::new(StubRunner::replying("ok"));
    let app = create_router(state_with(runner, false));

    let response = app
        .oneshot(completion_request(json!({
            "messages": [{"role": "user", "content": "hi"}]
        })))
        .await
        .unwrap();

    assert_eq!(response.headers()[THREAD_ID_HEADER], "");
    let json = body_json(response).await;
    assert_eq!(json["model"], DEFAULT_MODEL);
    assert!(json["system_fingerprint"].is_null());
}

#[tokio::test]
async fn test_chat_completion_empty_messages_is_400() {
    let runner = Arc::new(StubRunner::replying("ok"));
    let app = create_router(state_with(runner.clone(), false));

    let response = app
        .oneshot(completion_request(json!({"model": "gpt-4", "messages": []})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["param"], "messages");
    assert!(runner.last_request().is_none());
}

#[tokio::test]
async fn test_chat_completion_failure_hides_detail() {
    let app = create_router(state_with(Arc::new(StubRunner::failing()), false));
    let response = app
        .oneshot(completion_request(json!({
            "messages": [{"role": "user", "content": "hi"}]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"]["type"], "server_error");
    assert_eq!(json["error"]["message"], "Internal Server Error");
}

#[tokio::test]
async fn test_chat_completion_failure_shows_detail_in_dev() {
    let app = create_router(state_with(Arc::new(StubRunner::failing()), true));
    let response = app
        .oneshot(completion_request(json!({
            "messages": [{"role": "user", "content": "hi"}]
        })))
        .await
        .unwrap();

    let json = body_json(response).await;
    assert!(json["error"]["message"].as_str().unwrap().contains("#prompt-textarea"));
}
