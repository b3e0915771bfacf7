//! Root page and health check.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

const INDEX_HTML: &str = r#"<!doctype html>
<html>
  <head><title>chatrelay</title></head>
  <body>
    <h1>chatrelay is up</h1>
    <p>POST /api/prompt or /v1/chat/completions to talk to the assistant.</p>
  </body>
</html>
"#;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime().as_secs(),
    })
}
