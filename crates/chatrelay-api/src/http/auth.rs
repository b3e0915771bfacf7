//! Shared-secret API key middleware.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// The key presented by the client: the configured header first, then
/// `Authorization: Bearer`.
pub(crate) fn presented_key<'a>(headers: &'a HeaderMap, header_name: &str) -> Option<&'a str> {
    let custom = headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());
    custom.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    })
}

pub(crate) async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if state.dev_mode {
        return next.run(request).await;
    }

    let authorized = match (state.auth.key(), presented_key(request.headers(), &state.auth.header)) {
        (Some(expected), Some(presented)) => expected == presented,
        _ => false,
    };

    if !authorized {
        warn!(path = %request.uri().path(), "Rejected request with invalid api key");
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}
