//! HTTP route definitions.

use std::sync::Arc;

use axum::http::Uri;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::http::{assistants, auth, monitoring, openai_compat, prompt};
use crate::state::AppState;

/// Create the main router.
///
/// ## Route Structure
///
/// ```text
/// POST   /api/prompt                          - Native prompt endpoint
///
/// /v1
///   POST   /v1/chat/completions               - Chat completion
///   GET    /v1/assistants                     - List assistants (one placeholder)
///   GET    /v1/assistants/{id}                - Get assistant
///   POST   /v1/threads                        - Create thread
///   GET    /v1/threads/{id}                   - Get thread
///   POST   /v1/threads/{id}/messages          - Add message
///   GET    /v1/threads/{id}/messages          - List messages
///   POST   /v1/threads/{id}/runs              - Create run (processed in background)
///   GET    /v1/threads/{id}/runs/{run_id}     - Get run
///
/// GET    /        - "Server is up" page (no auth)
/// GET    /health  - Health check (no auth)
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    let v1_routes = Router::new()
        .route("/chat/completions", post(openai_compat::chat_completions))
        .route("/assistants", get(assistants::list_assistants))
        .route("/assistants/{id}", get(assistants::get_assistant))
        .route("/threads", post(assistants::create_thread))
        .route("/threads/{id}", get(assistants::get_thread))
        .route(
            "/threads/{id}/messages",
            post(assistants::add_message).get(assistants::list_messages),
        )
        .route("/threads/{id}/runs", post(assistants::create_run))
        .route("/threads/{id}/runs/{run_id}", get(assistants::get_run));

    // Auth applies to matched routes only; unknown paths fall through to 404.
    let protected = Router::new()
        .route("/api/prompt", post(prompt::prompt))
        .nest("/v1", v1_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .merge(protected)
        .route("/", get(monitoring::index))
        .route("/health", get(monitoring::health))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    ApiError::NotFound(format!("Can't find {} on this server!", uri.path()))
}

/// Permissive CORS that still allows credentials.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
