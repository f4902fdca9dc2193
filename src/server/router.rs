use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{chat, function_call, health};
use crate::state::AppState;

/// Creates the application router.
///
/// - `POST /`: retrieval-grounded answer (the main pipeline)
/// - `POST /api/function-call`: the function-call router
/// - `GET /health`: liveness probe
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE]);

    Router::new()
        .route("/", post(chat::answer))
        .route("/api/function-call", post(function_call::function_call))
        .route("/health", get(health::health))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}
