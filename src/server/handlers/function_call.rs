use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::state::AppState;
use crate::tools::route_function_call;

#[derive(Debug, Deserialize)]
pub struct FunctionCallBody {
    pub message: String,
}

/// Always responds 200: the router converts every failure into a
/// structured `{"error": …}` payload.
pub async fn function_call(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FunctionCallBody>,
) -> Json<Value> {
    Json(route_function_call(state.as_ref(), &body.message).await)
}
