use axum::Json;
use axum::extract::State;
use serde_json::json;

use super::{ApiResult, AppState};
use crate::discovery::discover_models;

/// GET /api/gemini-models
pub async fn list_models(State(state): State<AppState>) -> ApiResult {
    let listings = discover_models(state.proxy.transport().as_ref()).await?;
    Ok(Json(json!({ "ok": true, "data": listings })))
}
