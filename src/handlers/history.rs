use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{ApiError, ApiResult, AppState, parse_json};

#[derive(Debug, Deserialize)]
pub struct LikeBody {
    pub like: bool,
}

/// GET /api/history
pub async fn list_history(State(state): State<AppState>) -> ApiResult {
    let history = state.history.list().await?;
    Ok(Json(json!({ "ok": true, "history": history })))
}

/// DELETE /api/history
pub async fn clear_history(State(state): State<AppState>) -> ApiResult {
    state.history.clear().await?;
    Ok(Json(json!({ "ok": true })))
}

/// GET /api/history/:id
pub async fn restore_entry(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    match state.history.restore(&id).await? {
        Some(entry) => Ok(Json(json!({ "ok": true, "entry": entry }))),
        None => Err(ApiError::new(StatusCode::NOT_FOUND, format!("history entry {id} not found"))),
    }
}

/// POST /api/history/:id/like
pub async fn like_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult {
    let payload: LikeBody = parse_json(&headers, &body)?;
    if !state.history.set_like(&id, payload.like).await? {
        return Err(ApiError::new(StatusCode::NOT_FOUND, format!("history entry {id} not found")));
    }
    Ok(Json(json!({ "ok": true, "id": id, "like": payload.like })))
}
