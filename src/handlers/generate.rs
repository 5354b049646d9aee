use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use super::{ApiError, ApiResult, AppState, parse_json};
use crate::models::{HistoryEntry, ItemKind};
use crate::validation::RawGenerationRequest;
use crate::variations::generate_variations;

#[derive(Debug, Deserialize)]
pub struct TitlesBody {
    pub values: RawGenerationRequest,
    #[serde(rename = "roteiro", alias = "script", default)]
    pub script: String,
}

/// POST /api/generate
pub async fn generate(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult {
    let raw: RawGenerationRequest = parse_json(&headers, &body)?;
    let request = state.validator.validate_raw(&raw)?;

    let result = state.proxy.generate(&request).await?;
    state
        .record(vec![HistoryEntry::new(
            ItemKind::Normal,
            request,
            result.text.clone(),
        )])
        .await;

    Ok(Json(json!({
        "ok": true,
        "model": result.model,
        "version": result.api_version,
        "roteiro": result.text,
    })))
}

/// GET /api/generate
pub async fn method_not_allowed() -> Response {
    let mut response = ApiError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        "Use POST on /api/generate with a valid JSON body.",
    )
    .into_response();
    response
        .headers_mut()
        .insert(header::ALLOW, header::HeaderValue::from_static("POST"));
    response
}

/// OPTIONS /api/generate
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// POST /api/variations
pub async fn variations(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult {
    let raw: RawGenerationRequest = parse_json(&headers, &body)?;
    let request = state.validator.validate_raw(&raw)?;

    let variations = generate_variations(&state.proxy, &request).await?;
    state
        .record(
            variations
                .iter()
                .map(|v| HistoryEntry::new(ItemKind::Variation, v.request.clone(), v.result.text.clone()))
                .collect(),
        )
        .await;

    let scripts: Vec<&str> = variations.iter().map(|v| v.result.text.as_str()).collect();
    Ok(Json(json!({ "ok": true, "variations": scripts })))
}

/// POST /api/titles
pub async fn titles(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult {
    let payload: TitlesBody = parse_json(&headers, &body)?;
    let request = state.validator.validate_raw(&payload.values)?;

    let result = state
        .proxy
        .generate_titles_and_hashtags(&request, &payload.script)
        .await?;
    Ok(Json(json!({
        "ok": true,
        "model": result.model,
        "version": result.api_version,
        "roteiro": result.text,
    })))
}
