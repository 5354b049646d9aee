use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{ApiError, ApiResult, AppState, parse_json};
use crate::chat::{parse_chat, wants_variations};
use crate::models::{HistoryEntry, ItemKind};
use crate::variations::generate_variations;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub text: String,
}

/// POST /api/chat
///
/// Parses the message into a request, then runs a single generation or,
/// when the message asks for three variations, a variation batch.
pub async fn chat(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult {
    let payload: ChatBody = parse_json(&headers, &body)?;
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "text: message is empty"));
    }

    let request = parse_chat(text);
    tracing::info!(
        duration = request.duration_seconds,
        tone = %request.tone,
        "Chat message parsed"
    );

    if wants_variations(text) {
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
        return Ok(Json(json!({
            "ok": true,
            "values": request,
            "variations": scripts,
        })));
    }

    let result = state.proxy.generate(&request).await?;
    state
        .record(vec![HistoryEntry::new(
            ItemKind::Normal,
            request.clone(),
            result.text.clone(),
        )])
        .await;

    Ok(Json(json!({
        "ok": true,
        "values": request,
        "model": result.model,
        "version": result.api_version,
        "roteiro": result.text,
    })))
}
