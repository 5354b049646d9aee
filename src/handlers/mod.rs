/// HTTP handlers for the script generation API
pub mod auth;
pub mod chat;
pub mod generate;
pub mod history;
pub mod models;

#[cfg(test)]
mod test_handlers;

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

use crate::error::ScriptError;
use crate::history::History;
use crate::models::HistoryEntry;
use crate::proxy::GenerationProxy;
use crate::validation::InputValidator;

/// Shared state behind every route
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<GenerationProxy>,
    pub history: Arc<History>,
    pub validator: Arc<InputValidator>,
}

impl AppState {
    pub fn new(proxy: Arc<GenerationProxy>, history: Arc<History>) -> Self {
        Self {
            proxy,
            history,
            validator: Arc::new(InputValidator::new()),
        }
    }

    /// Recording is best effort: a storage failure never fails the generation.
    pub(crate) async fn record(&self, entries: Vec<HistoryEntry>) {
        if let Err(e) = self.history.record_many(entries).await {
            tracing::warn!("Failed to record history: {}", e);
        }
    }
}

/// Uniform `{ ok: false, error }` failure body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ScriptError> for ApiError {
    fn from(err: ScriptError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "ok": false, "error": self.message }))).into_response()
    }
}

pub type ApiResult = Result<Json<serde_json::Value>, ApiError>;

/// Decodes a JSON body, rejecting other content types.
pub(crate) fn parse_json<T: DeserializeOwned>(headers: &HeaderMap, body: &Bytes) -> Result<T, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_lowercase();
    if !content_type.contains("application/json") {
        return Err(ApiError::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Content-Type must be application/json",
        ));
    }
    serde_json::from_slice(body)
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "Invalid JSON body"))
}

pub fn router(state: AppState, bearer_token: Option<String>) -> Router {
    let mut router = Router::new()
        .route(
            "/api/generate",
            post(generate::generate)
                .get(generate::method_not_allowed)
                .options(generate::preflight),
        )
        .route("/api/variations", post(generate::variations))
        .route("/api/titles", post(generate::titles))
        .route("/api/chat", post(chat::chat))
        .route("/api/gemini-models", get(models::list_models))
        .route(
            "/api/history",
            get(history::list_history).delete(history::clear_history),
        )
        .route("/api/history/:id", get(history::restore_entry))
        .route("/api/history/:id/like", post(history::like_entry))
        .with_state(state);

    if let Some(expected) = bearer_token {
        router = router.layer(middleware::from_fn_with_state(
            Arc::new(expected),
            auth::require_bearer,
        ));
    }

    router.route("/health", get(|| async { "ok" }))
}
