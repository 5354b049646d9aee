use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use super::ApiError;

/// Bearer token check. Clients that cannot set headers may pass
/// `access_token` or `token` in the query string.
pub async fn require_bearer(
    State(expected): State<Arc<String>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.uri().path() == "/health" {
        return next.run(req).await;
    }
    let headers: &HeaderMap = req.headers();
    let header_ok = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", expected.as_str()));
    let query_ok = req.uri().query().is_some_and(|q| {
        q.split('&').filter_map(|pair| pair.split_once('=')).any(|(k, v)| {
            (k == "access_token" || k == "token") && v == expected.as_str()
        })
    });

    if !(header_ok || query_ok) {
        tracing::warn!(path = %req.uri().path(), "Rejected unauthenticated request");
        return ApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    next.run(req).await
}
