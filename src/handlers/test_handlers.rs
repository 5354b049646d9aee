use super::*;
use crate::error::ScriptError;
use crate::history::MemoryStore;
use crate::models::GenerateContentResponse;
use crate::models::{ApiVersion, ItemKind, ModelDescriptor};
use crate::proxy::testing::{ScriptedTransport, Step, test_config};
use crate::transport::{MockTransport, Transport};

use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

fn app_with(tx: ScriptedTransport, bearer: Option<&str>) -> (Router, Arc<History>) {
    app_with_transport(Arc::new(tx), bearer)
}

fn app_with_transport(tx: Arc<dyn Transport>, bearer: Option<&str>) -> (Router, Arc<History>) {
    let proxy = Arc::new(GenerationProxy::new(tx, &test_config()));
    let history = Arc::new(History::new(Arc::new(MemoryStore::default()), 200));
    let state = AppState::new(proxy, history.clone());
    (router(state, bearer.map(str::to_string)), history)
}

fn echo_transport() -> ScriptedTransport {
    ScriptedTransport::new(|body, _| {
        let topic = body
            .prompt_text()
            .unwrap_or_default()
            .lines()
            .find_map(|l| l.strip_prefix("TOPIC: "))
            .unwrap_or_default()
            .to_string();
        Step::Reply(Ok(GenerateContentResponse::with_text(&format!("HOOK: {topic}"))))
    })
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

fn valid_body() -> Value {
    serde_json::json!({
        "topic": "Peixe-leão é praga no Brasil",
        "durationSeconds": 30,
        "tone": "educational",
        "persona": "curiosos de biologia"
    })
}

#[tokio::test]
async fn generate_returns_script_and_records_history() {
    let (app, history) = app_with(echo_transport(), None);

    let response = app
        .oneshot(json_post("/api/generate", valid_body()))
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["roteiro"], "HOOK: Peixe-leão é praga no Brasil");
    assert_eq!(body["model"], "gemini-2.5-flash");
    assert_eq!(body["version"], "v1");

    let entries = history.list().await.expect("history");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].script, "HOOK: Peixe-leão é praga no Brasil");
}

#[tokio::test]
async fn generate_rejects_non_json_content_type() {
    let (app, _) = app_with(echo_transport(), None);
    let request = Request::builder()
        .method("POST")
        .uri("/api/generate")
        .header("content-type", "text/plain")
        .body(Body::from("hello"))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(read_json(response).await["ok"], false);
}

#[tokio::test]
async fn generate_reports_field_errors() {
    let (app, history) = app_with(echo_transport(), None);
    let response = app
        .oneshot(json_post(
            "/api/generate",
            serde_json::json!({ "topic": "x", "durationSeconds": 5, "tone": "humor", "persona": "pais" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(
        body["error"],
        "topic: too short (minimum 2 characters) | durationSeconds: minimum 10s"
    );
    assert!(history.list().await.expect("history").is_empty());
}

#[tokio::test]
async fn generate_get_is_method_not_allowed() {
    let (app, _) = app_with(echo_transport(), None);
    let request = Request::builder()
        .uri("/api/generate")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()["allow"], "POST");
}

#[tokio::test]
async fn auth_failure_maps_to_401() {
    let tx = ScriptedTransport::new(|_, _| {
        Step::Reply(Err(ScriptError::Auth("[v1] 401 API key not valid".into())))
    });
    let (app, _) = app_with(tx, None);
    let response = app
        .oneshot(json_post("/api/generate", valid_body()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["error"], "[v1] 401 API key not valid");
}

#[tokio::test]
async fn variations_return_in_order() {
    let (app, history) = app_with(echo_transport(), None);
    let response = app
        .oneshot(json_post("/api/variations", valid_body()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let variations = body["variations"].as_array().expect("array");
    assert_eq!(variations.len(), 3);
    assert_eq!(variations[0], "HOOK: Peixe-leão é praga no Brasil (variation 1)");
    assert_eq!(variations[2], "HOOK: Peixe-leão é praga no Brasil (variation 3)");

    let entries = history.list().await.expect("history");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].kind, ItemKind::Variation);
}

#[tokio::test]
async fn chat_parses_then_generates() {
    let (app, _) = app_with(echo_transport(), None);
    let response = app
        .oneshot(json_post(
            "/api/chat",
            serde_json::json!({
                "text": "gera um roteiro de 30s, tom humor, para mães de primeira viagem, tema: rotina da manhã"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["values"]["topic"], "rotina da manhã");
    assert_eq!(body["values"]["tone"], "humor");
    assert_eq!(body["values"]["persona"], "mães de primeira viagem");
    assert_eq!(body["roteiro"], "HOOK: rotina da manhã");
}

#[tokio::test]
async fn chat_asking_for_three_variations_runs_a_batch() {
    let (app, history) = app_with(echo_transport(), None);
    let response = app
        .oneshot(json_post(
            "/api/chat",
            serde_json::json!({
                "text": "quero 3 variações de 45s, tom humor, para donos de pet, tema: passeio no parque"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["values"]["topic"], "passeio no parque");
    assert_eq!(body["values"]["durationSeconds"], 45);
    assert!(body.get("roteiro").is_none());
    let variations = body["variations"].as_array().expect("array");
    assert_eq!(variations.len(), 3);
    assert_eq!(variations[0], "HOOK: passeio no parque (variation 1)");
    assert_eq!(variations[2], "HOOK: passeio no parque (variation 3)");

    let entries = history.list().await.expect("history");
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.kind == ItemKind::Variation));
}

#[tokio::test]
async fn gemini_models_lists_both_namespaces() {
    let mut mock = MockTransport::new();
    mock.expect_list_models().returning(|version| match version {
        ApiVersion::V1 => Ok(vec![ModelDescriptor {
            name: "models/gemini-2.5-flash".to_string(),
            display_name: Some("Gemini 2.5 Flash".to_string()),
            supported_generation_methods: Some(vec!["generateContent".to_string()]),
        }]),
        ApiVersion::V1Beta => Err(ScriptError::Auth("[v1beta] 403 Request failed: Forbidden".into())),
    });
    let (app, _) = app_with_transport(Arc::new(mock), None);

    let request = Request::builder()
        .uri("/api/gemini-models")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["ok"], true);
    let data = body["data"].as_array().expect("array");
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["version"], "v1");
    assert_eq!(data[0]["models"][0]["name"], "models/gemini-2.5-flash");
    assert_eq!(data[0]["models"][0]["displayName"], "Gemini 2.5 Flash");
}

#[tokio::test]
async fn titles_need_a_script() {
    let (app, _) = app_with(echo_transport(), None);
    let response = app
        .oneshot(json_post(
            "/api/titles",
            serde_json::json!({ "values": valid_body(), "roteiro": "" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn like_and_restore_history_entry() {
    let (app, history) = app_with(echo_transport(), None);
    app.clone()
        .oneshot(json_post("/api/generate", valid_body()))
        .await
        .expect("generate");
    let id = history.list().await.expect("history")[0].id.clone();

    let response = app
        .clone()
        .oneshot(json_post(
            &format!("/api/history/{id}/like"),
            serde_json::json!({ "like": false }),
        ))
        .await
        .expect("like");
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri(format!("/api/history/{id}"))
        .body(Body::empty())
        .expect("request");
    let body = read_json(app.clone().oneshot(request).await.expect("restore")).await;
    assert_eq!(body["entry"]["like"], false);

    let missing = app
        .oneshot(json_post("/api/history/nope/like", serde_json::json!({ "like": true })))
        .await
        .expect("missing");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bearer_token_guards_api_but_not_health() {
    let (app, _) = app_with(echo_transport(), Some("s3cret"));

    let health = Request::builder().uri("/health").body(Body::empty()).expect("request");
    let response = app.clone().oneshot(health).await.expect("health");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_post("/api/generate", valid_body()))
        .await
        .expect("unauthorized");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut authorized = json_post("/api/generate", valid_body());
    authorized
        .headers_mut()
        .insert("authorization", "Bearer s3cret".parse().expect("header value"));
    let response = app.clone().oneshot(authorized).await.expect("authorized");
    assert_eq!(response.status(), StatusCode::OK);

    let by_query = Request::builder()
        .uri("/api/history?token=s3cret")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(by_query).await.expect("query token");
    assert_eq!(response.status(), StatusCode::OK);
}
