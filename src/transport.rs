use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use crate::config::GeminiConfig;
use crate::error::{Result, ScriptError, truncate_chars};
use crate::models::{
    ApiVersion, GenerateContentRequest, GenerateContentResponse, ListModelsResponse,
    ModelDescriptor, ModelTarget,
};

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";
const BODY_PREVIEW_CHARS: usize = 240;
const LIST_PREVIEW_CHARS: usize = 200;

/// Where the API key travels on an outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// `x-goog-api-key` header. Primary transport.
    Header,
    /// `?key=` query parameter. Used for the single retry.
    QueryParam,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn generate_content(
        &self,
        target: &ModelTarget,
        body: &GenerateContentRequest,
        auth: AuthMode,
    ) -> Result<GenerateContentResponse>;

    async fn list_models(&self, version: ApiVersion) -> Result<Vec<ModelDescriptor>>;
}

pub struct GeminiTransport {
    client: Client,
    api_key: String,
    base_url: String,
    list_timeout: Duration,
}

impl GeminiTransport {
    /// Fails with a configuration error when no API key is set.
    pub fn new(cfg: &GeminiConfig) -> Result<Self> {
        let api_key = cfg.require_api_key()?.to_string();
        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            list_timeout: cfg.timeout(),
        })
    }

    fn generate_url(&self, target: &ModelTarget) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, target.version, target.model
        )
    }
}

#[async_trait]
impl Transport for GeminiTransport {
    async fn generate_content(
        &self,
        target: &ModelTarget,
        body: &GenerateContentRequest,
        auth: AuthMode,
    ) -> Result<GenerateContentResponse> {
        let version = target.version;
        tracing::info!(
            model = %target.model,
            %version,
            ?auth,
            "Calling Gemini generateContent"
        );

        let mut request = self
            .client
            .post(self.generate_url(target))
            .header("Content-Type", "application/json; charset=utf-8")
            .json(body);
        request = match auth {
            AuthMode::Header => request.header(API_KEY_HEADER, &self.api_key),
            AuthMode::QueryParam => request.query(&[("key", self.api_key.as_str())]),
        };

        let response = request
            .send()
            .await
            .map_err(|e| classify_reqwest_error(version, e))?;
        let (status, txt) = read_body(version, response).await?;

        if !status.is_success() {
            let message = serde_json::from_str::<GenerateContentResponse>(&txt)
                .ok()
                .and_then(|parsed| parsed.error)
                .and_then(|e| e.message);
            return Err(classify_status(version, status, message, &txt));
        }

        serde_json::from_str(&txt).map_err(|_| {
            ScriptError::Upstream(format!(
                "[{version}] Non-JSON response ({}): {}",
                status.as_u16(),
                truncate_chars(&txt, BODY_PREVIEW_CHARS)
            ))
        })
    }

    async fn list_models(&self, version: ApiVersion) -> Result<Vec<ModelDescriptor>> {
        tracing::info!(%version, "Listing Gemini models");
        let request = self
            .client
            .get(format!("{}/{}/models", self.base_url, version))
            .query(&[("key", self.api_key.as_str())])
            .send();
        let (status, txt) = tokio::time::timeout(self.list_timeout, async {
            let response = request
                .await
                .map_err(|e| classify_reqwest_error(version, e))?;
            read_body(version, response).await
        })
        .await
        .map_err(|_| {
            ScriptError::Timeout(format!(
                "[{version}] Model listing aborted after {}s",
                self.list_timeout.as_secs()
            ))
        })??;

        if !status.is_success() {
            let message = serde_json::from_str::<GenerateContentResponse>(&txt)
                .ok()
                .and_then(|parsed| parsed.error)
                .and_then(|e| e.message);
            return Err(classify_status(version, status, message, &txt));
        }

        let json: serde_json::Value = serde_json::from_str(&txt).map_err(|_| {
            ScriptError::Upstream(format!(
                "[{version}] Non-JSON response: {}",
                truncate_chars(&txt, LIST_PREVIEW_CHARS)
            ))
        })?;
        let listing: ListModelsResponse = serde_json::from_value(json).map_err(|e| {
            ScriptError::Upstream(format!("[{version}] Unexpected listModels structure: {e}"))
        })?;
        Ok(listing.models)
    }
}

async fn read_body(version: ApiVersion, response: Response) -> Result<(StatusCode, String)> {
    let status = response.status();
    let txt = response
        .text()
        .await
        .map_err(|e| classify_reqwest_error(version, e))?;
    Ok((status, txt))
}

fn classify_reqwest_error(version: ApiVersion, e: reqwest::Error) -> ScriptError {
    if e.is_timeout() {
        ScriptError::Timeout(format!("[{version}] Request timed out: {e}"))
    } else {
        ScriptError::Transport(format!("[{version}] Network failure: {e}"))
    }
}

/// Maps a non-2xx status to an error kind. The body need not be JSON:
/// `message` is the upstream `error.message` when one could be read.
fn classify_status(
    version: ApiVersion,
    status: StatusCode,
    message: Option<String>,
    raw: &str,
) -> ScriptError {
    let message = message.unwrap_or_else(|| {
        let preview = truncate_chars(raw.trim(), BODY_PREVIEW_CHARS);
        if preview.is_empty() {
            "Request failed (empty body)".to_string()
        } else {
            format!("Request failed: {preview}")
        }
    });
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ScriptError::Auth(format!("[{version}] {} {message}", status.as_u16()))
        }
        StatusCode::NOT_FOUND => {
            ScriptError::ModelNotFound(format!("[{version}] 404 {message}"))
        }
        _ => ScriptError::Upstream(format!("[{version}] {} {message}", status.as_u16())),
    }
}
