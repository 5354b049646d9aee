use std::sync::Arc;
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::{Result, ScriptError};
use crate::models::{
    ApiVersion, GenerateContentRequest, GenerateContentResponse, GenerationRequest,
    GenerationResult, ModelTarget,
};
use crate::prompt;
use crate::transport::{AuthMode, Transport};
use crate::validation::InputValidator;

/// Turns validated requests into scripts through a [`Transport`].
///
/// Stateless across calls: safe to share behind an `Arc` and call concurrently.
pub struct GenerationProxy {
    tx: Arc<dyn Transport>,
    target: ModelTarget,
    timeout: Duration,
    validator: InputValidator,
}

impl GenerationProxy {
    pub fn new(tx: Arc<dyn Transport>, cfg: &GeminiConfig) -> Self {
        Self {
            tx,
            target: ModelTarget::new(&cfg.model, cfg.api_version),
            timeout: cfg.timeout(),
            validator: InputValidator::new(),
        }
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.tx
    }

    /// Generates one script.
    ///
    /// A timeout or network failure on the header-authenticated attempt is
    /// retried exactly once with the key in the query string. The retry gets
    /// its own deadline window.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        self.validator.validate_request(request)?;

        let version = self.target.version;
        tracing::info!(
            model = %self.target.model,
            %version,
            duration = request.duration_seconds,
            tone = %request.tone,
            "Generating script"
        );

        let body = GenerateContentRequest::from_prompt(&prompt::render_script_prompt(request));

        let response = match self.attempt(&body, AuthMode::Header).await {
            Ok(response) => response,
            Err(e) if e.is_retryable() => {
                tracing::warn!("First attempt failed ({}), retrying with query-param auth", e);
                self.attempt(&body, AuthMode::QueryParam).await.inspect_err(|e| {
                    tracing::error!("Retry with query-param auth failed: {}", e);
                })?
            }
            Err(e) => {
                tracing::error!("Generation failed: {}", e);
                return Err(e);
            }
        };

        let text = extract_text(&response, version)?;
        Ok(GenerationResult {
            text,
            model: self.target.model.clone(),
            api_version: version,
        })
    }

    /// Five titles and fifteen hashtags for an already generated script.
    pub async fn generate_titles_and_hashtags(
        &self,
        base: &GenerationRequest,
        script: &str,
    ) -> Result<GenerationResult> {
        if script.trim().is_empty() {
            return Err(ScriptError::Validation(
                "roteiro: generate a script first".to_string(),
            ));
        }
        let request = base.with_topic(prompt::titles_and_hashtags_topic(script));
        self.generate(&request).await
    }

    async fn attempt(
        &self,
        body: &GenerateContentRequest,
        auth: AuthMode,
    ) -> Result<GenerateContentResponse> {
        let call = self.tx.generate_content(&self.target, body, auth);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ScriptError::Timeout(format!(
                "[{}] Request aborted after {}s",
                self.target.version,
                self.timeout.as_secs()
            ))),
        }
    }
}

/// First text part of the first candidate.
fn extract_text(response: &GenerateContentResponse, version: ApiVersion) -> Result<String> {
    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| ScriptError::Upstream(format!("[{version}] Unexpected response structure.")))?;

    let text = candidate
        .content
        .as_ref()
        .and_then(|c| c.parts.first())
        .and_then(|p| p.text.as_deref())
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ScriptError::Upstream(format!("[{version}] No text found in response.")))?;

    Ok(text.to_string())
}
