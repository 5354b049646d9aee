use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScriptError;

pub const MIN_DURATION_SECONDS: u32 = 10;
pub const MAX_DURATION_SECONDS: u32 = 90;
pub const DEFAULT_DURATION_SECONDS: u32 = 30;

/// Content style that steers the generation instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    #[serde(alias = "educativo")]
    Educational,
    Humor,
    #[serde(alias = "autoridade")]
    Authority,
    #[serde(alias = "emocional")]
    Emotional,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Educational => "educational",
            Tone::Humor => "humor",
            Tone::Authority => "authority",
            Tone::Emotional => "emotional",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "educational" | "educativo" => Ok(Tone::Educational),
            "humor" => Ok(Tone::Humor),
            "authority" | "autoridade" => Ok(Tone::Authority),
            "emotional" | "emocional" => Ok(Tone::Emotional),
            other => Err(ScriptError::Validation(format!(
                "tone: expected one of educational, humor, authority, emotional (got '{other}')"
            ))),
        }
    }
}

/// A short-video concept to turn into a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub topic: String,
    pub duration_seconds: u32,
    pub tone: Tone,
    pub persona: String,
}

impl GenerationRequest {
    pub fn new(
        topic: impl Into<String>,
        duration_seconds: u32,
        tone: Tone,
        persona: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            duration_seconds,
            tone,
            persona: persona.into(),
        }
    }

    /// Same request with a different topic, used by variations and titles.
    pub fn with_topic(&self, topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..self.clone()
        }
    }
}

/// Gemini API version namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ApiVersion {
    #[default]
    #[serde(rename = "v1")]
    V1,
    #[serde(rename = "v1beta")]
    V1Beta,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V1Beta => "v1beta",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v1" => Ok(ApiVersion::V1),
            "v1beta" => Ok(ApiVersion::V1Beta),
            other => Err(ScriptError::Config(format!(
                "unsupported API version '{other}' (expected v1 or v1beta)"
            ))),
        }
    }
}

/// Strips the `models/` prefix the listing endpoint puts on model names.
pub fn normalize_model(name: &str) -> String {
    let trimmed = name.trim();
    match trimmed.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("models/") => trimmed[7..].to_string(),
        _ => trimmed.to_string(),
    }
}

/// Model + namespace a call is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTarget {
    pub model: String,
    pub version: ApiVersion,
}

impl ModelTarget {
    pub fn new(model: &str, version: ApiVersion) -> Self {
        Self {
            model: normalize_model(model),
            version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model: String,
    pub api_version: ApiVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Normal,
    Variation,
}

/// A persisted generation, newest first in the history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub kind: ItemKind,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub values: GenerationRequest,
    #[serde(rename = "roteiro")]
    pub script: String,
    #[serde(default)]
    pub like: Option<bool>,
}

impl HistoryEntry {
    pub fn new(kind: ItemKind, values: GenerationRequest, script: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            created_at: chrono::Utc::now().timestamp_millis(),
            values,
            script,
            like: None,
        }
    }
}

// Gemini generateContent request format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }

    pub fn prompt_text(&self) -> Option<&str> {
        self.contents
            .first()
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// Gemini generateContent response format
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

impl GenerateContentResponse {
    #[cfg(test)]
    pub fn with_text(text: &str) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part {
                        text: Some(text.to_string()),
                    }],
                }),
            }],
            error: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Entry of the models listing endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_generation_methods: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListModelsResponse {
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelListing {
    pub version: ApiVersion,
    pub models: Vec<ModelDescriptor>,
}
