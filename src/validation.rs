use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, ScriptError};
use crate::models::{GenerationRequest, MAX_DURATION_SECONDS, MIN_DURATION_SECONDS, Tone};

const MIN_TEXT_CHARS: usize = 2;

/// Inbound request as received over the wire, before any type guarantees.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGenerationRequest {
    #[serde(default)]
    pub topic: Option<Value>,
    #[serde(default)]
    pub duration_seconds: Option<Value>,
    #[serde(default)]
    pub tone: Option<Value>,
    #[serde(default)]
    pub persona: Option<Value>,
}

/// Field-level validation for generation requests.
#[derive(Debug, Clone, Default)]
pub struct InputValidator;

impl InputValidator {
    pub fn new() -> Self {
        Self
    }

    /// Converts a loosely-typed request, reporting every failing field at once.
    pub fn validate_raw(&self, raw: &RawGenerationRequest) -> Result<GenerationRequest> {
        let mut issues: Vec<String> = Vec::new();

        let topic = self.text_field("topic", raw.topic.as_ref(), &mut issues);
        let persona = self.text_field("persona", raw.persona.as_ref(), &mut issues);

        let duration_seconds = match raw.duration_seconds.as_ref() {
            Some(Value::Number(n)) => match n.as_u64() {
                Some(v) => {
                    if let Some(msg) = duration_issue(v) {
                        issues.push(format!("durationSeconds: {msg}"));
                    }
                    v as u32
                }
                None => {
                    issues.push("durationSeconds: expected an integer".to_string());
                    0
                }
            },
            Some(_) => {
                issues.push("durationSeconds: expected a number".to_string());
                0
            }
            None => {
                issues.push("durationSeconds: required".to_string());
                0
            }
        };

        let tone = match raw.tone.as_ref() {
            Some(Value::String(s)) => match s.parse::<Tone>() {
                Ok(t) => t,
                Err(ScriptError::Validation(msg)) => {
                    issues.push(msg);
                    Tone::default()
                }
                Err(e) => return Err(e),
            },
            Some(_) => {
                issues.push("tone: expected a string".to_string());
                Tone::default()
            }
            None => {
                issues.push("tone: required".to_string());
                Tone::default()
            }
        };

        if !issues.is_empty() {
            return Err(ScriptError::Validation(issues.join(" | ")));
        }

        Ok(GenerationRequest {
            topic,
            duration_seconds,
            tone,
            persona,
        })
    }

    /// Checks an already-typed request.
    pub fn validate_request(&self, request: &GenerationRequest) -> Result<()> {
        let mut issues: Vec<String> = Vec::new();
        if let Some(msg) = text_issue(&request.topic) {
            issues.push(format!("topic: {msg}"));
        }
        if let Some(msg) = duration_issue(u64::from(request.duration_seconds)) {
            issues.push(format!("durationSeconds: {msg}"));
        }
        if let Some(msg) = text_issue(&request.persona) {
            issues.push(format!("persona: {msg}"));
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ScriptError::Validation(issues.join(" | ")))
        }
    }

    fn text_field(&self, name: &str, value: Option<&Value>, issues: &mut Vec<String>) -> String {
        match value {
            Some(Value::String(s)) => {
                if let Some(msg) = text_issue(s) {
                    issues.push(format!("{name}: {msg}"));
                }
                s.clone()
            }
            Some(_) => {
                issues.push(format!("{name}: expected a string"));
                String::new()
            }
            None => {
                issues.push(format!("{name}: required"));
                String::new()
            }
        }
    }
}

fn text_issue(value: &str) -> Option<&'static str> {
    (value.trim().chars().count() < MIN_TEXT_CHARS).then_some("too short (minimum 2 characters)")
}

fn duration_issue(value: u64) -> Option<&'static str> {
    if value < u64::from(MIN_DURATION_SECONDS) {
        Some("minimum 10s")
    } else if value > u64::from(MAX_DURATION_SECONDS) {
        Some("maximum 90s")
    } else {
        None
    }
}
