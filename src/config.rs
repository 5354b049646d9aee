use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, ScriptError};
use crate::models::{ApiVersion, normalize_model};
use crate::transport::GEMINI_API_URL;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
pub const DEFAULT_HISTORY_MAX: usize = 200;

/// Main configuration structure for the script service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub bind: String,
    /// Optional bearer token guarding every route except /health
    pub bearer_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "reel-scripts".to_string(),
            bind: "127.0.0.1:8787".to_string(),
            bearer_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_version: ApiVersion,
    pub base_url: String,
    /// Per-attempt deadline in seconds
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            api_version: ApiVersion::default(),
            base_url: GEMINI_API_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl GeminiConfig {
    pub fn require_api_key(&self) -> Result<&str> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(ScriptError::Config("GEMINI_API_KEY not configured".to_string()));
        }
        Ok(key)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub path: String,
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: "history.json".to_string(),
            max_entries: DEFAULT_HISTORY_MAX,
        }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a config; problems are logged, the API key is checked later
    pub fn load() -> Self {
        let env_paths = ["../.env", ".env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
            }
        }

        if !env_loaded {
            tracing::warn!("No .env file found - continuing with env vars only");
        }

        let config_path =
            env::var("SCRIPTS_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::info!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Gemini overrides
        if let Some(api_key) = lookup("GEMINI_API_KEY") {
            self.gemini.api_key = api_key.trim().to_string();
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            if !model.trim().is_empty() {
                self.gemini.model = model;
            }
        }
        if let Some(version) = lookup("GEMINI_API_VERSION") {
            match version.parse() {
                Ok(v) => self.gemini.api_version = v,
                Err(e) => tracing::warn!("Ignoring GEMINI_API_VERSION: {}", e),
            }
        }
        if let Some(base_url) = lookup("GEMINI_BASE_URL") {
            self.gemini.base_url = base_url;
        }
        if let Some(timeout) = lookup("GEMINI_TIMEOUT_SECONDS") {
            if let Ok(secs) = timeout.parse() {
                self.gemini.timeout_seconds = secs;
            }
        }

        // Server overrides
        if let Some(bind) = lookup("SCRIPTS_HTTP_BIND") {
            self.server.bind = bind;
        }
        if let Some(token) = lookup("SCRIPTS_BEARER_TOKEN") {
            if !token.is_empty() {
                self.server.bearer_token = Some(token);
            }
        }

        // History overrides
        if let Some(path) = lookup("SCRIPTS_HISTORY_PATH") {
            self.history.path = path;
        }
        if let Some(max) = lookup("SCRIPTS_HISTORY_MAX") {
            if let Ok(n) = max.parse() {
                self.history.max_entries = n;
            }
        }

        self.gemini.model = normalize_model(&self.gemini.model);
    }

    /// Validate configuration
    fn validate(&self) -> std::result::Result<(), Box<dyn std::error::Error>> {
        if self.gemini.timeout_seconds == 0 {
            return Err("Gemini timeout_seconds cannot be 0".into());
        }
        if self.history.max_entries == 0 {
            return Err("History max_entries cannot be 0".into());
        }
        self.gemini.require_api_key()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_service_expectations() {
        let cfg = Config::default();
        assert_eq!(cfg.gemini.model, "gemini-2.5-flash");
        assert_eq!(cfg.gemini.api_version, ApiVersion::V1);
        assert_eq!(cfg.gemini.timeout(), Duration::from_secs(60));
        assert_eq!(cfg.history.max_entries, 200);
        assert!(cfg.gemini.require_api_key().is_err());
    }

    #[test]
    fn env_overrides_apply_and_normalize_model() {
        let mut cfg = Config::default();
        cfg.apply_overrides(lookup_from(&[
            ("GEMINI_API_KEY", " secret "),
            ("GEMINI_MODEL", "models/gemini-2.0-pro"),
            ("GEMINI_API_VERSION", "v1beta"),
            ("SCRIPTS_HISTORY_MAX", "50"),
            ("SCRIPTS_BEARER_TOKEN", "tok"),
        ]));
        assert_eq!(cfg.gemini.api_key, "secret");
        assert_eq!(cfg.gemini.model, "gemini-2.0-pro");
        assert_eq!(cfg.gemini.api_version, ApiVersion::V1Beta);
        assert_eq!(cfg.history.max_entries, 50);
        assert_eq!(cfg.server.bearer_token.as_deref(), Some("tok"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn invalid_version_keeps_default() {
        let mut cfg = Config::default();
        cfg.apply_overrides(lookup_from(&[("GEMINI_API_VERSION", "v3")]));
        assert_eq!(cfg.gemini.api_version, ApiVersion::V1);
    }

    #[test]
    fn yaml_layer_fills_missing_sections_with_defaults() {
        let cfg: Config = serde_yaml::from_str("gemini:\n  model: gemini-2.5-pro\n  api_version: v1beta\n")
            .expect("yaml should parse");
        assert_eq!(cfg.gemini.model, "gemini-2.5-pro");
        assert_eq!(cfg.gemini.api_version, ApiVersion::V1Beta);
        assert_eq!(cfg.gemini.timeout_seconds, 60);
        assert_eq!(cfg.server.bind, "127.0.0.1:8787");
    }
}
