//! Configuration loading, validation, and management for Minuta.
//!
//! Loads configuration from `~/.minuta/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use minuta_core::ModelInfo;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.minuta/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Drafting backend connection
    #[serde(default)]
    pub service: ServiceConfig,

    /// Court system settings
    #[serde(default)]
    pub eproc: EprocConfig,

    /// Candidate list presentation
    #[serde(default)]
    pub candidates: CandidatesConfig,

    /// Generation requests and model selection
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the drafting backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for movement and piece fetches
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".into()
}
fn default_fetch_timeout() -> u64 {
    60
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EprocConfig {
    /// Court system identifier sent with every fetch
    #[serde(default = "default_system_id")]
    pub system_id: String,
}

fn default_system_id() -> String {
    "br.jus.jfrj.eproc".into()
}

impl Default for EprocConfig {
    fn default() -> Self {
        Self {
            system_id: default_system_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatesConfig {
    /// Rows per candidate page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    10
}

impl Default for CandidatesConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Upper bound on a generation or adjustment request
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,

    /// Model used when the service cannot tell us its default
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Conversion rate for USD cost figures
    #[serde(default = "default_usd_to_brl")]
    pub usd_to_brl: f64,

    /// Models offered when the service's model list is unavailable
    #[serde(default = "default_fallback_models")]
    pub fallback_models: Vec<ModelInfo>,
}

fn default_generation_timeout() -> u64 {
    300
}
fn default_model() -> String {
    "gemini-2.5-pro".into()
}
fn default_usd_to_brl() -> f64 {
    5.5
}
fn default_fallback_models() -> Vec<ModelInfo> {
    vec![
        ModelInfo::new("gemini-2.5-pro", "Gemini 2.5 Pro (Google)"),
        ModelInfo::new("gemini-2.5-flash", "Gemini 2.5 Flash (Google)"),
        ModelInfo::new("claude-sonnet-4-20250514", "Claude Sonnet 4 (Anthropic)"),
        ModelInfo::new("claude-3-7-sonnet-20250219", "Claude Sonnet 3.7 (Anthropic)"),
        ModelInfo::new("o3-2025-04-16", "O3 (OpenAI)"),
        ModelInfo::new("o4-mini-2025-04-16", "O4 Mini (OpenAI)"),
    ]
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_generation_timeout(),
            default_model: default_model(),
            usd_to_brl: default_usd_to_brl(),
            fallback_models: default_fallback_models(),
        }
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ServiceConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.minuta/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `MINUTA_BASE_URL`
    /// - `MINUTA_SYSTEM_ID`
    /// - `MINUTA_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(base_url) = std::env::var("MINUTA_BASE_URL") {
            config.service.base_url = base_url;
        }
        if let Ok(system_id) = std::env::var("MINUTA_SYSTEM_ID") {
            config.eproc.system_id = system_id;
        }
        if let Ok(model) = std::env::var("MINUTA_MODEL") {
            config.generation.default_model = model;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".minuta")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = &self.service.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "service.base_url must be an http(s) URL, got {base_url:?}"
            )));
        }

        if self.eproc.system_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "eproc.system_id must not be empty".into(),
            ));
        }

        if self.candidates.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "candidates.page_size must be > 0".into(),
            ));
        }

        if self.service.fetch_timeout_secs == 0 || self.generation.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeouts must be > 0 seconds".into(),
            ));
        }

        if self.generation.usd_to_brl <= 0.0 {
            return Err(ConfigError::ValidationError(
                "generation.usd_to_brl must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.eproc.system_id, "br.jus.jfrj.eproc");
        assert_eq!(config.candidates.page_size, 10);
        assert_eq!(config.generation.timeout(), Duration::from_secs(300));
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.service.base_url, config.service.base_url);
        assert_eq!(
            parsed.generation.fallback_models.len(),
            config.generation.fallback_models.len()
        );
    }

    #[test]
    fn zero_page_size_rejected() {
        let mut config = AppConfig::default();
        config.candidates.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_http_base_url_rejected() {
        let mut config = AppConfig::default();
        config.service.base_url = "ftp://example.org".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.generation.default_model, "gemini-2.5-pro");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[service]
base_url = "https://minutas.example.jus.br"

[candidates]
page_size = 25

[[generation.fallback_models]]
id = "local-model"
name = "Local"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.service.base_url, "https://minutas.example.jus.br");
        assert_eq!(config.service.fetch_timeout_secs, 60);
        assert_eq!(config.candidates.page_size, 25);
        assert_eq!(config.generation.fallback_models.len(), 1);
        assert_eq!(config.generation.fallback_models[0].id, "local-model");
        assert_eq!(config.eproc.system_id, "br.jus.jfrj.eproc");
    }

    #[test]
    fn invalid_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "candidates = 3").unwrap();

        match AppConfig::load_from(&path) {
            Err(ConfigError::ParseError { .. }) => {}
            other => panic!("Expected ParseError, got: {other:?}"),
        }
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("br.jus.jfrj.eproc"));
        assert!(toml_str.contains("gemini-2.5-pro"));
    }

    #[test]
    fn fallback_models_serialize_to_json() {
        let json = serde_json::to_string(&GenerationConfig::default().fallback_models).unwrap();
        assert!(json.contains("o4-mini-2025-04-16"));
    }
}
