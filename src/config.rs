use crate::constants;
use crate::error::{LeadError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub pipeline: PipelineConfig,
    pub server: ServerConfig,
}

/// What to do with a lead when the model backend itself fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendErrorPolicy {
    /// Fail the whole run
    #[default]
    Abort,
    /// Substitute the fallback enrichment for that lead and keep going
    Fallback,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub timeout_seconds: u64,
    pub on_backend_error: BackendErrorPolicy,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_MODEL_URL.to_string(),
            model: constants::DEFAULT_MODEL.to_string(),
            api_key_env: constants::DEFAULT_API_KEY_ENV.to_string(),
            timeout_seconds: constants::DEFAULT_TIMEOUT_SECONDS,
            on_backend_error: BackendErrorPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub cleaned_file: String,
    pub output_file: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cleaned_file: constants::DEFAULT_CLEANED_FILE.to_string(),
            output_file: constants::DEFAULT_OUTPUT_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub upload_dir: String,
    pub output_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: constants::DEFAULT_PORT,
            upload_dir: constants::DEFAULT_UPLOAD_DIR.to_string(),
            output_dir: constants::DEFAULT_OUTPUT_DIR.to_string(),
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file doesn't exist,
    /// then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                LeadError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            Self::from_toml(&content)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.model.timeout_seconds == 0 {
            return Err(LeadError::Config(
                "model.timeout_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(model) = std::env::var(constants::ENV_MODEL) {
            if !model.trim().is_empty() {
                self.model.model = model.trim().to_string();
            }
        }
        if let Ok(url) = std::env::var(constants::ENV_MODEL_URL) {
            if !url.trim().is_empty() {
                self.model.base_url = url.trim().to_string();
            }
        }
        if let Ok(port) = std::env::var(constants::ENV_PORT) {
            self.server.port = port.trim().parse().map_err(|_| {
                LeadError::Config(format!("{} is not a valid port: {}", constants::ENV_PORT, port))
            })?;
        }
        Ok(())
    }

    /// Read the API key from the environment variable named in the config.
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.model.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(LeadError::Config(format!(
                "environment variable {} is not set",
                self.model.api_key_env
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.model.model, "gemini-2.5-flash");
        assert_eq!(config.model.timeout_seconds, 60);
        assert_eq!(config.model.on_backend_error, BackendErrorPolicy::Abort);
        assert_eq!(config.pipeline.output_file, "output_enriched_leads.json");
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = Config::from_toml(
            r#"
            [model]
            timeout_seconds = 15
            on_backend_error = "fallback"

            [server]
            upload_dir = "/tmp/uploads"
            "#,
        )
        .unwrap();
        assert_eq!(config.model.timeout_seconds, 15);
        assert_eq!(config.model.on_backend_error, BackendErrorPolicy::Fallback);
        assert_eq!(config.model.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.server.upload_dir, "/tmp/uploads");
        assert_eq!(config.server.output_dir, "outputs");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Config::from_toml("[model]\ntimeout_seconds = 0\n").unwrap_err();
        assert!(matches!(err, LeadError::Config(_)));
    }

    #[test]
    fn unknown_policy_is_a_toml_error() {
        let err = Config::from_toml("[model]\non_backend_error = \"retry\"\n").unwrap_err();
        assert!(matches!(err, LeadError::Toml(_)));
    }
}
