//! Configuration module for loading environment variables and settings.

use crate::error::ConfigError;

/// Environment variable holding the OpenAI API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Environment variable overriding the OpenAI API base URL.
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

/// Environment variable overriding the image model.
pub const MODEL_VAR: &str = "OPENAI_IMAGE_MODEL";

/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default image generation model.
pub const DEFAULT_MODEL: &str = "dall-e-3";

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// OpenAI API key (required)
    pub api_key: String,
    /// Base URL of the OpenAI API, without trailing slash
    pub api_base_url: String,
    /// Image model sent with every generation request
    pub model: String,
}

impl Config {
    /// Create a configuration with the given API key and default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the API base URL.
    pub fn with_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Load configuration from environment variables and .env file.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingEnvVar` if OPENAI_API_KEY is not set or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingEnvVar` if the API key is absent or blank,
    /// and `ConfigError::InvalidValue` if the base URL is not an http(s) URL.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::missing_env_var(API_KEY_VAR))?;

        let api_base_url = lookup(BASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::invalid_value(
                BASE_URL_VAR,
                format!("'{}' must start with http:// or https://", api_base_url),
            ));
        }

        let model = lookup(MODEL_VAR)
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self::new(api_key)
            .with_api_base_url(api_base_url)
            .with_model(model))
    }

    /// Override the image model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Get the full URL of an OpenAI API path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .finish()
    }
}
