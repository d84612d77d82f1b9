use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the tracker backend, including the `/api` prefix.
    pub api_base_url: String,
    /// Directory holding the credential store.
    pub data_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api".to_string(),
            data_dir: "./data".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000/api".to_string())
            .trim_end_matches('/')
            .to_string();

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let config = Config {
            api_base_url,
            data_dir,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "API_BASE_URL cannot be empty".to_string(),
            ));
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "API_BASE_URL must be an http(s) URL, got: {}",
                self.api_base_url
            )));
        }

        if self.data_dir.is_empty() {
            return Err(ConfigError::ValidationError(
                "DATA_DIR cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
