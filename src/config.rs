use crate::error::{Result, WriterError};
use serde::Deserialize;
use std::env;
use std::fs;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_ENDPOINT_PATH: &str = "/api/generate-combined";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WriterConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_endpoint_path")]
    pub endpoint_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Idle interval before the buffer is re-parsed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_endpoint_path() -> String {
    DEFAULT_ENDPOINT_PATH.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint_path: default_endpoint_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl BackendConfig {
    /// Full URL of the streaming generation endpoint
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint_path.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl StreamConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl WriterConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("WRITER_BASE_URL").unwrap_or_else(|_| default_base_url());

        let endpoint_path =
            env::var("WRITER_ENDPOINT_PATH").unwrap_or_else(|_| default_endpoint_path());

        let timeout_secs = match env::var("WRITER_TIMEOUT_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|e| WriterError::ConfigError(format!("Invalid timeout value: {}", e)))?,
            Err(_) => default_timeout_secs(),
        };

        let debounce_ms = match env::var("WRITER_DEBOUNCE_MS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|e| WriterError::ConfigError(format!("Invalid debounce value: {}", e)))?,
            Err(_) => default_debounce_ms(),
        };

        Ok(WriterConfig {
            backend: BackendConfig {
                base_url,
                endpoint_path,
                timeout_secs,
            },
            stream: StreamConfig { debounce_ms },
        })
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| WriterError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::from_toml_str(&contents)?;

        // Allow environment variables to override file config
        if let Ok(base_url) = env::var("WRITER_BASE_URL") {
            config.backend.base_url = base_url;
        }

        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| WriterError::ConfigError(format!("Failed to parse config file: {}", e)))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let base_url = self.backend.base_url.trim();
        if base_url.is_empty() {
            return Err(WriterError::ConfigError("Base URL is empty".to_string()));
        }

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(WriterError::ConfigError(format!(
                "Base URL must be http(s): {}",
                base_url
            )));
        }

        if self.backend.endpoint_path.trim().is_empty() {
            return Err(WriterError::ConfigError(
                "Endpoint path is empty".to_string(),
            ));
        }

        if self.backend.timeout_secs == 0 {
            return Err(WriterError::ConfigError(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
