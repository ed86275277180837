//! Configuration for the explorer engine and CLI.
//!
//! Settings come from an optional TOML file with environment overrides
//! (loaded through dotenv in `main`). The auth token is environment-only so
//! it never lands in a config file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ExplorerError;
use crate::services::DEFAULT_URL_TTL;

/// Environment variable overrides.
const ENV_API_URL: &str = "EXPEDIENTE_API_URL";
const ENV_TOKEN: &str = "EXPEDIENTE_TOKEN";
const ENV_URL_TTL: &str = "EXPEDIENTE_URL_TTL_SECS";
const ENV_TIMEOUT: &str = "EXPEDIENTE_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the operations REST API.
    pub api_base_url: String,
    /// Bearer token. Environment-only; never serialized.
    #[serde(skip)]
    pub auth_token: Option<String>,
    pub request_timeout_secs: u64,
    /// Signed-URL cache TTL. Must expire strictly before the backend's own
    /// URL expiry so a cached URL is never handed out past its validity;
    /// the backend signs for 15 minutes, so 5 is a safe default.
    pub url_cache_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3001/api".to_string(),
            auth_token: None,
            request_timeout_secs: 30,
            url_cache_ttl_secs: DEFAULT_URL_TTL.as_secs(),
        }
    }
}

impl Config {
    /// Load configuration: file (when present), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ExplorerError> {
        let mut config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|e| {
                    ExplorerError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                toml::from_str(&raw).map_err(|e| {
                    ExplorerError::Config(format!("invalid config {}: {e}", path.display()))
                })?
            }
            None => Self::default(),
        };

        if let Ok(url) = std::env::var(ENV_API_URL) {
            config.api_base_url = url;
        }
        if let Ok(token) = std::env::var(ENV_TOKEN) {
            if !token.is_empty() {
                config.auth_token = Some(token);
            }
        }
        if let Ok(ttl) = std::env::var(ENV_URL_TTL) {
            config.url_cache_ttl_secs = ttl
                .parse()
                .map_err(|_| ExplorerError::Config(format!("{ENV_URL_TTL} must be seconds")))?;
        }
        if let Ok(timeout) = std::env::var(ENV_TIMEOUT) {
            config.request_timeout_secs = timeout
                .parse()
                .map_err(|_| ExplorerError::Config(format!("{ENV_TIMEOUT} must be seconds")))?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ExplorerError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ExplorerError::Config("api_base_url is required".into()));
        }
        if self.url_cache_ttl_secs == 0 {
            return Err(ExplorerError::Config(
                "url_cache_ttl_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn url_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.url_cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.url_cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_base_url = \"https://ops.example.com/api\"\nurl_cache_ttl_secs = 120"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.api_base_url, "https://ops.example.com/api");
        assert_eq!(config.url_cache_ttl_secs, 120);
        // Unspecified fields keep defaults.
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "url_cache_ttl_secs = 0").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ExplorerError::Config(_)));
    }
}
