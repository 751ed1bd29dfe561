//! Client configuration.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. the defaults embedded from `config/client.toml`,
//! 2. an optional TOML file,
//! 3. `MUNIFOR_API_URL`, `MUNIFOR_TIMEOUT_SECS` and `MUNIFOR_SESSION_FILE`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TOML: &str = include_str!("../config/client.toml");

/// Errors from loading client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The TOML is malformed.
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// An environment override has the wrong format.
    #[error("Invalid value {value:?} for {key}")]
    InvalidEnv {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// API base URL including the `/api` prefix.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries for idempotent requests after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further retry.
    pub retry_base_ms: u64,
    /// Where the session token is stored.
    pub session_file: PathBuf,
}

/// Partial config as read from a user file; unset keys keep defaults.
#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    retry_base_ms: Option<u64>,
    session_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Returns the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the embedded file is malformed.
    pub fn defaults() -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(DEFAULT_TOML)?)
    }

    /// Loads defaults, then `path` (if any), then environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or an
    /// environment variable is malformed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::defaults()?;

        if let Some(path) = path {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            config.merge_toml(&text)?;
            log::debug!("Loaded client config from {}", path.display());
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn merge_toml(&mut self, text: &str) -> Result<(), ConfigError> {
        let overrides: ConfigOverrides = toml::de::from_str(text)?;
        if let Some(v) = overrides.base_url {
            self.base_url = v;
        }
        if let Some(v) = overrides.timeout_secs {
            self.timeout_secs = v;
        }
        if let Some(v) = overrides.max_retries {
            self.max_retries = v;
        }
        if let Some(v) = overrides.retry_base_ms {
            self.retry_base_ms = v;
        }
        if let Some(v) = overrides.session_file {
            self.session_file = v;
        }
        Ok(())
    }

    /// Applies `MUNIFOR_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if a numeric override does not
    /// parse.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("MUNIFOR_API_URL") {
            self.base_url = url;
        }
        if let Some(raw) = lookup("MUNIFOR_TIMEOUT_SECS") {
            self.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "MUNIFOR_TIMEOUT_SECS",
                value: raw.clone(),
            })?;
        }
        if let Some(path) = lookup("MUNIFOR_SESSION_FILE") {
            self.session_file = PathBuf::from(path);
        }
        Ok(())
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Joins an endpoint path onto the base URL.
    #[must_use]
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse() {
        let config = ClientConfig::defaults().unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8080/api");
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn file_overrides_only_listed_keys() {
        let mut config = ClientConfig::defaults().unwrap();
        config
            .merge_toml("base_url = \"https://muni.example/api\"\ntimeout_secs = 5\n")
            .unwrap();
        assert_eq!(config.base_url, "https://muni.example/api");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.retry_base_ms, 500);
    }

    #[test]
    fn env_overrides_win() {
        let mut config = ClientConfig::defaults().unwrap();
        config
            .apply_env(|key| match key {
                "MUNIFOR_API_URL" => Some("http://10.0.0.2/api/".to_string()),
                "MUNIFOR_TIMEOUT_SECS" => Some("30".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(
            config.endpoint_url("/map/data"),
            "http://10.0.0.2/api/map/data"
        );
    }

    #[test]
    fn malformed_env_value_is_rejected() {
        let mut config = ClientConfig::defaults().unwrap();
        let err = config
            .apply_env(|key| (key == "MUNIFOR_TIMEOUT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                key: "MUNIFOR_TIMEOUT_SECS",
                ..
            }
        ));
    }
}
