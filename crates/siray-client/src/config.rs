//! Client configuration.

use std::fmt;
use std::time::Duration;

use siray_models::{SirayError, SirayResult};

pub const DEFAULT_BASE_URL: &str = "https://api.siray.ai";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "SIRAY_API_KEY";
pub const BASE_URL_ENV: &str = "SIRAY_BASE_URL";
pub const TIMEOUT_ENV: &str = "SIRAY_TIMEOUT_SECS";

/// Configuration for the API client.
#[derive(Clone)]
pub struct SirayConfig {
    /// Bearer token sent on every request
    pub api_key: String,
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl fmt::Debug for SirayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SirayConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl SirayConfig {
    /// Create a config with default endpoint and timeouts.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Set the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create config from environment variables.
    ///
    /// `SIRAY_API_KEY` is required; `SIRAY_BASE_URL` and `SIRAY_TIMEOUT_SECS`
    /// are optional.
    pub fn from_env() -> SirayResult<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            SirayError::configuration(format!(
                "API key must be provided either as argument or through {API_KEY_ENV}"
            ))
        })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                config = config.with_base_url(base_url.trim());
            }
        }
        config.timeout = Duration::from_secs(
            std::env::var(TIMEOUT_ENV)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that could never authenticate.
    pub fn validate(&self) -> SirayResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(SirayError::configuration(format!(
                "API key must be provided either as argument or through {API_KEY_ENV}"
            )));
        }
        if self.base_url.trim().is_empty() {
            return Err(SirayError::configuration("base URL cannot be empty"));
        }
        Ok(())
    }
}
