use std::time::Duration;

use crate::error::ConfigError;
use crate::session::{BypassHeader, Session};

/// Default API base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Default dashboard refresh interval.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL without trailing slash.
    pub api_url: String,
    pub token: Option<String>,
    pub bypass: Option<BypassHeader>,
    pub poll_interval: Duration,
    /// Per-request timeout. `None` keeps the HTTP client default.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                     |
    /// |-------------------------------|-----------------------------|
    /// | `PODIUM_API_URL`              | `http://localhost:3000/api` |
    /// | `PODIUM_API_TOKEN`            | --                          |
    /// | `PODIUM_BYPASS_HEADER`        | -- (`name:value`)           |
    /// | `PODIUM_POLL_INTERVAL_SECS`   | `30`                        |
    /// | `PODIUM_REQUEST_TIMEOUT_SECS` | --                          |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = var("PODIUM_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.into())
            .trim()
            .trim_end_matches('/')
            .to_string();

        let token = var("PODIUM_API_TOKEN");

        let bypass = var("PODIUM_BYPASS_HEADER")
            .map(|raw| BypassHeader::parse("PODIUM_BYPASS_HEADER", &raw))
            .transpose()?;

        let poll_interval = match var("PODIUM_POLL_INTERVAL_SECS") {
            Some(raw) => parse_secs("PODIUM_POLL_INTERVAL_SECS", &raw)?,
            None => Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        };

        let request_timeout = var("PODIUM_REQUEST_TIMEOUT_SECS")
            .map(|raw| parse_secs("PODIUM_REQUEST_TIMEOUT_SECS", &raw))
            .transpose()?;

        Ok(Self {
            api_url,
            token,
            bypass,
            poll_interval,
            request_timeout,
        })
    }

    pub fn session(&self) -> Session {
        Session::new(self.token.clone(), self.bypass.clone())
    }
}

fn parse_secs(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: "expected a whole number of seconds".to_string(),
    })?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
