//! Credentials attached to every API request.

use std::fmt;

use reqwest::RequestBuilder;

use crate::error::ConfigError;

/// Extra header sent on every request, e.g. a preview-deployment
/// protection bypass.
#[derive(Clone, PartialEq, Eq)]
pub struct BypassHeader {
    pub name: String,
    pub value: String,
}

impl BypassHeader {
    /// Parse `name:value`. Whitespace around either part is trimmed.
    pub fn parse(var: &'static str, raw: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        let (name, value) = raw
            .split_once(':')
            .ok_or_else(|| invalid("expected 'name:value'"))?;
        let name = name.trim();
        let value = value.trim();

        if name.is_empty() || value.is_empty() {
            return Err(invalid("header name and value must be non-empty"));
        }
        if reqwest::header::HeaderName::from_bytes(name.as_bytes()).is_err() {
            return Err(invalid("not a valid header name"));
        }

        Ok(Self {
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}

impl fmt::Debug for BypassHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BypassHeader")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Bearer token plus optional bypass header.
#[derive(Clone, Default)]
pub struct Session {
    token: Option<String>,
    bypass: Option<BypassHeader>,
}

impl Session {
    pub fn new(token: Option<String>, bypass: Option<BypassHeader>) -> Self {
        Self { token, bypass }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        match &self.bypass {
            Some(bypass) => request.header(bypass.name.as_str(), bypass.value.as_str()),
            None => request,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("bypass", &self.bypass)
            .finish()
    }
}
