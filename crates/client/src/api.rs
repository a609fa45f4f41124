//! REST client for the booking API.
//!
//! Wraps [`reqwest`] with the base URL and [`Session`]. Every request
//! carries the session credentials and a fresh `x-request-id`.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::Session;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Response of `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    /// Storage path to write into the record.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// HTTP client for one API deployment.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    /// * `base_url` - API root, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: impl Into<String>, session: Session) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, session)
    }

    /// Reuse an existing [`reqwest::Client`] (connection pooling).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>, session: Session) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            session,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(
            builder.build()?,
            config.api_url.clone(),
            config.session(),
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET <path>` decoded as JSON.
    pub async fn fetch_json(&self, path: &str) -> Result<Value, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Self::parse_response(response).await
    }

    /// `PUT <path>` with a JSON body. An empty 2xx body yields `null`.
    pub async fn put_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let response = self.send(self.request(Method::PUT, path).json(body)).await?;
        Self::parse_optional(response).await
    }

    /// `PATCH <path>` with a JSON body. An empty 2xx body yields `null`.
    pub async fn patch_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let response = self.send(self.request(Method::PATCH, path).json(body)).await?;
        Self::parse_optional(response).await
    }

    /// `GET <path>` returning a list, either a bare array or
    /// `{ "data": [...] }`.
    ///
    /// Items that do not decode into `T` are skipped with a warning so one
    /// malformed row does not blank a whole list.
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let body = self.fetch_json(path).await?;
        let items = match body {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(ApiError::Decode(format!(
                        "expected a list at '{path}'"
                    )))
                }
            },
            _ => return Err(ApiError::Decode(format!("expected a list at '{path}'"))),
        };

        let total = items.len();
        let decoded: Vec<T> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(path, error = %e, "Skipping undecodable list item");
                    None
                }
            })
            .collect();

        tracing::debug!(path, total, decoded = decoded.len(), "Fetched list");
        Ok(decoded)
    }

    /// `POST /upload` as multipart form data.
    ///
    /// A 2xx response with `success: false` or no `path` is an error.
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        folder: Option<&str>,
    ) -> Result<UploadResponse, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(folder) = folder {
            form = form.text("folder", folder.to_string());
        }

        let response = self
            .send(self.request(Method::POST, "upload").multipart(form))
            .await?;
        let status = response.status().as_u16();
        let upload: UploadResponse = Self::parse_response(response).await?;

        if !upload.success || upload.path.is_none() {
            return Err(ApiError::Status {
                status,
                message: upload
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "Upload was not accepted".to_string()),
            });
        }
        Ok(upload)
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request_id = uuid::Uuid::new_v4().to_string();
        let builder = self
            .client
            .request(method, self.url(path))
            .header(REQUEST_ID_HEADER, request_id);
        self.session.apply(builder)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await?;
        tracing::debug!(
            url = %response.url(),
            status = response.status().as_u16(),
            "API response",
        );
        Self::ensure_success(response).await
    }

    /// Ensure the response has a success status code. On failure the
    /// message is the body's `error` string when present, else the body
    /// text, else the status reason.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string()),
        })
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn parse_optional(response: reqwest::Response) -> Result<Value, ApiError> {
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Extract a human-readable message from an error body.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(json) => ["error", "message"]
            .iter()
            .filter_map(|key| json.get(*key).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
            .map(String::from)
            .or_else(|| Some(trimmed.to_string())),
        Err(_) => Some(trimmed.to_string()),
    }
}
