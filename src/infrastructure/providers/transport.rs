//! # Provider Transport
//!
//! Port definition for reaching the remote insurance API.
//!
//! The aggregator speaks to the provider through a [`ProviderTransport`].
//! Two implementations exist:
//!
//! - [`DirectTransport`]: sends requests straight to the provider base URL
//! - [`ProxyTransport`]: wraps each request in a [`ProxyEnvelope`] and posts
//!   it to the edge-function proxy, which forwards it server side
//!
//! Both return the provider's status and body unchanged, so the aggregator
//! handles them identically.

use crate::infrastructure::providers::credentials::{
    API_KEY_HEADER, LOGIN_HEADER, PASSWORD_HEADER, ProviderCredentials,
};
use crate::infrastructure::providers::error::{ProviderError, ProviderResult, map_status_error};
use crate::infrastructure::providers::http_client::HttpClient;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Key under which the proxy attaches fallback records to error responses.
pub const MOCK_DATA_KEY: &str = "mockData";

/// HTTP method of a provider request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HttpMethod {
    /// GET.
    Get,
    /// POST.
    #[default]
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// One request to the provider, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path relative to the base URL.
    pub path: String,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<Value>,
}

impl ProviderRequest {
    /// Creates a GET request without body.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates a POST request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Adds headers.
    #[must_use]
    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Returns true if a login, password or API key header is set.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        self.headers.iter().any(|(name, _)| {
            [LOGIN_HEADER, PASSWORD_HEADER, API_KEY_HEADER]
                .iter()
                .any(|identity| name.eq_ignore_ascii_case(identity))
        })
    }
}

/// Status and body of a provider response.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    status: u16,
    body: Value,
}

impl ProviderResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Returns the HTTP status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the parsed body.
    #[inline]
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Returns true for a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for 401 or 403.
    #[must_use]
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self.status, 401 | 403)
    }

    /// Returns the body of a successful response.
    ///
    /// # Errors
    ///
    /// Returns the [`ProviderError`] matching the status of a non-2xx response.
    pub fn into_result(self) -> ProviderResult<Value> {
        if self.is_success() {
            return Ok(self.body);
        }
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        let text = match &self.body {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        Err(map_status_error(status, &text))
    }

    /// Returns the fallback records attached by the proxy, if any.
    #[must_use]
    pub fn mock_data(&self) -> Option<&Vec<Value>> {
        if self.is_success() {
            return None;
        }
        self.body
            .get(MOCK_DATA_KEY)
            .and_then(Value::as_array)
            .filter(|records| !records.is_empty())
    }
}

/// How a transport reaches the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// Straight to the provider.
    Direct,
    /// Through the edge-function proxy.
    Proxy,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Proxy => write!(f, "proxy"),
        }
    }
}

/// Sends provider requests.
///
/// Implementations return `Ok` for every HTTP response, whatever its status,
/// and `Err` only when no response was obtained.
#[async_trait]
pub trait ProviderTransport: Send + Sync + fmt::Debug {
    /// Returns how this transport reaches the provider.
    fn mode(&self) -> TransportMode;

    /// Sends one request.
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` if no response was received.
    async fn send(
        &self,
        credentials: &ProviderCredentials,
        request: &ProviderRequest,
    ) -> ProviderResult<ProviderResponse>;
}

/// Transport sending requests straight to the provider base URL.
#[derive(Debug, Clone)]
pub struct DirectTransport {
    client: HttpClient,
}

impl DirectTransport {
    /// Creates a direct transport.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProviderTransport for DirectTransport {
    fn mode(&self) -> TransportMode {
        TransportMode::Direct
    }

    async fn send(
        &self,
        credentials: &ProviderCredentials,
        request: &ProviderRequest,
    ) -> ProviderResult<ProviderResponse> {
        let url = credentials.url_for(&request.path);
        self.client.execute(&url, request).await
    }
}

/// Request wrapper understood by the edge-function proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEnvelope {
    /// Upstream HTTP method.
    #[serde(default)]
    pub method: HttpMethod,
    /// Upstream path relative to the proxy's configured base URL.
    pub path: String,
    /// Upstream headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Upstream JSON body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ProxyEnvelope {
    /// Converts the envelope back into the upstream request.
    #[must_use]
    pub fn into_request(self) -> ProviderRequest {
        ProviderRequest {
            method: self.method,
            path: self.path,
            headers: self.headers.into_iter().collect(),
            body: self.body,
        }
    }
}

impl From<&ProviderRequest> for ProxyEnvelope {
    fn from(request: &ProviderRequest) -> Self {
        Self {
            method: request.method,
            path: request.path.clone(),
            headers: request.headers.iter().cloned().collect(),
            body: request.body.clone(),
        }
    }
}

/// Transport posting every request to the edge-function proxy.
///
/// The proxy holds its own upstream base URL; the credentials' base URL is
/// not used.
#[derive(Debug, Clone)]
pub struct ProxyTransport {
    client: HttpClient,
    proxy_url: String,
}

impl ProxyTransport {
    /// Creates a proxy transport posting to `proxy_url`.
    #[must_use]
    pub fn new(client: HttpClient, proxy_url: impl Into<String>) -> Self {
        Self {
            client,
            proxy_url: proxy_url.into(),
        }
    }

    /// Returns the proxy URL.
    #[inline]
    #[must_use]
    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }
}

#[async_trait]
impl ProviderTransport for ProxyTransport {
    fn mode(&self) -> TransportMode {
        TransportMode::Proxy
    }

    async fn send(
        &self,
        _credentials: &ProviderCredentials,
        request: &ProviderRequest,
    ) -> ProviderResult<ProviderResponse> {
        let envelope = serde_json::to_value(ProxyEnvelope::from(request)).map_err(|e| {
            ProviderError::internal_error(format!("Failed to encode proxy envelope: {}", e))
        })?;
        let wrapped = ProviderRequest::post("", envelope);
        self.client.execute(&self.proxy_url, &wrapped).await
    }
}
