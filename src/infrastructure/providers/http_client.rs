//! # HTTP Client Utilities
//!
//! Shared HTTP client for provider transports.
//!
//! Unlike a typed JSON client, [`HttpClient::execute`] returns every HTTP
//! response, successful or not, as a [`ProviderResponse`]. The aggregator
//! needs the status of failed attempts (401/403 skip the current
//! combination) and the proxy needs them to relay upstream errors.
//! Only transport failures become [`ProviderError`]s.
//!
//! # Examples
//!
//! ```ignore
//! use insurance_offers::infrastructure::providers::http_client::HttpClient;
//! use insurance_offers::infrastructure::providers::transport::ProviderRequest;
//!
//! let client = HttpClient::new(10_000)?;
//! let response = client
//!     .execute("https://api.example.com/plans", &ProviderRequest::get("/plans"))
//!     .await?;
//! ```

use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::transport::{HttpMethod, ProviderRequest, ProviderResponse};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// HTTP client wrapper for provider transports.
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client.
    client: Client,
    /// Request timeout in milliseconds.
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a new HTTP client with the specified timeout.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InternalError` if the client cannot be created.
    pub fn new(timeout_ms: u64) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| {
                ProviderError::internal_error(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, timeout_ms })
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Sends `request` to `url` and returns the response whatever its status.
    ///
    /// Bodies are parsed as JSON; an empty body becomes `Value::Null` and a
    /// non-JSON body is kept as `Value::String`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Timeout` or `ProviderError::Connection` if no
    /// response was received.
    pub async fn execute(
        &self,
        url: &str,
        request: &ProviderRequest,
    ) -> ProviderResult<ProviderResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        Ok(ProviderResponse::new(status, parse_body(&text)))
    }

    /// Maps a reqwest error to a ProviderError.
    fn map_reqwest_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::timeout(format!("Request timed out after {}ms", self.timeout_ms))
        } else if error.is_connect() {
            ProviderError::connection(format!("Connection failed: {}", error))
        } else {
            ProviderError::connection(format!("HTTP request failed: {}", error))
        }
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_client() {
        let client = HttpClient::new(5000);
        assert!(client.is_ok());
        assert_eq!(client.unwrap().timeout_ms(), 5000);
    }

    #[test]
    fn parse_body_variants() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("{\"a\":1}"), json!({"a": 1}));
        assert_eq!(parse_body("<html>"), json!("<html>"));
    }

    #[tokio::test]
    async fn unreachable_host_is_connection_error() {
        let client = HttpClient::new(500).unwrap();
        let result = client
            .execute("http://127.0.0.1:1/plans", &ProviderRequest::get("/plans"))
            .await;
        assert!(result.unwrap_err().is_network_failure());
    }
}
