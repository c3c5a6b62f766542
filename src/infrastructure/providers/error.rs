//! # Provider Errors
//!
//! Error types for a single provider request.
//!
//! A [`ProviderError`] describes one failed attempt against the remote
//! insurance API. The aggregator logs it and moves on to the next attempt;
//! it never crosses the aggregator boundary.
//!
//! # Examples
//!
//! ```
//! use insurance_offers::infrastructure::providers::error::ProviderError;
//!
//! let error = ProviderError::timeout("Request timed out after 10000ms");
//! assert!(error.is_network_failure());
//!
//! let error = ProviderError::authentication("Invalid credentials");
//! assert!(error.is_auth_rejection());
//! ```

use reqwest::StatusCode;
use thiserror::Error;

/// Error type for one provider request.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Request timed out.
    #[error("provider timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
    },

    /// Network or connection error.
    #[error("provider connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Credentials rejected (401/403).
    #[error("provider authentication error: {message}")]
    Authentication {
        /// Error message.
        message: String,
        /// HTTP status returned by the provider.
        status: Option<u16>,
    },

    /// Rate limit exceeded.
    #[error("provider rate limit exceeded: {message}")]
    RateLimited {
        /// Error message.
        message: String,
    },

    /// Request rejected as malformed.
    #[error("provider invalid request: {message}")]
    InvalidRequest {
        /// Error message.
        message: String,
    },

    /// Response had an unexpected status or an unrecognized shape.
    #[error("provider protocol error: {message}")]
    ProtocolError {
        /// Error message.
        message: String,
    },

    /// Local failure before a request could be sent.
    #[error("provider internal error: {message}")]
    InternalError {
        /// Error message.
        message: String,
    },
}

impl ProviderError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            status: None,
        }
    }

    /// Creates an authentication error carrying the HTTP status.
    #[must_use]
    pub fn authentication_with_status(message: impl Into<String>, status: u16) -> Self {
        Self::Authentication {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Creates a rate limited error.
    #[must_use]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol_error(message: impl Into<String>) -> Self {
        Self::ProtocolError {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Returns true if the provider rejected the credentials.
    #[must_use]
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns true if no response was received at all.
    #[must_use]
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connection { .. })
    }
}

/// Maps a non-success HTTP status to a [`ProviderError`].
#[must_use]
pub fn map_status_error(status: StatusCode, body: &str) -> ProviderError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::invalid_request(format!("Bad request: {}", body))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::authentication_with_status(
            format!("Authentication failed: {}", body),
            status.as_u16(),
        ),
        StatusCode::NOT_FOUND => {
            ProviderError::protocol_error(format!("Resource not found: {}", body))
        }
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited("Rate limit exceeded"),
        StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => {
            ProviderError::connection(format!("Server error ({}): {}", status, body))
        }
        _ => ProviderError::protocol_error(format!("HTTP error ({}): {}", status, body)),
    }
}

/// Result type for provider requests.
pub type ProviderResult<T> = Result<T, ProviderError>;
