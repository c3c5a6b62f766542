//! # Provider Credentials
//!
//! Secrets and endpoint of the remote insurance provider.
//!
//! Credentials are passed explicitly to every aggregation call. A call with
//! no usable identity fails with [`ConfigurationError`] before any request
//! is sent.
//!
//! # Examples
//!
//! ```
//! use insurance_offers::infrastructure::providers::credentials::ProviderCredentials;
//!
//! let credentials = ProviderCredentials::with_login("https://api.example.com", "agent", "s3cret");
//! assert!(credentials.validate().is_ok());
//!
//! let empty = ProviderCredentials::new("https://api.example.com");
//! assert!(empty.validate().is_err());
//! ```

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Header carrying the provider login.
pub const LOGIN_HEADER: &str = "Login";

/// Header carrying the provider password.
pub const PASSWORD_HEADER: &str = "Senha";

/// Header carrying the provider API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Required provider configuration is absent.
///
/// This is the only error that crosses the aggregator boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Neither username+password nor an API key was supplied.
    #[error("configuration error: provider credentials require username and password or an API key")]
    MissingIdentity,

    /// No base URL was supplied.
    #[error("configuration error: provider base URL is required")]
    MissingBaseUrl,

    /// The base URL is not an absolute http(s) URL.
    #[error("configuration error: invalid provider base URL '{0}'")]
    InvalidBaseUrl(String),
}

/// The identity presented to the provider.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ProviderIdentity<'a> {
    /// Login and password headers.
    Login {
        /// Provider login.
        username: &'a str,
        /// Provider password.
        password: &'a str,
    },
    /// API key header.
    ApiKey(&'a str),
}

impl fmt::Debug for ProviderIdentity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::ApiKey(_) => f.debug_tuple("ApiKey").field(&"***").finish(),
        }
    }
}

/// Provider secret bundle plus base URL.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderCredentials {
    /// Provider API base URL, without trailing slash.
    #[serde(default)]
    pub base_url: String,
    /// Login for header authentication.
    #[serde(default)]
    pub username: Option<String>,
    /// Password for header authentication.
    #[serde(default)]
    pub password: Option<String>,
    /// API key, used when no login is configured.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl ProviderCredentials {
    /// Creates credentials with only a base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Creates login/password credentials.
    #[must_use]
    pub fn with_login(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: Some(username.into()),
            password: Some(password.into()),
            api_key: None,
        }
    }

    /// Creates API key credentials.
    #[must_use]
    pub fn with_api_key(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
            api_key: Some(api_key.into()),
        }
    }

    /// Validates the credentials and returns the identity to present.
    ///
    /// A login takes precedence over an API key when both are present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingBaseUrl` or
    /// `ConfigurationError::InvalidBaseUrl` for an unusable base URL, and
    /// `ConfigurationError::MissingIdentity` when no identity is set.
    pub fn validate(&self) -> Result<ProviderIdentity<'_>, ConfigurationError> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigurationError::MissingBaseUrl);
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigurationError::InvalidBaseUrl(base_url.to_string()));
        }

        fn non_empty(value: &Option<String>) -> Option<&str> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
        }

        match (
            non_empty(&self.username),
            non_empty(&self.password),
            non_empty(&self.api_key),
        ) {
            (Some(username), Some(password), _) => Ok(ProviderIdentity::Login { username, password }),
            (_, _, Some(key)) => Ok(ProviderIdentity::ApiKey(key)),
            _ => Err(ConfigurationError::MissingIdentity),
        }
    }

    /// Joins `path` onto the base URL.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Returns the identity headers for `identity`.
    #[must_use]
    pub fn identity_headers(identity: ProviderIdentity<'_>) -> Vec<(String, String)> {
        match identity {
            ProviderIdentity::Login { username, password } => vec![
                (LOGIN_HEADER.to_string(), username.to_string()),
                (PASSWORD_HEADER.to_string(), password.to_string()),
            ],
            ProviderIdentity::ApiKey(key) => vec![(API_KEY_HEADER.to_string(), key.to_string())],
        }
    }
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "***");
        f.debug_struct("ProviderCredentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn login_takes_precedence_over_api_key() {
        let mut credentials = ProviderCredentials::with_login("https://ua.test", "user", "pw");
        credentials.api_key = Some("key".to_string());
        assert!(matches!(
            credentials.validate(),
            Ok(ProviderIdentity::Login { username: "user", .. })
        ));
    }

    #[test]
    fn api_key_alone_is_valid() {
        let credentials = ProviderCredentials::with_api_key("https://ua.test", "key");
        assert_eq!(credentials.validate(), Ok(ProviderIdentity::ApiKey("key")));
    }

    #[test]
    fn identity_borrows_trimmed_values() {
        let credentials =
            ProviderCredentials::with_login(" https://ua.test ", " agent ", " 007123 ");
        let identity = credentials.validate().unwrap();
        assert_eq!(
            identity,
            ProviderIdentity::Login {
                username: "agent",
                password: "007123",
            }
        );
        assert_eq!(
            ProviderCredentials::identity_headers(identity),
            vec![
                (LOGIN_HEADER.to_string(), "agent".to_string()),
                (PASSWORD_HEADER.to_string(), "007123".to_string()),
            ]
        );
    }

    #[test]
    fn username_without_password_is_missing_identity() {
        let mut credentials = ProviderCredentials::new("https://ua.test");
        credentials.username = Some("user".to_string());
        credentials.password = Some("  ".to_string());
        assert_eq!(
            credentials.validate(),
            Err(ConfigurationError::MissingIdentity)
        );
    }

    #[test]
    fn base_url_is_required() {
        let credentials = ProviderCredentials::with_api_key("", "key");
        assert_eq!(credentials.validate(), Err(ConfigurationError::MissingBaseUrl));

        let credentials = ProviderCredentials::with_api_key("ftp://ua.test", "key");
        assert!(matches!(
            credentials.validate(),
            Err(ConfigurationError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn url_for_joins_without_double_slash() {
        let credentials = ProviderCredentials::new("https://ua.test/api/");
        assert_eq!(credentials.url_for("/plans"), "https://ua.test/api/plans");
    }

    #[test]
    fn debug_redacts_secrets() {
        let credentials = ProviderCredentials::with_login("https://ua.test", "user", "hunter2");
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("user"));
    }

    #[test]
    fn login_headers() {
        let headers = ProviderCredentials::identity_headers(ProviderIdentity::Login {
            username: "u",
            password: "p",
        });
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].0, LOGIN_HEADER);
    }
}
