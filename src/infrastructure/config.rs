//! # Application Configuration
//!
//! Layered runtime settings.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. `.env` in the working directory (loaded into the process environment)
//! 2. `config/default`, `config/{RUN_MODE}`, `config/local` (all optional)
//! 3. Environment variables prefixed `OFFERS`, separator `__`
//!    (`OFFERS__PROVIDER__BASE_URL=https://...`)
//!
//! Settings are read once at startup and injected; nothing here is global.

use crate::infrastructure::providers::credentials::ProviderCredentials;
use crate::infrastructure::providers::error::ProviderResult;
use crate::infrastructure::providers::http_client::{DEFAULT_TIMEOUT_MS, HttpClient};
use crate::infrastructure::providers::transport::{
    DirectTransport, ProviderTransport, ProxyTransport,
};
use serde::Deserialize;
use std::env;
use std::sync::Arc;

/// Default number of synthetic offers returned on total failure.
pub const DEFAULT_MOCK_BATCH_SIZE: usize = 5;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Remote provider settings.
    #[serde(default)]
    pub provider: ProviderSettings,
    /// Aggregation behavior.
    #[serde(default)]
    pub aggregator: AggregatorSettings,
    /// REST server settings.
    #[serde(default)]
    pub server: ServerSettings,
}

/// Remote provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    /// Provider API base URL.
    #[serde(default)]
    pub base_url: String,
    /// Login for header authentication.
    #[serde(default)]
    pub username: Option<String>,
    /// Password for header authentication.
    #[serde(default)]
    pub password: Option<String>,
    /// API key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Tag stamped on every offer.
    #[serde(default = "default_provider_id")]
    pub provider_id: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Edge-function proxy URL. When set, requests go through the proxy.
    #[serde(default)]
    pub proxy_url: Option<String>,
}

fn default_provider_id() -> String {
    "universal-assistance".to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: None,
            password: None,
            api_key: None,
            provider_id: default_provider_id(),
            timeout_ms: default_timeout_ms(),
            proxy_url: None,
        }
    }
}

impl ProviderSettings {
    /// Returns the credentials to pass to the aggregator.
    #[must_use]
    pub fn credentials(&self) -> ProviderCredentials {
        ProviderCredentials {
            base_url: self.base_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            api_key: self.api_key.clone(),
        }
    }

    /// Returns the configured proxy URL, ignoring blank values.
    #[must_use]
    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Builds the transport: proxy when a proxy URL is set, direct otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InternalError` if the HTTP client cannot be built.
    pub fn transport(&self) -> ProviderResult<Arc<dyn ProviderTransport>> {
        let client = HttpClient::new(self.timeout_ms)?;
        Ok(match self.proxy_url() {
            Some(url) => Arc::new(ProxyTransport::new(client, url)),
            None => Arc::new(DirectTransport::new(client)),
        })
    }
}

/// Aggregation behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorSettings {
    /// Number of synthetic offers returned on total failure.
    #[serde(default = "default_mock_batch_size")]
    pub mock_batch_size: usize,
}

fn default_mock_batch_size() -> usize {
    DEFAULT_MOCK_BATCH_SIZE
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            mock_batch_size: DEFAULT_MOCK_BATCH_SIZE,
        }
    }
}

/// REST server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Returns `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// Loads configuration from `.env`, `config/*` files and the environment.
    ///
    /// # Errors
    ///
    /// Returns `config::ConfigError` if a source is malformed or a value has
    /// the wrong type.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        // A missing .env file is normal outside development.
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name("config/default").required(false))
            .add_source(::config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(::config::File::with_name("config/local").required(false))
            .add_source(environment())
            .build()?;

        Self::from_config(settings)
    }

    /// Deserializes an already-built configuration.
    ///
    /// # Errors
    ///
    /// Returns `config::ConfigError` if a value has the wrong type.
    pub fn from_config(settings: ::config::Config) -> Result<Self, ::config::ConfigError> {
        settings.try_deserialize()
    }
}

/// `OFFERS__SECTION__KEY` variables.
///
/// Values stay strings until deserialization so that numeric-looking
/// secrets (`007123`) keep their leading zeros.
fn environment() -> ::config::Environment {
    ::config::Environment::with_prefix("OFFERS").separator("__")
}
