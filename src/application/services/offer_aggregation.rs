//! # Offer Aggregation Engine
//!
//! Turns a [`SearchRequest`] into a list of [`Offer`]s from the remote
//! provider, tolerating unknown and changing API shapes.
//!
//! This module provides the [`ProviderAggregator`], which:
//!
//! 1. Validates the credentials (the only failure it reports)
//! 2. Authenticates, continuing with a placeholder token on failure
//! 3. Walks the [`ProbePlan`] sequentially until an attempt returns plans
//! 4. Tries one bare `GET` on the list-all-plans endpoint
//! 5. Falls back to synthetic offers and notifies the [`DegradeNotifier`]
//!
//! Attempts are awaited one at a time. No request is issued after the one
//! that produced the returned plans.

use crate::application::services::mock_offers::MockOfferGenerator;
use crate::application::services::normalization::Normalizer;
use crate::application::services::notifier::{DegradeNotice, DegradeNotifier, DegradeReason};
use crate::application::services::probe_plan::{ProbePlan, ResponseExtractor, extract_plans};
use crate::domain::entities::Offer;
use crate::domain::value_objects::{ProviderId, SearchRequest};
use crate::infrastructure::config::{AppConfig, DEFAULT_MOCK_BATCH_SIZE};
use crate::infrastructure::providers::credentials::{
    ConfigurationError, ProviderCredentials, ProviderIdentity,
};
use crate::infrastructure::providers::fields::first_string;
use crate::infrastructure::providers::transport::{ProviderRequest, ProviderTransport, TransportMode};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Token used when authentication fails.
pub const PLACEHOLDER_TOKEN: &str = "placeholder-token";

/// Authentication endpoint.
pub const DEFAULT_AUTH_PATH: &str = "/auth/login";

/// Bare list-all-plans endpoint tried after the probe plan is exhausted.
pub const DEFAULT_FALLBACK_PATH: &str = "/plans";

const TOKEN_KEYS: &[&str] = &["token", "access_token", "accessToken", "jwt"];

/// Configuration for offer aggregation.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Tag stamped on every offer.
    pub provider_id: ProviderId,
    /// Number of synthetic offers returned on total failure, at least one.
    pub mock_batch_size: usize,
    /// Authentication endpoint path.
    pub auth_path: String,
    /// Fallback list-all-plans endpoint path.
    pub fallback_path: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            provider_id: ProviderId::default(),
            mock_batch_size: DEFAULT_MOCK_BATCH_SIZE,
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            fallback_path: DEFAULT_FALLBACK_PATH.to_string(),
        }
    }
}

impl AggregatorConfig {
    /// Creates a configuration from the loaded application settings.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::default()
            .with_provider_id(ProviderId::new(config.provider.provider_id.clone()))
            .with_mock_batch_size(config.aggregator.mock_batch_size)
    }

    /// Sets the provider tag.
    #[must_use]
    pub fn with_provider_id(mut self, provider_id: ProviderId) -> Self {
        self.provider_id = provider_id;
        self
    }

    /// Sets the synthetic batch size. Zero is raised to one.
    #[must_use]
    pub fn with_mock_batch_size(mut self, size: usize) -> Self {
        self.mock_batch_size = size.max(1);
        self
    }

    /// Sets the authentication path.
    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.auth_path = path.into();
        self
    }

    /// Sets the fallback path.
    #[must_use]
    pub fn with_fallback_path(mut self, path: impl Into<String>) -> Self {
        self.fallback_path = path.into();
        self
    }
}

/// Where the returned offers came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OfferSource {
    /// A probe plan step succeeded.
    Provider {
        /// Endpoint path.
        path: String,
        /// Payload shape name.
        shape: &'static str,
    },
    /// The bare list-all-plans request succeeded.
    Fallback {
        /// Endpoint path.
        path: String,
    },
    /// Placeholder records supplied by the proxy in an error response.
    ProxyMockData,
    /// Locally generated placeholder offers.
    Synthetic,
}

/// Result of one search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Normalized offers; never empty.
    pub offers: Vec<Offer>,
    /// Where the offers came from.
    pub source: OfferSource,
    /// Requests attempted, excluding authentication.
    pub attempts: usize,
}

impl SearchOutcome {
    /// Returns true if the offers are placeholders.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(
            self.source,
            OfferSource::ProxyMockData | OfferSource::Synthetic
        )
    }
}

/// Failures observed while probing.
#[derive(Debug, Default)]
struct AttemptLog {
    attempts: usize,
    last_error: Option<String>,
    proxy_mock_data: Option<Vec<Value>>,
}

impl AttemptLog {
    fn fail(&mut self, message: String) {
        self.last_error = Some(message);
    }
}

/// Engine fetching offers from the remote provider.
#[derive(Debug)]
pub struct ProviderAggregator {
    transport: Arc<dyn ProviderTransport>,
    notifier: Arc<dyn DegradeNotifier>,
    plan: ProbePlan,
    normalizer: Normalizer,
    mock_generator: MockOfferGenerator,
    config: AggregatorConfig,
}

impl ProviderAggregator {
    /// Creates an aggregator with the default probe plan.
    #[must_use]
    pub fn new(
        transport: Arc<dyn ProviderTransport>,
        notifier: Arc<dyn DegradeNotifier>,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            transport,
            notifier,
            plan: ProbePlan::default(),
            normalizer: Normalizer::new(config.provider_id.clone()),
            mock_generator: MockOfferGenerator::new(config.mock_batch_size),
            config,
        }
    }

    /// Replaces the probe plan.
    #[must_use]
    pub fn with_probe_plan(mut self, plan: ProbePlan) -> Self {
        self.plan = plan;
        self
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Returns the probe plan.
    #[must_use]
    pub fn probe_plan(&self) -> &ProbePlan {
        &self.plan
    }

    /// Returns how the transport reaches the provider.
    #[must_use]
    pub fn transport_mode(&self) -> TransportMode {
        self.transport.mode()
    }

    /// Fetches offers for `request`.
    ///
    /// Remote failures never surface: the result is either the provider's
    /// plans or placeholder offers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the credentials carry no usable
    /// identity or base URL. No request is sent in that case.
    pub async fn fetch_offers(
        &self,
        request: &SearchRequest,
        credentials: &ProviderCredentials,
    ) -> Result<Vec<Offer>, ConfigurationError> {
        Ok(self.search(request, credentials).await?.offers)
    }

    /// Fetches offers and reports where they came from.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the credentials carry no usable
    /// identity or base URL. No request is sent in that case.
    #[tracing::instrument(
        skip_all,
        fields(
            origin = %request.origin(),
            destination = %request.destination(),
            passengers = request.passenger_count(),
            mode = %self.transport.mode(),
        )
    )]
    pub async fn search(
        &self,
        request: &SearchRequest,
        credentials: &ProviderCredentials,
    ) -> Result<SearchOutcome, ConfigurationError> {
        let identity = credentials.validate()?;
        let token = self.authenticate(credentials, identity).await;

        let mut headers = ProviderCredentials::identity_headers(identity);
        headers.push(("Authorization".to_string(), format!("Bearer {}", token)));

        let mut log = AttemptLog::default();

        for step in self.plan.steps() {
            let attempt = ProviderRequest::post(step.path.clone(), (step.build_payload)(request))
                .with_headers(headers.iter().cloned());

            if let Some(records) = self
                .attempt(credentials, &attempt, step.extract, &mut log)
                .await
            {
                info!(
                    path = %step.path,
                    shape = step.shape,
                    plans = records.len(),
                    attempts = log.attempts,
                    "provider returned plans"
                );
                return Ok(SearchOutcome {
                    offers: self.normalize(&records),
                    source: OfferSource::Provider {
                        path: step.path.clone(),
                        shape: step.shape,
                    },
                    attempts: log.attempts,
                });
            }
        }

        let fallback = ProviderRequest::get(self.config.fallback_path.clone()).with_headers(headers);
        if let Some(records) = self
            .attempt(credentials, &fallback, extract_plans, &mut log)
            .await
        {
            info!(
                path = %self.config.fallback_path,
                plans = records.len(),
                "fallback list returned plans"
            );
            return Ok(SearchOutcome {
                offers: self.normalize(&records),
                source: OfferSource::Fallback {
                    path: self.config.fallback_path.clone(),
                },
                attempts: log.attempts,
            });
        }

        Ok(self.degrade(log))
    }

    /// Obtains a bearer token, or [`PLACEHOLDER_TOKEN`] on any failure.
    async fn authenticate(
        &self,
        credentials: &ProviderCredentials,
        identity: ProviderIdentity<'_>,
    ) -> String {
        let body = match identity {
            ProviderIdentity::Login { username, password } => {
                json!({ "username": username, "password": password })
            }
            ProviderIdentity::ApiKey(key) => json!({ "apiKey": key }),
        };
        let request = ProviderRequest::post(self.config.auth_path.clone(), body)
            .with_headers(ProviderCredentials::identity_headers(identity));

        let token = match self.transport.send(credentials, &request).await {
            Ok(response) => match response.into_result() {
                Ok(body) => extract_token(&body),
                Err(e) if e.is_auth_rejection() => {
                    warn!(error = %e, "authentication rejected, continuing with placeholder token");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "authentication failed, continuing with placeholder token");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "authentication unreachable, continuing with placeholder token");
                None
            }
        };

        token.unwrap_or_else(|| {
            debug!("no token in authentication response");
            PLACEHOLDER_TOKEN.to_string()
        })
    }

    /// Runs one attempt. Returns the plan records, or `None` to move on.
    async fn attempt(
        &self,
        credentials: &ProviderCredentials,
        request: &ProviderRequest,
        extract: ResponseExtractor,
        log: &mut AttemptLog,
    ) -> Option<Vec<Value>> {
        log.attempts += 1;
        debug!(method = %request.method, path = %request.path, "probing provider");

        let response = match self.transport.send(credentials, request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    path = %request.path,
                    error = %e,
                    network = e.is_network_failure(),
                    "provider request failed, skipping"
                );
                log.fail(e.to_string());
                return None;
            }
        };

        if let Some(records) = response.mock_data() {
            log.proxy_mock_data = Some(records.clone());
        }

        if response.is_auth_rejection() {
            warn!(
                path = %request.path,
                status = response.status(),
                "provider rejected credentials, skipping"
            );
            log.fail(format!("authentication rejected ({})", response.status()));
            return None;
        }

        let status = response.status();
        match response.into_result() {
            Ok(body) => {
                let records = extract(&body);
                if records.is_none() {
                    debug!(path = %request.path, status, "no recognizable plan list");
                    log.fail(format!("unrecognized response from {}", request.path));
                }
                records
            }
            Err(e) => {
                warn!(path = %request.path, status, error = %e, "provider returned error, skipping");
                log.fail(e.to_string());
                None
            }
        }
    }

    fn normalize(&self, records: &[Value]) -> Vec<Offer> {
        let mut rng = rand::rng();
        self.normalizer.normalize_batch(records, &mut rng)
    }

    fn degrade(&self, log: AttemptLog) -> SearchOutcome {
        let (offers, source) = match &log.proxy_mock_data {
            Some(records) => (self.normalize(records), OfferSource::ProxyMockData),
            None => {
                let mut rng = rand::rng();
                let records = self.mock_generator.raw_records(&mut rng);
                (
                    self.normalizer.normalize_batch(&records, &mut rng),
                    OfferSource::Synthetic,
                )
            }
        };

        let notice = DegradeNotice {
            reason: DegradeReason::for_mode(self.transport.mode()),
            attempts: log.attempts,
            last_error: log.last_error,
            offers_returned: offers.len(),
        };
        self.notifier.notify(&notice);

        SearchOutcome {
            offers,
            source,
            attempts: notice.attempts,
        }
    }
}

fn extract_token(body: &Value) -> Option<String> {
    first_string(body, TOKEN_KEYS).or_else(|| {
        body.get("data")
            .and_then(|data| first_string(data, TOKEN_KEYS))
    })
}
