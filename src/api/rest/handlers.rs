//! # REST Handlers
//!
//! Request handlers, DTOs and the shared [`AppState`].

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::mock_offers::MockOfferGenerator;
use crate::application::services::notifier::{DegradeReason, TracingNotifier};
use crate::application::services::offer_aggregation::{
    AggregatorConfig, ProviderAggregator, SearchOutcome,
};
use crate::domain::entities::Offer;
use crate::domain::value_objects::SearchRequest;
use crate::domain::value_objects::search_request::parse_date;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::providers::credentials::ProviderCredentials;
use crate::infrastructure::providers::error::ProviderResult;
use crate::infrastructure::providers::http_client::HttpClient;
use crate::infrastructure::providers::transport::{
    DirectTransport, MOCK_DATA_KEY, ProviderTransport, ProxyEnvelope,
};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Shared state of the REST service.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Offer aggregator used by the search endpoints.
    pub aggregator: Arc<ProviderAggregator>,
    /// Credentials for the configured provider.
    pub credentials: ProviderCredentials,
    /// Transport used by the proxy endpoint to reach the provider.
    pub upstream: Arc<dyn ProviderTransport>,
    /// Source of `mockData` in proxy error responses.
    pub mock_generator: MockOfferGenerator,
}

impl AppState {
    /// Wires the aggregator and the proxy upstream from configuration.
    ///
    /// The proxy endpoint always talks to the provider directly, even when
    /// the aggregator itself is configured to go through a proxy.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InternalError` if an HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> ProviderResult<Self> {
        let aggregator = ProviderAggregator::new(
            config.provider.transport()?,
            Arc::new(TracingNotifier),
            AggregatorConfig::from_app_config(config),
        );
        let upstream = DirectTransport::new(HttpClient::new(config.provider.timeout_ms)?);
        Ok(Self {
            aggregator: Arc::new(aggregator),
            credentials: config.provider.credentials(),
            upstream: Arc::new(upstream),
            mock_generator: MockOfferGenerator::new(config.aggregator.mock_batch_size),
        })
    }
}

/// Search request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOffersRequest {
    /// Origin region.
    pub origin: String,
    /// Destination region.
    pub destination: String,
    /// `YYYY-MM-DD`.
    #[serde(alias = "departure_date")]
    pub departure_date: String,
    /// `YYYY-MM-DD`.
    #[serde(alias = "return_date")]
    pub return_date: String,
    /// Passenger ages.
    #[serde(alias = "ages")]
    pub passengers: Vec<u8>,
}

impl TryFrom<SearchOffersRequest> for SearchRequest {
    type Error = ApplicationError;

    fn try_from(body: SearchOffersRequest) -> Result<Self, Self::Error> {
        Ok(SearchRequest::new(
            body.origin,
            body.destination,
            parse_date(&body.departure_date)?,
            parse_date(&body.return_date)?,
            body.passengers,
        )?)
    }
}

/// Search response body.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOffersResponse {
    /// Offers, first one recommended.
    pub offers: Vec<Offer>,
    /// Number of offers.
    pub count: usize,
    /// Toast text when the provider could not be reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

impl SearchOffersResponse {
    fn from_outcome(outcome: SearchOutcome, reason: DegradeReason) -> Self {
        let warning = outcome.is_degraded().then(|| reason.user_message());
        Self {
            count: outcome.offers.len(),
            offers: outcome.offers,
            warning,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) | Self::Domain(_) => StatusCode::BAD_REQUEST,
            Self::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// `GET /api/v1/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /api/v1/offers/search`
///
/// # Errors
///
/// Returns 400 for a malformed body or an invalid search and 503 when the
/// provider credentials are not configured.
pub async fn search_offers(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SearchOffersRequest>, JsonRejection>,
) -> ApplicationResult<Json<SearchOffersResponse>> {
    let Json(body) =
        body.map_err(|rejection| ApplicationError::validation(rejection.body_text()))?;
    let request = SearchRequest::try_from(body)?;
    run_search(&state, &request).await
}

/// `GET /api/v1/offers?origin=..&destination=..&departureDate=..&returnDate=..&ages=34,7`
///
/// # Errors
///
/// Returns 400 for an invalid search and 503 when the provider credentials
/// are not configured.
pub async fn list_offers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApplicationResult<Json<SearchOffersResponse>> {
    let request = SearchRequest::from_query(&params)?;
    run_search(&state, &request).await
}

async fn run_search(
    state: &AppState,
    request: &SearchRequest,
) -> ApplicationResult<Json<SearchOffersResponse>> {
    let outcome = state.aggregator.search(request, &state.credentials).await?;
    let reason = DegradeReason::for_mode(state.aggregator.transport_mode());
    Ok(Json(SearchOffersResponse::from_outcome(outcome, reason)))
}

/// `POST /api/v1/proxy`
///
/// Forwards the enveloped request to the provider. A 2xx response is passed
/// through unchanged; anything else becomes `{error, status, mockData}` with
/// the upstream status, or 502 when the provider could not be reached.
///
/// An envelope without identity headers is sent with the server's own
/// provider identity.
pub async fn proxy(
    State(state): State<Arc<AppState>>,
    envelope: Result<Json<ProxyEnvelope>, JsonRejection>,
) -> Response {
    let Json(envelope) = match envelope {
        Ok(envelope) => envelope,
        Err(rejection) => {
            return ApplicationError::validation(rejection.body_text()).into_response();
        }
    };
    let mut request = envelope.into_request();
    if !request.has_identity() {
        match state.credentials.validate() {
            Ok(identity) => request
                .headers
                .extend(ProviderCredentials::identity_headers(identity)),
            Err(e) => debug!(error = %e, "no server identity to attach"),
        }
    }
    match state.upstream.send(&state.credentials, &request).await {
        Ok(response) if response.is_success() => {
            let status = StatusCode::from_u16(response.status()).unwrap_or(StatusCode::OK);
            (status, Json(response.body().clone())).into_response()
        }
        Ok(response) => {
            let status =
                StatusCode::from_u16(response.status()).unwrap_or(StatusCode::BAD_GATEWAY);
            warn!(path = %request.path, status = status.as_u16(), "upstream returned error");
            let message = upstream_message(response.body(), status);
            proxy_failure(status, message, &state.mock_generator)
        }
        Err(e) => {
            warn!(path = %request.path, error = %e, "upstream unreachable");
            proxy_failure(StatusCode::BAD_GATEWAY, e.to_string(), &state.mock_generator)
        }
    }
}

fn upstream_message(body: &Value, status: StatusCode) -> String {
    body.get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("upstream returned {}", status))
}

fn proxy_failure(status: StatusCode, message: String, generator: &MockOfferGenerator) -> Response {
    let mut body = json!({
        "error": message,
        "status": status.as_u16(),
    });
    if let Some(fields) = body.as_object_mut() {
        fields.insert(
            MOCK_DATA_KEY.to_string(),
            Value::Array(generator.raw_records(&mut rand::rng())),
        );
    }
    (status, Json(body)).into_response()
}
