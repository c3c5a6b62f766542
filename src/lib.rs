//! # Insurance Offers
//!
//! Best-effort travel insurance offer aggregation over a remote provider API
//! whose endpoints and field names are not documented.
//!
//! Given a [`SearchRequest`](domain::value_objects::SearchRequest) and
//! [`ProviderCredentials`](infrastructure::providers::ProviderCredentials), the
//! [`ProviderAggregator`](application::services::ProviderAggregator) probes a
//! table of endpoint paths and payload shapes one at a time, normalizes the
//! first usable plan list into [`Offer`](domain::entities::Offer)s, and falls
//! back to placeholder offers when nothing works.
//!
//! # Layers
//!
//! - [`domain`]: search requests, offers, coverage
//! - [`application`]: aggregation, normalization, probe plan, degrade notices
//! - [`infrastructure`]: HTTP transports, credentials, configuration
//! - [`api`]: axum REST surface and the edge-function proxy
//!
//! # Example
//!
//! ```ignore
//! use insurance_offers::application::services::{
//!     AggregatorConfig, ProviderAggregator, TracingNotifier,
//! };
//! use insurance_offers::infrastructure::providers::{
//!     DirectTransport, HttpClient, ProviderCredentials,
//! };
//! use std::sync::Arc;
//!
//! let transport = Arc::new(DirectTransport::new(HttpClient::new(10_000)?));
//! let aggregator = ProviderAggregator::new(
//!     transport,
//!     Arc::new(TracingNotifier),
//!     AggregatorConfig::default(),
//! );
//! let credentials = ProviderCredentials::with_api_key("https://api.example.com", "key");
//! let offers = aggregator.fetch_offers(&request, &credentials).await?;
//! ```

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
