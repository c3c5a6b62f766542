//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! This module provides application-level services including:
//! - [`ProviderAggregator`]: Sequential provider probing with degradation
//! - [`Normalizer`]: Raw provider records to [`Offer`](crate::domain::entities::Offer)s
//! - [`ProbePlan`]: Ordered endpoint and payload attempts
//! - [`MockOfferGenerator`]: Placeholder offers
//! - [`DegradeNotifier`]: User-facing degrade warnings

pub mod mock_offers;
pub mod normalization;
pub mod notifier;
pub mod offer_aggregation;
pub mod probe_plan;

pub use mock_offers::MockOfferGenerator;
pub use normalization::Normalizer;
pub use notifier::{
    DegradeNotice, DegradeNotifier, DegradeReason, RecordingNotifier, TracingNotifier,
};
pub use offer_aggregation::{
    AggregatorConfig, OfferSource, PLACEHOLDER_TOKEN, ProviderAggregator, SearchOutcome,
};
pub use probe_plan::{ProbePlan, ProbeStep};
