//! # Offer Entity
//!
//! One priced insurance plan returned for a search.
//!
//! Offers are created fresh per search and never persisted.
//!
//! # Examples
//!
//! ```
//! use insurance_offers::domain::entities::offer::OfferBuilder;
//! use insurance_offers::domain::value_objects::{OfferId, ProviderId};
//! use rust_decimal::Decimal;
//!
//! let offer = OfferBuilder::new(
//!     OfferId::new("plan-60"),
//!     ProviderId::default(),
//!     "UA 60 Europa",
//!     Decimal::new(18990, 2),
//! )
//! .benefits(vec!["Telemedicine".to_string()])
//! .rating(Decimal::new(62, 1))
//! .build();
//!
//! assert!(!offer.is_recommended());
//! assert_eq!(offer.benefits().len(), 1);
//! assert_eq!(offer.rating(), Some(Decimal::from(5)));
//! ```

use crate::domain::value_objects::{Coverage, OfferId, ProviderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Benefits attached to an offer when the provider lists none.
pub const DEFAULT_BENEFITS: [&str; 4] = [
    "24/7 emergency assistance",
    "Medical and hospital expenses",
    "Baggage loss protection",
    "Trip cancellation coverage",
];

/// Highest rating an offer can carry.
pub const MAX_RATING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// A priced insurance plan option.
///
/// # Invariants
///
/// - Price is non-negative
/// - Benefits list is non-empty
/// - Rating, when present, lies in `[0, 5]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    id: OfferId,
    provider_id: ProviderId,
    name: String,
    price: Decimal,
    coverage: Coverage,
    benefits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rating: Option<Decimal>,
    recommended: bool,
}

impl Offer {
    /// Returns the offer ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &OfferId {
        &self.id
    }

    /// Returns the provider tag.
    #[inline]
    #[must_use]
    pub fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    /// Returns the display name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the price in the provider's currency.
    #[inline]
    #[must_use]
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Returns the insured amounts.
    #[inline]
    #[must_use]
    pub fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    /// Returns the benefits in provider order.
    #[inline]
    #[must_use]
    pub fn benefits(&self) -> &[String] {
        &self.benefits
    }

    /// Returns the rating, if any.
    #[inline]
    #[must_use]
    pub fn rating(&self) -> Option<Decimal> {
        self.rating
    }

    /// Returns true if this offer is flagged as the recommended one.
    #[inline]
    #[must_use]
    pub fn is_recommended(&self) -> bool {
        self.recommended
    }

    /// Sets the recommended flag.
    pub fn set_recommended(&mut self, recommended: bool) {
        self.recommended = recommended;
    }

    /// Replaces the offer ID.
    pub fn set_id(&mut self, id: OfferId) {
        self.id = id;
    }
}

impl fmt::Display for Offer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Offer({} {} @ {})", self.id, self.name, self.price)
    }
}

/// Builder for [`Offer`].
#[derive(Debug, Clone)]
pub struct OfferBuilder {
    id: OfferId,
    provider_id: ProviderId,
    name: String,
    price: Decimal,
    coverage: Coverage,
    benefits: Vec<String>,
    rating: Option<Decimal>,
    recommended: bool,
}

impl OfferBuilder {
    /// Creates a builder with default coverage and benefits.
    #[must_use]
    pub fn new(
        id: OfferId,
        provider_id: ProviderId,
        name: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            id,
            provider_id,
            name: name.into(),
            price,
            coverage: Coverage::default(),
            benefits: Vec::new(),
            rating: None,
            recommended: false,
        }
    }

    /// Sets the coverage.
    #[must_use]
    pub fn coverage(mut self, coverage: Coverage) -> Self {
        self.coverage = coverage;
        self
    }

    /// Sets the benefits. An empty list falls back to [`DEFAULT_BENEFITS`].
    #[must_use]
    pub fn benefits(mut self, benefits: Vec<String>) -> Self {
        self.benefits = benefits;
        self
    }

    /// Sets the rating.
    #[must_use]
    pub fn rating(mut self, rating: Decimal) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Sets the recommended flag.
    #[must_use]
    pub fn recommended(mut self, recommended: bool) -> Self {
        self.recommended = recommended;
        self
    }

    /// Builds the offer, clamping a negative price to zero and the rating
    /// into `[0, 5]`.
    #[must_use]
    pub fn build(mut self) -> Offer {
        if self.price < Decimal::ZERO {
            self.price = Decimal::ZERO;
        }
        self.rating = self
            .rating
            .map(|rating| rating.clamp(Decimal::ZERO, MAX_RATING));

        let benefits = if self.benefits.is_empty() {
            DEFAULT_BENEFITS.iter().map(|b| (*b).to_string()).collect()
        } else {
            self.benefits
        };

        Offer {
            id: self.id,
            provider_id: self.provider_id,
            name: self.name,
            price: self.price,
            coverage: self.coverage,
            benefits,
            rating: self.rating,
            recommended: self.recommended,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn builder(price: Decimal) -> OfferBuilder {
        OfferBuilder::new(OfferId::new("o-1"), ProviderId::default(), "Plan", price)
    }

    #[test]
    fn empty_benefits_fall_back_to_defaults() {
        let offer = builder(Decimal::from(120)).build();
        assert_eq!(offer.benefits().len(), DEFAULT_BENEFITS.len());
    }

    #[test]
    fn negative_price_is_clamped_to_zero() {
        assert_eq!(builder(Decimal::from(-1)).build().price(), Decimal::ZERO);
        assert_eq!(builder(Decimal::ZERO).build().price(), Decimal::ZERO);
    }

    #[test]
    fn rating_is_clamped_into_range() {
        let high = builder(Decimal::ONE).rating(Decimal::from(9)).build();
        assert_eq!(high.rating(), Some(MAX_RATING));

        let low = builder(Decimal::ONE).rating(Decimal::from(-2)).build();
        assert_eq!(low.rating(), Some(Decimal::ZERO));

        let valid = builder(Decimal::ONE).rating(Decimal::new(45, 1)).build();
        assert_eq!(valid.rating(), Some(Decimal::new(45, 1)));
    }

    #[test]
    fn serializes_camel_case() {
        let offer = builder(Decimal::from(99)).recommended(true).build();
        let json = serde_json::to_value(&offer).unwrap();
        assert_eq!(json["providerId"], "universal-assistance");
        assert_eq!(json["recommended"], true);
        assert!(json.get("rating").is_none());
    }

    #[test]
    fn display_contains_name() {
        let offer = builder(Decimal::from(99)).build();
        assert!(offer.to_string().contains("Plan"));
    }
}
