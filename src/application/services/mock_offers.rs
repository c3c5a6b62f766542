//! # Synthetic Offers
//!
//! Placeholder offers returned when the provider cannot be reached.
//!
//! The generator produces raw provider-shaped records; they go through the
//! same [`Normalizer`](super::normalization::Normalizer) as real records, so
//! synthetic offers satisfy every offer invariant. Prices and amounts are
//! random but bounded.

use rand::Rng;
use serde_json::{Value, json};

/// Plan names cycled through by the generator.
const PLAN_NAMES: [&str; 5] = [
    "Essential Travel",
    "Standard Travel",
    "Premium Travel",
    "Family Travel",
    "Elite Travel",
];

/// Benefits offered by the generated plans, cheapest tier first.
const TIER_BENEFITS: [&str; 6] = [
    "24/7 emergency assistance",
    "Telemedicine",
    "Baggage tracking",
    "Pre-existing condition coverage",
    "Sports coverage",
    "Concierge service",
];

/// Generates provider-shaped placeholder records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockOfferGenerator {
    batch_size: usize,
}

impl MockOfferGenerator {
    /// Creates a generator producing `batch_size` records per batch.
    ///
    /// A batch always holds at least one record.
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Returns the batch size.
    #[inline]
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Generates one batch of raw records.
    pub fn raw_records<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Value> {
        (0..self.batch_size)
            .map(|index| self.raw_record(index, rng))
            .collect()
    }

    fn raw_record<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> Value {
        let tier = index % PLAN_NAMES.len();
        let name = PLAN_NAMES.get(tier).copied().unwrap_or("Travel");
        let benefit_count = (tier + 2).min(TIER_BENEFITS.len());
        let benefits = TIER_BENEFITS.get(..benefit_count).unwrap_or_default();

        let price_cents: i64 = rng.random_range(10_000..40_000);
        let medical: i64 = rng.random_range(3..=25) * 10_000;
        let baggage: i64 = rng.random_range(5..=30) * 100;
        let cancellation: i64 = rng.random_range(2..=20) * 500;
        let delay: i64 = rng.random_range(2..=10) * 50;
        let rating_tenths: i64 = rng.random_range(40..50);

        json!({
            "id": format!("mock-{}", index + 1),
            "name": name,
            "price": format!("{}.{:02}", price_cents / 100, price_cents % 100),
            "coverages": [
                { "type": "medical", "value": medical },
                { "type": "baggage", "value": baggage },
                { "type": "cancellation", "value": cancellation },
                { "type": "delay", "value": delay },
            ],
            "benefits": benefits,
            "rating": format!("{}.{}", rating_tenths / 10, rating_tenths % 10),
        })
    }
}

impl Default for MockOfferGenerator {
    fn default() -> Self {
        Self::new(crate::infrastructure::config::DEFAULT_MOCK_BATCH_SIZE)
    }
}
