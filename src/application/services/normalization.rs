//! # Offer Normalization
//!
//! Converts arbitrarily shaped provider records into [`Offer`]s.
//!
//! Every field is read through the key-list helpers in
//! [`fields`](crate::infrastructure::providers::fields); a missing or
//! malformed field is replaced by its default and never raises an error.
//!
//! | Field    | Sources, in order                                               | Fallback                  |
//! |----------|-----------------------------------------------------------------|---------------------------|
//! | coverage | `coberturas`/`coverages` entries, then `coverage<Type>`          | per-type default          |
//! | benefits | `benefits`/`beneficios`, then `features`                         | [`DEFAULT_BENEFITS`]      |
//! | price    | `price`, `total`, `valorBruto`                                   | random in `[100, 400)`    |
//! | rating   | `rating`, `avaliacao`, `score`                                   | random in `[4.0, 5.0)`    |
//! | id       | `id`, `codigo`, `code`, `planId`                                 | random UUID               |
//! | name     | `name`, `nome`, `title`, `planName`                              | `Plan <n>`                |
//!
//! [`DEFAULT_BENEFITS`]: crate::domain::entities::DEFAULT_BENEFITS

use crate::domain::entities::{Offer, OfferBuilder};
use crate::domain::entities::offer::MAX_RATING;
use crate::domain::value_objects::{Coverage, CoverageType, OfferId, ProviderId};
use crate::infrastructure::providers::fields::{
    first_array, first_string, parse_decimal, value_as_string,
};
use rand::Rng;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashSet;

const ID_KEYS: &[&str] = &["id", "codigo", "code", "planId"];
const NAME_KEYS: &[&str] = &["name", "nome", "title", "planName"];
const PRICE_KEYS: &[&str] = &["price", "total", "valorBruto"];
const RATING_KEYS: &[&str] = &["rating", "avaliacao", "score"];
const COVERAGE_LIST_KEYS: &[&str] = &["coberturas", "coverages"];
const COVERAGE_LABEL_KEYS: &[&str] = &["type", "tipo", "name", "nome"];
const COVERAGE_VALUE_KEYS: &[&str] = &["value", "valor", "amount"];
const BENEFIT_LIST_KEYS: &[&str] = &["benefits", "beneficios"];
const FEATURE_LIST_KEYS: &[&str] = &["features"];
const BENEFIT_LABEL_KEYS: &[&str] = &["name", "nome", "description", "descricao"];

/// Price substituted when a record carries none, in cents.
const FALLBACK_PRICE_CENTS: std::ops::Range<i64> = 10_000..40_000;

/// Rating substituted when a record carries none, in tenths.
const FALLBACK_RATING_TENTHS: std::ops::Range<i64> = 40..50;

/// Turns raw provider records into offers.
#[derive(Debug, Clone)]
pub struct Normalizer {
    provider_id: ProviderId,
}

impl Normalizer {
    /// Creates a normalizer stamping offers with `provider_id`.
    #[must_use]
    pub fn new(provider_id: ProviderId) -> Self {
        Self { provider_id }
    }

    /// Returns the provider tag.
    #[inline]
    #[must_use]
    pub fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    /// Normalizes one record. The result is never flagged recommended.
    pub fn normalize<R: Rng + ?Sized>(&self, raw: &Value, rng: &mut R) -> Offer {
        self.normalize_at(raw, 0, rng)
    }

    /// Normalizes a batch.
    ///
    /// IDs are made unique within the batch and exactly the first offer is
    /// flagged recommended.
    pub fn normalize_batch<R: Rng + ?Sized>(&self, records: &[Value], rng: &mut R) -> Vec<Offer> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut offers = Vec::with_capacity(records.len());

        for (index, raw) in records.iter().enumerate() {
            let mut offer = self.normalize_at(raw, index, rng);

            if seen.contains(offer.id().as_str()) {
                let mut candidate = format!("{}-{}", offer.id(), index);
                while seen.contains(&candidate) {
                    candidate.push('x');
                }
                offer.set_id(OfferId::new(candidate));
            }
            seen.insert(offer.id().as_str().to_string());

            offer.set_recommended(index == 0);
            offers.push(offer);
        }

        offers
    }

    fn normalize_at<R: Rng + ?Sized>(&self, raw: &Value, index: usize, rng: &mut R) -> Offer {
        let id = first_string(raw, ID_KEYS)
            .map(OfferId::new)
            .unwrap_or_else(OfferId::generate);
        let name = first_string(raw, NAME_KEYS).unwrap_or_else(|| format!("Plan {}", index + 1));
        let price = extract_price(raw).unwrap_or_else(|| random_price(rng));
        let rating = extract_rating(raw).unwrap_or_else(|| random_rating(rng));

        OfferBuilder::new(id, self.provider_id.clone(), name, price)
            .coverage(extract_coverage(raw))
            .benefits(extract_benefits(raw))
            .rating(rating)
            .build()
    }
}

/// Reads the standard amounts and extra named amounts of a record.
#[must_use]
pub fn extract_coverage(raw: &Value) -> Coverage {
    let entries = first_array(raw, COVERAGE_LIST_KEYS)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let amount = |coverage_type: CoverageType| {
        nested_amount(entries, coverage_type)
            .or_else(|| non_negative(raw.get(coverage_type.flat_field())))
            .unwrap_or_else(|| coverage_type.default_amount())
    };

    let mut coverage = Coverage::new(
        amount(CoverageType::Medical),
        amount(CoverageType::Baggage),
        amount(CoverageType::Cancellation),
        amount(CoverageType::Delay),
    );

    for entry in entries {
        let labels = entry_labels(entry);
        let is_standard = CoverageType::ALL
            .iter()
            .any(|coverage_type| labels.iter().any(|label| coverage_type.matches(label)));
        if is_standard {
            continue;
        }
        if let (Some(label), Some(value)) = (labels.first(), entry_value(entry)) {
            coverage = coverage.with_extra(label.clone(), value);
        }
    }

    coverage
}

/// Reads the benefit labels of a record, or the default list.
#[must_use]
pub fn extract_benefits(raw: &Value) -> Vec<String> {
    [BENEFIT_LIST_KEYS, FEATURE_LIST_KEYS]
        .into_iter()
        .filter_map(|keys| first_array(raw, keys))
        .map(|items| items.iter().filter_map(benefit_label).collect::<Vec<_>>())
        .find(|labels| !labels.is_empty())
        .unwrap_or_else(|| {
            crate::domain::entities::DEFAULT_BENEFITS
                .iter()
                .map(|b| (*b).to_string())
                .collect()
        })
}

fn extract_price(raw: &Value) -> Option<Decimal> {
    PRICE_KEYS
        .iter()
        .find_map(|key| non_negative(raw.get(*key)))
}

fn extract_rating(raw: &Value) -> Option<Decimal> {
    RATING_KEYS.iter().find_map(|key| {
        non_negative(raw.get(*key)).filter(|rating| *rating <= MAX_RATING)
    })
}

fn random_price<R: Rng + ?Sized>(rng: &mut R) -> Decimal {
    Decimal::new(rng.random_range(FALLBACK_PRICE_CENTS), 2)
}

fn random_rating<R: Rng + ?Sized>(rng: &mut R) -> Decimal {
    Decimal::new(rng.random_range(FALLBACK_RATING_TENTHS), 1)
}

fn non_negative(value: Option<&Value>) -> Option<Decimal> {
    value
        .and_then(parse_decimal)
        .filter(|amount| *amount >= Decimal::ZERO)
}

fn entry_labels(entry: &Value) -> Vec<String> {
    COVERAGE_LABEL_KEYS
        .iter()
        .filter_map(|key| entry.get(*key))
        .filter_map(value_as_string)
        .collect()
}

fn entry_value(entry: &Value) -> Option<Decimal> {
    COVERAGE_VALUE_KEYS
        .iter()
        .find_map(|key| non_negative(entry.get(*key)))
}

fn nested_amount(entries: &[Value], coverage_type: CoverageType) -> Option<Decimal> {
    entries
        .iter()
        .filter(|entry| {
            entry_labels(entry)
                .iter()
                .any(|label| coverage_type.matches(label))
        })
        .find_map(entry_value)
}

fn benefit_label(item: &Value) -> Option<String> {
    match item {
        Value::String(_) => value_as_string(item),
        Value::Object(_) => first_string(item, BENEFIT_LABEL_KEYS),
        _ => None,
    }
}
