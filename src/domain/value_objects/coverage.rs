//! # Coverage
//!
//! Insured amounts attached to an offer.
//!
//! Every [`Coverage`] carries the four standard amounts of a travel plan plus
//! any extra named amounts the provider reported.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Standard coverage categories of a travel insurance plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageType {
    /// Medical and hospital expenses.
    Medical,
    /// Lost or damaged baggage.
    Baggage,
    /// Trip cancellation.
    Cancellation,
    /// Flight or baggage delay.
    Delay,
}

impl CoverageType {
    /// All standard categories, in display order.
    pub const ALL: [CoverageType; 4] = [
        Self::Medical,
        Self::Baggage,
        Self::Cancellation,
        Self::Delay,
    ];

    /// Amount used when the provider does not report this category.
    #[must_use]
    pub fn default_amount(&self) -> Decimal {
        match self {
            Self::Medical => Decimal::from(50_000),
            Self::Baggage => Decimal::from(1_200),
            Self::Cancellation => Decimal::from(3_000),
            Self::Delay => Decimal::from(200),
        }
    }

    /// Lower-case fragments that identify this category in provider labels.
    ///
    /// Providers label coverages in English or Portuguese.
    #[must_use]
    pub fn match_terms(&self) -> &'static [&'static str] {
        match self {
            Self::Medical => &["medic", "médic", "saude", "saúde", "hospital"],
            Self::Baggage => &["bagag", "baggage", "luggage"],
            Self::Cancellation => &["cancel"],
            Self::Delay => &["atraso", "delay"],
        }
    }

    /// Name of the flat record field carrying this amount.
    #[must_use]
    pub fn flat_field(&self) -> &'static str {
        match self {
            Self::Medical => "coverageMedical",
            Self::Baggage => "coverageBaggage",
            Self::Cancellation => "coverageCancellation",
            Self::Delay => "coverageDelay",
        }
    }

    /// Returns true if `label` names this category.
    #[must_use]
    pub fn matches(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.match_terms().iter().any(|term| label.contains(term))
    }
}

impl fmt::Display for CoverageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Medical => write!(f, "medical"),
            Self::Baggage => write!(f, "baggage"),
            Self::Cancellation => write!(f, "cancellation"),
            Self::Delay => write!(f, "delay"),
        }
    }
}

/// Insured amounts of an offer.
///
/// The four standard amounts are always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    medical: Decimal,
    baggage: Decimal,
    cancellation: Decimal,
    delay: Decimal,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    extras: BTreeMap<String, Decimal>,
}

impl Coverage {
    /// Creates a coverage from the four standard amounts.
    #[must_use]
    pub fn new(medical: Decimal, baggage: Decimal, cancellation: Decimal, delay: Decimal) -> Self {
        Self {
            medical,
            baggage,
            cancellation,
            delay,
            extras: BTreeMap::new(),
        }
    }

    /// Adds an extra named amount.
    #[must_use]
    pub fn with_extra(mut self, name: impl Into<String>, amount: Decimal) -> Self {
        self.extras.insert(name.into(), amount);
        self
    }

    /// Returns the amount for a standard category.
    #[must_use]
    pub fn amount(&self, coverage_type: CoverageType) -> Decimal {
        match coverage_type {
            CoverageType::Medical => self.medical,
            CoverageType::Baggage => self.baggage,
            CoverageType::Cancellation => self.cancellation,
            CoverageType::Delay => self.delay,
        }
    }

    /// Returns the medical amount.
    #[inline]
    #[must_use]
    pub fn medical(&self) -> Decimal {
        self.medical
    }

    /// Returns the baggage amount.
    #[inline]
    #[must_use]
    pub fn baggage(&self) -> Decimal {
        self.baggage
    }

    /// Returns the cancellation amount.
    #[inline]
    #[must_use]
    pub fn cancellation(&self) -> Decimal {
        self.cancellation
    }

    /// Returns the delay amount.
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Decimal {
        self.delay
    }

    /// Returns extra named amounts.
    #[inline]
    #[must_use]
    pub fn extras(&self) -> &BTreeMap<String, Decimal> {
        &self.extras
    }
}

impl Default for Coverage {
    fn default() -> Self {
        Self::new(
            CoverageType::Medical.default_amount(),
            CoverageType::Baggage.default_amount(),
            CoverageType::Cancellation.default_amount(),
            CoverageType::Delay.default_amount(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_portuguese_and_english_labels() {
        assert!(CoverageType::Medical.matches("Despesas Médicas e Hospitalares"));
        assert!(CoverageType::Medical.matches("MEDICAL EXPENSES"));
        assert!(CoverageType::Baggage.matches("Extravio de Bagagem"));
        assert!(CoverageType::Delay.matches("Atraso de voo"));
        assert!(!CoverageType::Cancellation.matches("Seguro bagagem"));
    }

    #[test]
    fn default_coverage_uses_category_defaults() {
        let coverage = Coverage::default();
        for coverage_type in CoverageType::ALL {
            assert_eq!(coverage.amount(coverage_type), coverage_type.default_amount());
        }
        assert!(coverage.extras().is_empty());
    }

    #[test]
    fn with_extra_records_amount() {
        let coverage = Coverage::default().with_extra("sports", Decimal::from(5_000));
        assert_eq!(coverage.extras().get("sports"), Some(&Decimal::from(5_000)));
    }
}
