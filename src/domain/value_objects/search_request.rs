//! # Search Request
//!
//! Immutable description of one travel insurance search.
//!
//! A [`SearchRequest`] is built either from typed input with
//! [`SearchRequest::new`] or from URL query parameters with
//! [`SearchRequest::from_query`]. Once built it cannot change.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use insurance_offers::domain::value_objects::SearchRequest;
//!
//! let request = SearchRequest::new(
//!     "br",
//!     "EUROPE",
//!     NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2025, 7, 11).unwrap(),
//!     vec![34, 7],
//! )
//! .unwrap();
//!
//! assert_eq!(request.origin(), "BR");
//! assert_eq!(request.passenger_count(), 2);
//! assert_eq!(request.trip_days(), 11);
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Oldest passenger age accepted.
pub const MAX_PASSENGER_AGE: u8 = 120;

/// Date format used on the wire and in query strings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated travel insurance search.
///
/// # Invariants
///
/// - Origin and destination are non-empty and upper-cased
/// - `return_date >= departure_date`
/// - At least one passenger, every age at most [`MAX_PASSENGER_AGE`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    origin: String,
    destination: String,
    departure_date: NaiveDate,
    return_date: NaiveDate,
    passengers: Vec<u8>,
}

impl SearchRequest {
    /// Creates a validated search request.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSearch` if a region code is blank, the
    /// return date precedes the departure date, or there are no passengers.
    /// Returns `DomainError::InvalidAge` if an age exceeds [`MAX_PASSENGER_AGE`].
    pub fn new(
        origin: impl AsRef<str>,
        destination: impl AsRef<str>,
        departure_date: NaiveDate,
        return_date: NaiveDate,
        passengers: Vec<u8>,
    ) -> DomainResult<Self> {
        let origin = normalize_region(origin.as_ref(), "origin")?;
        let destination = normalize_region(destination.as_ref(), "destination")?;

        if return_date < departure_date {
            return Err(DomainError::invalid_search(format!(
                "return date {} precedes departure date {}",
                return_date, departure_date
            )));
        }
        if passengers.is_empty() {
            return Err(DomainError::invalid_search(
                "at least one passenger is required",
            ));
        }
        if let Some(age) = passengers.iter().find(|age| **age > MAX_PASSENGER_AGE) {
            return Err(DomainError::invalid_age(format!(
                "{} exceeds maximum of {}",
                age, MAX_PASSENGER_AGE
            )));
        }

        Ok(Self {
            origin,
            destination,
            departure_date,
            return_date,
            passengers,
        })
    }

    /// Builds a search request from URL query parameters.
    ///
    /// Recognized keys are `origin`, `destination`, `departureDate` (or
    /// `departure_date`), `returnDate` (or `return_date`) and `ages` (or
    /// `passengers`) as a comma-separated list of ages.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSearch` for missing parameters,
    /// `DomainError::InvalidDate` for malformed dates and
    /// `DomainError::InvalidAge` for malformed ages, plus every error of
    /// [`SearchRequest::new`].
    pub fn from_query(params: &HashMap<String, String>) -> DomainResult<Self> {
        let lookup = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| params.get(*key))
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };

        let origin = lookup(&["origin"])
            .ok_or_else(|| DomainError::invalid_search("missing 'origin' parameter"))?;
        let destination = lookup(&["destination"])
            .ok_or_else(|| DomainError::invalid_search("missing 'destination' parameter"))?;
        let departure = lookup(&["departureDate", "departure_date"])
            .ok_or_else(|| DomainError::invalid_search("missing 'departureDate' parameter"))?;
        let return_date = lookup(&["returnDate", "return_date"])
            .ok_or_else(|| DomainError::invalid_search("missing 'returnDate' parameter"))?;
        let ages = lookup(&["ages", "passengers"])
            .ok_or_else(|| DomainError::invalid_search("missing 'ages' parameter"))?;

        Self::new(
            origin,
            destination,
            parse_date(departure)?,
            parse_date(return_date)?,
            parse_ages(ages)?,
        )
    }

    /// Returns the origin region code.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Returns the destination region code.
    #[inline]
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Returns the departure date.
    #[inline]
    #[must_use]
    pub fn departure_date(&self) -> NaiveDate {
        self.departure_date
    }

    /// Returns the return date.
    #[inline]
    #[must_use]
    pub fn return_date(&self) -> NaiveDate {
        self.return_date
    }

    /// Returns passenger ages in the order given.
    #[inline]
    #[must_use]
    pub fn passengers(&self) -> &[u8] {
        &self.passengers
    }

    /// Returns the number of passengers.
    #[inline]
    #[must_use]
    pub fn passenger_count(&self) -> usize {
        self.passengers.len()
    }

    /// Returns the trip length in days, counting both travel dates.
    #[must_use]
    pub fn trip_days(&self) -> i64 {
        (self.return_date - self.departure_date).num_days() + 1
    }
}

fn normalize_region(value: &str, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_search(format!("{} is required", field)));
    }
    Ok(trimmed.to_uppercase())
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `DomainError::InvalidDate` if the value is not a valid date.
pub fn parse_date(value: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| DomainError::invalid_date(value))
}

/// Parses a comma-separated list of ages.
///
/// # Errors
///
/// Returns `DomainError::InvalidAge` if any entry is not a number in `0..=255`.
pub fn parse_ages(value: &str) -> DomainResult<Vec<u8>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u8>()
                .map_err(|_| DomainError::invalid_age(part.to_string()))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_uppercases_regions() {
        let request =
            SearchRequest::new(" br ", "europe", date(2025, 1, 1), date(2025, 1, 1), vec![30])
                .unwrap();
        assert_eq!(request.origin(), "BR");
        assert_eq!(request.destination(), "EUROPE");
        assert_eq!(request.trip_days(), 1);
    }

    #[test]
    fn new_rejects_return_before_departure() {
        let result =
            SearchRequest::new("BR", "EUROPE", date(2025, 1, 10), date(2025, 1, 1), vec![30]);
        assert!(matches!(result, Err(DomainError::InvalidSearch(_))));
    }

    #[test]
    fn new_rejects_empty_passengers() {
        let result =
            SearchRequest::new("BR", "EUROPE", date(2025, 1, 1), date(2025, 1, 2), vec![]);
        assert!(matches!(result, Err(DomainError::InvalidSearch(_))));
    }

    #[test]
    fn new_rejects_blank_destination() {
        let result = SearchRequest::new("BR", "  ", date(2025, 1, 1), date(2025, 1, 2), vec![1]);
        assert!(matches!(result, Err(DomainError::InvalidSearch(_))));
    }

    #[test]
    fn new_rejects_excessive_age() {
        let result =
            SearchRequest::new("BR", "EUROPE", date(2025, 1, 1), date(2025, 1, 2), vec![121]);
        assert!(matches!(result, Err(DomainError::InvalidAge(_))));
    }

    #[test]
    fn from_query_accepts_both_casings() {
        let params: HashMap<String, String> = [
            ("origin", "BR"),
            ("destination", "EUROPE"),
            ("departure_date", "2025-07-01"),
            ("returnDate", "2025-07-11"),
            ("ages", "34, 7"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let request = SearchRequest::from_query(&params).unwrap();
        assert_eq!(request.passengers(), &[34, 7]);
        assert_eq!(request.departure_date(), date(2025, 7, 1));
        assert_eq!(request.trip_days(), 11);
    }

    #[test]
    fn from_query_reports_missing_parameter() {
        let params: HashMap<String, String> =
            [("origin".to_string(), "BR".to_string())].into_iter().collect();
        let err = SearchRequest::from_query(&params).unwrap_err();
        assert!(err.to_string().contains("destination"));
    }

    #[test]
    fn from_query_reports_bad_date() {
        let params: HashMap<String, String> = [
            ("origin", "BR"),
            ("destination", "EUROPE"),
            ("departureDate", "01/07/2025"),
            ("returnDate", "2025-07-11"),
            ("ages", "34"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert!(matches!(
            SearchRequest::from_query(&params),
            Err(DomainError::InvalidDate { .. })
        ));
    }

    #[test]
    fn parse_ages_rejects_garbage() {
        assert!(parse_ages("34,x").is_err());
        assert_eq!(parse_ages("1,,2").unwrap(), vec![1, 2]);
    }

    proptest! {
        #[test]
        fn trip_days_matches_offset(offset in 0i64..365, ages in prop::collection::vec(0u8..=120, 1..6)) {
            let departure = date(2025, 1, 1);
            let return_date = departure + chrono::Duration::days(offset);
            let request = SearchRequest::new("BR", "US", departure, return_date, ages.clone()).unwrap();
            prop_assert_eq!(request.trip_days(), offset + 1);
            prop_assert_eq!(request.passenger_count(), ages.len());
        }
    }
}
