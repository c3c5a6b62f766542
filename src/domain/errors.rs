//! # Domain Errors
//!
//! Error types for domain validation.
//!
//! # Examples
//!
//! ```
//! use insurance_offers::domain::errors::DomainError;
//!
//! let err = DomainError::invalid_search("return date precedes departure");
//! assert!(err.to_string().contains("return date"));
//! ```

use thiserror::Error;

/// Error raised when a domain value cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A search request failed validation.
    #[error("invalid search request: {0}")]
    InvalidSearch(String),

    /// A travel date could not be parsed.
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },

    /// A passenger age is out of range or not a number.
    #[error("invalid passenger age: {0}")]
    InvalidAge(String),
}

impl DomainError {
    /// Creates an invalid search error.
    #[must_use]
    pub fn invalid_search(message: impl Into<String>) -> Self {
        Self::InvalidSearch(message.into())
    }

    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }

    /// Creates an invalid age error.
    #[must_use]
    pub fn invalid_age(message: impl Into<String>) -> Self {
        Self::InvalidAge(message.into())
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_date_display() {
        let err = DomainError::invalid_date("2024-13-01");
        assert_eq!(
            err.to_string(),
            "invalid date '2024-13-01': expected YYYY-MM-DD"
        );
    }

    #[test]
    fn invalid_age_display() {
        let err = DomainError::invalid_age("abc");
        assert!(err.to_string().contains("abc"));
    }
}
