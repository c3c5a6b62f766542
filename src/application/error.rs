//! # Application Errors
//!
//! Error types for the application layer.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Configuration(ConfigurationError) - Unusable provider credentials
//! ├── Domain(DomainError)               - Invalid search input
//! └── Validation(String)                - Malformed request bodies
//! ```
//!
//! The aggregator itself only ever reports [`ConfigurationError`]; remote
//! failures degrade to placeholder offers instead.

use crate::domain::errors::DomainError;
use thiserror::Error;

pub use crate::infrastructure::providers::credentials::ConfigurationError;

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Provider credentials are incomplete.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Domain error from input validation.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// Request body could not be decoded.
    #[error("validation error: {0}")]
    Validation(String),
}

impl ApplicationError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns true if the caller sent bad input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Domain(_))
    }

    /// Returns true if the provider credentials are unusable.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_converts() {
        let err: ApplicationError = ConfigurationError::MissingIdentity.into();
        assert!(err.is_configuration());
        assert!(!err.is_validation());
        assert!(err.to_string().contains("configuration"));
    }

    #[test]
    fn domain_error_is_validation() {
        let err: ApplicationError = DomainError::invalid_search("origin is empty").into();
        assert!(err.is_validation());
        assert!(err.to_string().contains("origin is empty"));
    }

    #[test]
    fn validation_helper() {
        let err = ApplicationError::validation("expected value at line 1");
        assert!(err.is_validation());
        assert!(err.to_string().starts_with("validation error"));
    }
}
