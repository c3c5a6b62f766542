//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! - [`SearchRequest`]: one validated travel insurance search
//! - [`Coverage`], [`CoverageType`]: insured amounts of an offer
//! - [`OfferId`], [`ProviderId`]: string-based identifiers

pub mod coverage;
pub mod ids;
pub mod search_request;

pub use coverage::{Coverage, CoverageType};
pub use ids::{OfferId, ProviderId};
pub use search_request::SearchRequest;
