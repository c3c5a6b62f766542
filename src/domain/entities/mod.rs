//! # Domain Entities
//!
//! - [`Offer`]: priced insurance plan returned for a search

pub mod offer;

pub use offer::{DEFAULT_BENEFITS, Offer, OfferBuilder};
