//! # Application Layer
//!
//! Use cases built on the domain model and the provider infrastructure.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
