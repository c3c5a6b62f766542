//! # Infrastructure Layer
//!
//! Adapters to the outside world: the remote provider API and runtime
//! configuration.

pub mod config;
pub mod providers;
