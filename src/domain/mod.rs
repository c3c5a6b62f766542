//! # Domain Layer
//!
//! Search requests, offers and their validation rules. Nothing in this
//! layer performs I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;
