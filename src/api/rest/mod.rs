//! # REST API
//!
//! REST endpoints using axum.
//!
//! # Endpoints
//!
//! ## Offers
//! - `POST /api/v1/offers/search` - Search with a JSON body
//! - `GET /api/v1/offers` - Search with query parameters
//!
//! ## Proxy
//! - `POST /api/v1/proxy` - Forward an enveloped request to the provider
//!
//! ## Health
//! - `GET /api/v1/health` - Health check endpoint
//!
//! # Usage
//!
//! ```ignore
//! use insurance_offers::api::rest::{create_router, AppState};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState {
//!     aggregator: /* ... */,
//!     credentials: /* ... */,
//!     upstream: /* ... */,
//!     mock_generator: MockOfferGenerator::default(),
//! });
//!
//! let router = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    AppState, ErrorResponse, HealthResponse, SearchOffersRequest, SearchOffersResponse,
};
pub use routes::create_router;
