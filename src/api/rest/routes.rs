//! # REST Routes
//!
//! Router construction.

use crate::api::rest::handlers::{self, AppState};
use axum::Router;
use axum::http::{Method, header};
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the `/api/v1` router with CORS and request tracing.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/offers", get(handlers::list_offers))
        .route("/offers/search", post(handlers::search_offers))
        .route("/proxy", post(handlers::proxy));

    Router::new()
        .nest("/api/v1", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
