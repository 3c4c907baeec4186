//! Route table of the HTTP API

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers::*;
use super::types::AppState;

/// Prefix of every translation route
pub const API_PREFIX: &str = "/api/v1/translation";

/// Translation routes plus the root health probe
pub fn create_routes() -> Router<Arc<AppState>> {
    let api = Router::new()
        .route("/translate", post(translate))
        .route("/translate/batch", post(translate_batch))
        .route("/languages", get(languages))
        .route("/cache/clean", post(clean_cache))
        .route("/cache/stats", get(cache_stats));

    Router::new()
        .nest(API_PREFIX, api)
        .route("/health", get(health))
}
