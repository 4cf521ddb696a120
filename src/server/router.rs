use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::server::handlers::{crawl, embed, health, search};
use crate::state::AppState;

/// Main application router: health probe plus the search, crawl, and
/// embed APIs, with CORS and request tracing layered on top.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/search", post(search::search))
        .route("/api/crawl", post(crawl::crawl))
        .route("/api/embed", post(embed::embed))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
