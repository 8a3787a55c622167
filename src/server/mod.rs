//! HTTP surface: the search page, the JSON search endpoint, and a liveness probe.

mod errors;
mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::pipeline::FundingSearch;

pub fn router<P: FundingSearch>(pipeline: Arc<P>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/search", get(handlers::search::<P>))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}
