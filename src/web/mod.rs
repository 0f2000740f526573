pub mod survey;

use crate::state::SharedState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

async fn health() -> &'static str {
    "OK"
}

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", survey::router(state))
}

/// Full application router with request tracing.
pub fn app(state: SharedState) -> Router {
    routes(state).layer(TraceLayer::new_for_http())
}
