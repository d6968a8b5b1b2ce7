//! HTTP router configuration.

use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Builds the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS: the API is read-only computation over public data.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/visibility", post(handlers::assess_visibility))
        .route("/visibility/batch", post(handlers::sweep_network));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::ephemeris::ScriptedEphemeris;

    #[test]
    fn test_router_creation() {
        let state = AppState::new(
            Arc::new(ScriptedEphemeris::default()),
            Config::default(),
            Vec::new(),
        );
        let _router = create_router(state);
    }
}
