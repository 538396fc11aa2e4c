//! Router construction

use crate::{api::handlers, state::AppState};
use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/soap", post(handlers::receive))
        .route("/api/documents/:id/download", get(handlers::download_document))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
