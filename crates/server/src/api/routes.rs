use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{archive, handlers, media, middleware::metrics_middleware, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Real-time status updates
        .route("/ws", get(ws::ws_handler))
        // Media operations
        .route("/media/strip", post(media::strip_metadata))
        .route("/media/metadata", post(media::rewrite_metadata))
        .route("/media/sample", post(media::extract_sample))
        .route("/media/attach", post(media::attach_file))
        .route("/media/merge", post(media::merge))
        .route("/media/compress", post(media::compress))
        .route("/media/jobs/{id}", get(media::get_job))
        // Archives
        .route("/archive/extract", post(archive::extract));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
