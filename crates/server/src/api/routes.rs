use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, play, search, sources, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Source registry
        .route("/sources", get(sources::list_sources).post(sources::add_source))
        .route("/sources/{name}", delete(sources::remove_source))
        .route("/sources/{name}/categories", get(sources::list_categories))
        // Search sessions
        .route("/search", post(search::submit_search))
        .route("/search/current", get(search::current_search))
        // Playback
        .route("/play/{item_id}", get(play::resolve))
        // Live session events
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
