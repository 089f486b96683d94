//! Route configuration.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the application router.
///
/// The trailing-slash variants of the read routes are the paths older
/// clients request.
pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/", get(handlers::root))
        .route(
            "/api/events",
            get(handlers::list_events)
                .post(handlers::create_events)
                .put(handlers::update_event)
                .delete(handlers::delete_events),
        )
        .route("/api/events/", get(handlers::list_events))
        .route(
            "/api/images",
            get(handlers::fetch_image)
                .post(handlers::upload_image)
                .delete(handlers::delete_image),
        )
        .route("/api/images/", get(handlers::fetch_image))
        .route("/api/images/info", post(handlers::storage_info))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        // Middleware layers are applied in reverse order (outermost last).
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
