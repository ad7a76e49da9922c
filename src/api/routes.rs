use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Users
        .route("/users", post(handlers::create_user))
        .route("/users/", post(handlers::create_user))
        .route("/users/:user_id", get(handlers::get_user))
        .route("/users/:user_id/watched", get(handlers::watch_history))
        .route(
            "/users/:user_id/watch/:content_id",
            post(handlers::mark_content_watched),
        )
        .route(
            "/users/:user_id/recommendations",
            get(handlers::get_recommendations),
        )
        // Content
        .route(
            "/content",
            get(handlers::list_content).post(handlers::create_content),
        )
        .route("/content/", post(handlers::create_content))
        .route("/content/:content_id", get(handlers::get_content))
        // the trace span reads the request id, so the id layer runs first
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
