use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index).fallback(handlers::method_not_allowed))
        .route(
            "/health",
            get(handlers::health_check).fallback(handlers::method_not_allowed),
        )
        // Recommendations
        .route(
            "/recommendations",
            get(handlers::list_recommendations)
                .post(handlers::create_recommendation)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/recommendations/:id",
            get(handlers::get_recommendation)
                .put(handlers::update_recommendation)
                .delete(handlers::delete_recommendation)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/recommendations/:id/like",
            put(handlers::like_recommendation).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::fallback)
        // Request id first so the trace span can carry it
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
