use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{
        auth_middleware, make_span_with_request_id, rate_limit_middleware, request_id_middleware,
        RateLimiter,
    },
    services::RecommendationService,
};

pub mod filter_options;
pub mod recommendations;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecommendationService>,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(service: RecommendationService, rate_limiter: RateLimiter) -> Self {
        Self {
            service: Arc::new(service),
            rate_limiter,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/filter-options", get(filter_options::options))
        .merge(recommendation_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(from_fn(auth_middleware)),
        )
}

/// Recommendation endpoints, rate limited per client
fn recommendation_routes(state: AppState) -> Router {
    Router::new()
        .route("/enhanced-recommendations", post(recommendations::enhanced))
        .route(
            "/enhanced-recommendations/filtered",
            post(recommendations::filtered),
        )
        .route_layer(from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
