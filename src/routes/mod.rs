use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Request},
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::services::{providers::ArticleSource, recommend::Recommender};

pub mod movies;

/// Mirrors the browser client's JSON body limit
const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Shared application state: the article source for direct lookups and the
/// recommendation orchestrator built on top of it
#[derive(Clone)]
pub struct AppState {
    pub articles: Arc<dyn ArticleSource>,
    pub recommender: Arc<Recommender>,
}

/// Creates the application router with all routes and middleware
pub fn create_router(state: AppState, client_url: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);
    let cors = match client_url.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!(origin = %client_url, "Invalid client origin, leaving CORS closed");
            cors
        }
    };

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .layer(cors)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .with_state(state)
}

/// API routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(movies::home))
        .route("/movies", post(movies::post_movie))
        .route("/movies/more", post(movies::more_movies))
}

/// Health check endpoint
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": "Movie recommendation API running...",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Tags every request span with a fresh request id so concurrent
/// orchestrations can be told apart in the logs
fn make_request_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %Uuid::new_v4(),
    )
}
