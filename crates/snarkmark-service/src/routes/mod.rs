use crate::AppState;
use axum::{Json, Router, routing::get};

pub mod api;

async fn health() -> Json<&'static str> {
    Json("OK")
}

pub fn create_router<S: AppState>() -> Router<S> {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api::create_api_router())
}
