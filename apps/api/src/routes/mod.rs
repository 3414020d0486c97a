pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::intelligence::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis
        .route("/api/v1/ai/analyze", post(handlers::handle_analyze))
        .route("/api/v1/ai/ats-check", post(handlers::handle_ats_check))
        // Enhancement
        .route("/api/v1/ai/enhance", post(handlers::handle_enhance))
        .route("/api/v1/ai/summary", post(handlers::handle_summary))
        .route("/api/v1/ai/batch", post(handlers::handle_batch))
        // Service
        .route("/api/v1/ai/health", get(handlers::handle_ai_health))
        .route("/api/v1/ai/status", get(handlers::handle_ai_status))
        .with_state(state)
}
