use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Process liveness only; the completion service is checked by `/api/v1/ai/health`.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME")
    }))
}
