// --- File: crates/estately_common/src/routes.rs ---

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Routes shared by every deployment (currently the liveness probe).
pub fn routes() -> Router {
    Router::new().route("/health", get(health_handler))
}
