use axum::Json;
use serde_json::{json, Value};

use crate::services::metrics::get_metrics;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "quest-service",
    }))
}

pub async fn metrics_handler() -> String {
    get_metrics()
}
