//! Health check endpoint

use axum::{extract::State, response::IntoResponse, Json};
use barrage_interfaces::TaskFilter;
use serde_json::json;

use crate::context::AppContext;

pub async fn health_check(State(ctx): State<AppContext>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "attacks": ctx.dispatcher.list(&TaskFilter::default()).len(),
        "reports": ctx.reports.len(),
    }))
}
