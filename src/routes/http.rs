// GET handlers: landing page, version, metrics

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::version::{NAME, VERSION};

/// GET /: points scrapers at /metrics.
pub(super) async fn root_handler() -> impl IntoResponse {
    format!("{} {}: metrics at /metrics\n", NAME, VERSION)
}

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /metrics: Prometheus text exposition of the current gauge values.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(body) => (
            [(header::CONTENT_TYPE, state.metrics.content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, operation = "encode_metrics", "metrics encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
