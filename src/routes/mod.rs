// HTTP routes of the scrape endpoint

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::metrics::ExporterMetrics;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) metrics: Arc<ExporterMetrics>,
}

pub fn app(metrics: Arc<ExporterMetrics>) -> Router {
    let state = AppState { metrics };
    Router::new()
        .route("/", get(http::root_handler)) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/metrics", get(http::metrics_handler)) // GET /metrics
        .with_state(state)
}
