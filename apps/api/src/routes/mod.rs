pub mod health;
pub mod pages;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::billing;
use crate::grading::handlers;
use crate::state::AppState;

/// Slack on top of the file size limit for multipart framing and the email field.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(pages::landing_handler))
        .route("/health", get(health::health_handler))
        // Grading API
        .route("/api/v1/grade", post(handlers::handle_grade))
        .route(
            "/api/v1/grade/upload",
            post(handlers::handle_grade_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/rewrite", post(handlers::handle_rewrite))
        // Billing API
        .route("/api/v1/pricing", get(billing::handle_pricing))
        .route("/api/v1/checkout", post(billing::handle_checkout))
        .with_state(state)
}
