//! Axum route handlers for the Grading API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::email_client::looks_like_email;
use crate::errors::AppError;
use crate::grading::extract::{extract_pdf_text, prepare_cv_text};
use crate::grading::grader::{grade_cv, GradeReport};
use crate::grading::rewriter::{rewrite_cv, RewriteResult};
use crate::notifications::{deliver_report, DeliveryOutcome};
use crate::payment_client::is_valid_session_id;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GradeRequest {
    pub cv_text: String,
    /// If set, the report is also emailed here (when email is configured).
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GradeResponse {
    pub report: GradeReport,
    pub email_delivery: DeliveryOutcome,
}

#[derive(Debug, Deserialize)]
pub struct RewriteRequest {
    pub cv_text: String,
    /// Checkout session id returned by `POST /api/v1/checkout`.
    pub session_id: String,
    pub focus: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RewriteResponse {
    #[serde(flatten)]
    pub result: RewriteResult,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/grade
///
/// Grades CV text sent as JSON.
pub async fn handle_grade(
    State(state): State<AppState>,
    Json(request): Json<GradeRequest>,
) -> Result<Json<GradeResponse>, AppError> {
    let cv_text = prepare_cv_text(&request.cv_text)?;
    grade_and_deliver(&state, &cv_text, request.email.as_deref()).await
}

/// POST /api/v1/grade/upload
///
/// Grades an uploaded PDF. Multipart fields: `file` (required), `email` (optional).
pub async fn handle_grade_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<GradeResponse>, AppError> {
    let mut file: Option<Bytes> = None;
    let mut email: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                file = Some(data);
            }
            Some("email") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid email field: {e}")))?;
                email = Some(text);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;
    if file.len() > state.config.max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Upload exceeds {} bytes",
            state.config.max_upload_bytes
        )));
    }

    let cv_text = extract_pdf_text(file).await?;
    grade_and_deliver(&state, &cv_text, email.as_deref()).await
}

async fn grade_and_deliver(
    state: &AppState,
    cv_text: &str,
    email: Option<&str>,
) -> Result<Json<GradeResponse>, AppError> {
    let email = email.map(str::trim).filter(|e| !e.is_empty());
    if email.is_some_and(|e| !looks_like_email(e)) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let llm = state.services.llm.get()?;
    let report = grade_cv(llm, cv_text).await?;
    let email_delivery = deliver_report(&state.services.email, email, &report).await;
    Ok(Json(GradeResponse {
        report,
        email_delivery,
    }))
}

/// POST /api/v1/rewrite
///
/// Paid rewrite. The checkout session must be paid in full before the model is called.
pub async fn handle_rewrite(
    State(state): State<AppState>,
    Json(request): Json<RewriteRequest>,
) -> Result<Json<RewriteResponse>, AppError> {
    let session_id = request.session_id.trim();
    if !is_valid_session_id(session_id) {
        return Err(AppError::Validation("Invalid session_id".to_string()));
    }
    let cv_text = prepare_cv_text(&request.cv_text)?;
    if state.redeemed.is_redeemed(session_id) {
        return Err(AppError::PaymentRequired(
            "Checkout session has already been used".to_string(),
        ));
    }

    // Resolve both clients up front so an unconfigured LLM is reported before
    // the payment lookup.
    let payment = state.services.payment.get()?;
    let llm = state.services.llm.get()?;

    let session = payment.retrieve_checkout_session(session_id).await?;
    if !session.is_paid_in_full() {
        info!(
            session_id = %session.id,
            status = ?session.payment_status,
            "Rewrite refused: session not paid"
        );
        return Err(AppError::PaymentRequired(
            "Checkout session has not been paid".to_string(),
        ));
    }

    if !state.redeemed.claim(&session.id) {
        info!(session_id = %session.id, "Rewrite refused: session already redeemed");
        return Err(AppError::PaymentRequired(
            "Checkout session has already been used".to_string(),
        ));
    }

    match rewrite_cv(llm, &cv_text, request.focus.as_deref()).await {
        Ok(result) => Ok(Json(RewriteResponse { result })),
        Err(e) => {
            state.redeemed.release(&session.id);
            Err(e)
        }
    }
}
