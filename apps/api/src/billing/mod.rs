//! Pricing and checkout handlers.

pub mod redemptions;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::email_client::looks_like_email;
use crate::errors::AppError;
use crate::payment_client::{self, CheckoutRequest};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PricingResponse {
    pub amount: i64,
    pub currency: &'static str,
    pub display: String,
    pub product: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutBody {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: String,
}

/// GET /api/v1/pricing
pub async fn handle_pricing() -> Json<PricingResponse> {
    Json(PricingResponse {
        amount: payment_client::PRICE_AMOUNT,
        currency: payment_client::CURRENCY,
        display: payment_client::display_price(),
        product: payment_client::PRODUCT_NAME,
    })
}

/// POST /api/v1/checkout
///
/// Creates a Stripe Checkout session for one rewrite and returns its redirect URL.
pub async fn handle_checkout(
    State(state): State<AppState>,
    Json(body): Json<CheckoutBody>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let customer_email = body
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    if let Some(email) = &customer_email {
        if !looks_like_email(email) {
            return Err(AppError::Validation("Invalid email address".to_string()));
        }
    }

    let payment = state.services.payment.get()?;
    let session = payment
        .create_checkout_session(&CheckoutRequest {
            success_url: state.config.checkout_success_url(),
            cancel_url: state.config.checkout_cancel_url(),
            customer_email,
            client_reference_id: Uuid::new_v4().to_string(),
        })
        .await?;

    Ok(Json(CheckoutResponse {
        session_id: session.id,
        url: session.url,
    }))
}
