//! Stripe Checkout wrapper.
//!
//! The service sells a single product (a full CV rewrite) at a fixed price, so the
//! amount and currency are constants rather than Stripe Price objects.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Production API root; sessions live under `/v1/checkout/sessions`.
pub const DEFAULT_BASE_URL: &str = "https://api.stripe.com";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the Stripe secret key.
pub const SECRET_KEY_VAR: &str = "STRIPE_SECRET_KEY";
/// Pinned Stripe API version sent with every request.
pub const STRIPE_API_VERSION: &str = "2024-06-20";
/// Price of one rewrite, in minor units of `CURRENCY`.
pub const PRICE_AMOUNT: i64 = 3000;
pub const CURRENCY: &str = "usd";
pub const PRODUCT_NAME: &str = "CV rewrite";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stripe API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Stripe returned a session without a checkout URL")]
    MissingUrl,
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: Option<String>,
    pub client_reference_id: String,
}

/// A created checkout session: redirect the customer to `url`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
}

#[derive(Debug, Deserialize)]
struct SessionObject {
    id: String,
    url: Option<String>,
    payment_status: PaymentStatus,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: String,
}

/// Result of looking up a session after the customer returns from checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub id: String,
    pub payment_status: PaymentStatus,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
}

impl SessionStatus {
    /// Paid, and for the amount this service charges. Guards against sessions
    /// created by some other integration on the same account.
    pub fn is_paid_in_full(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
            && self.amount_total == Some(PRICE_AMOUNT)
            && self.currency.as_deref() == Some(CURRENCY)
    }
}

#[derive(Clone)]
pub struct PaymentClient {
    http: Client,
    secret_key: String,
    sessions_url: String,
}

impl std::fmt::Debug for PaymentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentClient")
            .field("api_version", &STRIPE_API_VERSION)
            .finish()
    }
}

impl PaymentClient {
    pub fn new(secret_key: String, base_url: &str) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            secret_key,
            sessions_url: format!("{}/v1/checkout/sessions", base_url.trim_end_matches('/')),
        })
    }

    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let form = checkout_form(request);
        let response = self
            .http
            .post(&self.sessions_url)
            .bearer_auth(&self.secret_key)
            .header("Stripe-Version", STRIPE_API_VERSION)
            .form(&form)
            .send()
            .await?;

        let session: SessionObject = parse_response(response).await?;
        let url = session.url.ok_or(PaymentError::MissingUrl)?;
        info!(session_id = %session.id, "Checkout session created");
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<SessionStatus, PaymentError> {
        let response = self
            .http
            .get(format!("{}/{session_id}", self.sessions_url))
            .bearer_auth(&self.secret_key)
            .header("Stripe-Version", STRIPE_API_VERSION)
            .send()
            .await?;

        let session: SessionObject = parse_response(response).await?;
        Ok(SessionStatus {
            id: session.id,
            payment_status: session.payment_status,
            amount_total: session.amount_total,
            currency: session.currency,
        })
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, PaymentError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<StripeErrorEnvelope>(&text)
        .map(|e| e.error.message)
        .unwrap_or(text);
    Err(PaymentError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Stripe's form encoding for a one-item payment-mode session.
fn checkout_form(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("mode", "payment".to_string()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
        ("client_reference_id", request.client_reference_id.clone()),
        ("line_items[0][quantity]", "1".to_string()),
        ("line_items[0][price_data][currency]", CURRENCY.to_string()),
        (
            "line_items[0][price_data][unit_amount]",
            PRICE_AMOUNT.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            PRODUCT_NAME.to_string(),
        ),
    ];
    if let Some(email) = &request.customer_email {
        form.push(("customer_email", email.clone()));
    }
    form
}

/// Checkout session ids look like `cs_test_a1B2...`; anything else is rejected before
/// it is interpolated into a request path.
pub fn is_valid_session_id(id: &str) -> bool {
    id.starts_with("cs_")
        && id.len() <= 255
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// "$30.00" for the fixed price.
pub fn display_price() -> String {
    let symbol = match CURRENCY {
        "usd" => "$",
        "eur" => "€",
        "gbp" => "£",
        _ => "",
    };
    format!(
        "{symbol}{}.{:02}",
        PRICE_AMOUNT / 100,
        PRICE_AMOUNT % 100
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: Option<&str>) -> CheckoutRequest {
        CheckoutRequest {
            success_url: "http://localhost:3000/success?session_id={CHECKOUT_SESSION_ID}"
                .to_string(),
            cancel_url: "http://localhost:3000/".to_string(),
            customer_email: email.map(String::from),
            client_reference_id: "ref-1".to_string(),
        }
    }

    fn value<'a>(form: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_constants() {
        assert_eq!(PRICE_AMOUNT, 3000);
        assert_eq!(CURRENCY, "usd");
        assert_eq!(display_price(), "$30.00");
    }

    #[test]
    fn test_checkout_form_uses_fixed_price() {
        let form = checkout_form(&request(None));
        assert_eq!(value(&form, "mode"), Some("payment"));
        assert_eq!(
            value(&form, "line_items[0][price_data][unit_amount]"),
            Some("3000")
        );
        assert_eq!(
            value(&form, "line_items[0][price_data][currency]"),
            Some("usd")
        );
        assert_eq!(value(&form, "customer_email"), None);
    }

    #[test]
    fn test_checkout_form_includes_customer_email() {
        let form = checkout_form(&request(Some("jane@example.com")));
        assert_eq!(value(&form, "customer_email"), Some("jane@example.com"));
    }

    #[test]
    fn test_session_id_validation() {
        assert!(is_valid_session_id("cs_test_a1B2c3"));
        assert!(!is_valid_session_id("pi_123"));
        assert!(!is_valid_session_id("cs_../../customers"));
        assert!(!is_valid_session_id(""));
    }

    #[test]
    fn test_session_status_deserializes() {
        let session: SessionObject = serde_json::from_str(
            r#"{"id":"cs_test_1","url":null,"payment_status":"paid",
                "amount_total":3000,"currency":"usd"}"#,
        )
        .unwrap();
        assert_eq!(session.payment_status, PaymentStatus::Paid);
        assert!(session.url.is_none());
    }

    #[test]
    fn test_paid_in_full_requires_matching_amount() {
        let mut status = SessionStatus {
            id: "cs_1".to_string(),
            payment_status: PaymentStatus::Paid,
            amount_total: Some(PRICE_AMOUNT),
            currency: Some("usd".to_string()),
        };
        assert!(status.is_paid_in_full());

        status.amount_total = Some(100);
        assert!(!status.is_paid_in_full());

        status.amount_total = Some(PRICE_AMOUNT);
        status.payment_status = PaymentStatus::Unpaid;
        assert!(!status.is_paid_in_full());
    }

    #[tokio::test]
    async fn test_create_checkout_session_posts_form() {
        let mut server = mockito::Server::new_async().await;
        let created = server
            .mock("POST", "/v1/checkout/sessions")
            .match_header("authorization", "Bearer sk_test")
            .match_header("stripe-version", STRIPE_API_VERSION)
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("mode".into(), "payment".into()),
                mockito::Matcher::UrlEncoded(
                    "line_items[0][price_data][unit_amount]".into(),
                    "3000".into(),
                ),
                mockito::Matcher::UrlEncoded("client_reference_id".into(), "ref-1".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"id":"cs_test_new","url":"https://checkout.stripe.com/c/pay/cs_test_new",
                    "payment_status":"unpaid","amount_total":3000,"currency":"usd"}"#,
            )
            .create_async()
            .await;

        let client = PaymentClient::new("sk_test".to_string(), &server.url()).unwrap();
        let session = client.create_checkout_session(&request(None)).await.unwrap();

        assert_eq!(session.id, "cs_test_new");
        assert_eq!(session.url, "https://checkout.stripe.com/c/pay/cs_test_new");
        created.assert_async().await;
    }

    #[tokio::test]
    async fn test_retrieve_checkout_session_parses_status() {
        let mut server = mockito::Server::new_async().await;
        let _session = server
            .mock("GET", "/v1/checkout/sessions/cs_test_paid")
            .with_status(200)
            .with_body(
                r#"{"id":"cs_test_paid","object":"checkout.session","url":null,
                    "payment_status":"paid","amount_total":3000,"currency":"usd"}"#,
            )
            .create_async()
            .await;

        let client = PaymentClient::new("sk_test".to_string(), &server.url()).unwrap();
        let status = client
            .retrieve_checkout_session("cs_test_paid")
            .await
            .unwrap();

        assert_eq!(status.payment_status, PaymentStatus::Paid);
        assert!(status.is_paid_in_full());
    }

    #[tokio::test]
    async fn test_missing_session_url_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _created = server
            .mock("POST", "/v1/checkout/sessions")
            .with_status(200)
            .with_body(r#"{"id":"cs_test_x","url":null,"payment_status":"unpaid"}"#)
            .create_async()
            .await;

        let client = PaymentClient::new("sk_test".to_string(), &server.url()).unwrap();
        assert!(matches!(
            client.create_checkout_session(&request(None)).await,
            Err(PaymentError::MissingUrl)
        ));
    }

    #[tokio::test]
    async fn test_stripe_error_message_is_extracted() {
        let mut server = mockito::Server::new_async().await;
        let _missing = server
            .mock("GET", "/v1/checkout/sessions/cs_test_gone")
            .with_status(404)
            .with_body(r#"{"error":{"type":"invalid_request_error","message":"No such checkout.session"}}"#)
            .create_async()
            .await;

        let client = PaymentClient::new("sk_test".to_string(), &server.url()).unwrap();
        let err = client
            .retrieve_checkout_session("cs_test_gone")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PaymentError::Api { status: 404, ref message } if message == "No such checkout.session"
        ));
    }
}
