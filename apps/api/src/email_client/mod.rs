//! Transactional email via the Resend HTTP API.
//!
//! Sender and reply-to addresses are fixed; callers only choose recipient, subject and body.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.resend.com";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the Resend API key.
pub const API_KEY_VAR: &str = "RESEND_API_KEY";
pub const FROM_EMAIL: &str = "CV Grade <reports@cvgrade.app>";
pub const REPLY_TO_EMAIL: &str = "support@cvgrade.app";

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Email API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),
}

/// An outgoing message. `from` and `reply_to` are filled in by the client.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    reply_to: &'a str,
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ResendErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct EmailClient {
    http: Client,
    api_key: String,
    emails_url: String,
}

impl std::fmt::Debug for EmailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailClient")
            .field("from", &FROM_EMAIL)
            .finish()
    }
}

impl EmailClient {
    pub fn new(api_key: String, base_url: &str) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            api_key,
            emails_url: format!("{}/emails", base_url.trim_end_matches('/')),
        })
    }

    /// Sends one message and returns the provider's message id.
    pub async fn send(&self, message: &EmailMessage) -> Result<String, EmailError> {
        let to = message.to.trim();
        if !looks_like_email(to) {
            return Err(EmailError::InvalidRecipient(message.to.clone()));
        }

        let body = SendEmailRequest {
            from: FROM_EMAIL,
            to: [to],
            reply_to: REPLY_TO_EMAIL,
            subject: &message.subject,
            html: &message.html,
            text: message.text.as_deref(),
        };

        let response = self
            .http
            .post(&self.emails_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ResendErrorBody>(&text)
                .map(|e| e.message)
                .unwrap_or(text);
            return Err(EmailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let sent: SendEmailResponse = response.json().await?;
        info!(email_id = %sent.id, "Email sent");
        Ok(sent.id)
    }
}

/// Cheap shape check: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn looks_like_email(address: &str) -> bool {
    let address = address.trim();
    if address.chars().any(char::is_whitespace) {
        return false;
    }
    match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("jane@example.com"));
        assert!(looks_like_email("  jane.doe+cv@mail.example.co.uk "));
        assert!(!looks_like_email("jane@localhost"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("jane@@example.com"));
        assert!(!looks_like_email("jane doe@example.com"));
        assert!(!looks_like_email("jane@example."));
    }

    #[test]
    fn test_request_uses_fixed_sender() {
        let body = SendEmailRequest {
            from: FROM_EMAIL,
            to: ["a@b.co"],
            reply_to: REPLY_TO_EMAIL,
            subject: "Your CV report",
            html: "<p>hi</p>",
            text: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["from"], FROM_EMAIL);
        assert_eq!(json["reply_to"], REPLY_TO_EMAIL);
        assert_eq!(json["to"][0], "a@b.co");
        assert!(json.get("text").is_none());
    }

    #[tokio::test]
    async fn test_send_rejects_bad_recipient_without_network() {
        let client = EmailClient::new("re_test".to_string(), DEFAULT_BASE_URL).unwrap();
        let message = EmailMessage {
            to: "not-an-address".to_string(),
            subject: "s".to_string(),
            html: "h".to_string(),
            text: None,
        };
        assert!(matches!(
            client.send(&message).await,
            Err(EmailError::InvalidRecipient(_))
        ));
    }

    fn message(to: &str) -> EmailMessage {
        EmailMessage {
            to: to.to_string(),
            subject: "Your CV report".to_string(),
            html: "<p>B</p>".to_string(),
            text: None,
        }
    }

    #[tokio::test]
    async fn test_send_posts_fixed_sender_and_returns_id() {
        let mut server = mockito::Server::new_async().await;
        let sent = server
            .mock("POST", "/emails")
            .match_header("authorization", "Bearer re_test")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "from": FROM_EMAIL,
                "reply_to": REPLY_TO_EMAIL,
                "to": ["jane@example.com"],
            })))
            .with_status(200)
            .with_body(r#"{"id":"em_123"}"#)
            .create_async()
            .await;

        let client = EmailClient::new("re_test".to_string(), &server.url()).unwrap();
        let id = client.send(&message(" jane@example.com ")).await.unwrap();

        assert_eq!(id, "em_123");
        sent.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_surfaces_provider_message() {
        let mut server = mockito::Server::new_async().await;
        let _rejected = server
            .mock("POST", "/emails")
            .with_status(422)
            .with_body(r#"{"statusCode":422,"name":"validation_error","message":"Invalid `to` field"}"#)
            .create_async()
            .await;

        let client = EmailClient::new("re_test".to_string(), &server.url()).unwrap();
        let err = client.send(&message("jane@example.com")).await.unwrap_err();

        assert!(matches!(
            err,
            EmailError::Api { status: 422, ref message } if message == "Invalid `to` field"
        ));
    }
}
