use std::sync::Arc;

use serde::Serialize;

use crate::email_client::{self, EmailClient};
use crate::lazy::{ClientError, EnvSource, LazyClient, SecretSource};
use crate::llm_client::{self, LlmClient};
use crate::payment_client::{self, PaymentClient};

/// Owns the three vendor client slots. Built once in `main` and shared through
/// `AppState`; nothing else in the crate holds a client.
#[derive(Debug)]
pub struct Services {
    pub llm: LazyClient<LlmClient>,
    pub email: LazyClient<EmailClient>,
    pub payment: LazyClient<PaymentClient>,
}

/// API roots the clients are built against. `Default` is production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub llm: String,
    pub email: String,
    pub payment: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            llm: llm_client::DEFAULT_BASE_URL.to_string(),
            email: email_client::DEFAULT_BASE_URL.to_string(),
            payment: payment_client::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct IntegrationStatus {
    pub configured: bool,
    pub initialized: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct IntegrationsReport {
    pub llm: IntegrationStatus,
    pub email: IntegrationStatus,
    pub payment: IntegrationStatus,
}

impl Services {
    pub fn from_env() -> Self {
        Self::with_source(Arc::new(EnvSource))
    }

    pub fn with_source(source: Arc<dyn SecretSource>) -> Self {
        Self::with_endpoints(source, Endpoints::default())
    }

    pub fn with_endpoints(source: Arc<dyn SecretSource>, endpoints: Endpoints) -> Self {
        let Endpoints {
            llm,
            email,
            payment,
        } = endpoints;
        Self {
            llm: LazyClient::new("llm", llm_client::API_KEY_VAR, source.clone(), move |key| {
                LlmClient::new(key, &llm).map_err(|e| ClientError::construction("llm", e))
            }),
            email: LazyClient::new(
                "email",
                email_client::API_KEY_VAR,
                source.clone(),
                move |key| {
                    EmailClient::new(key, &email).map_err(|e| ClientError::construction("email", e))
                },
            ),
            payment: LazyClient::new(
                "payment",
                payment_client::SECRET_KEY_VAR,
                source,
                move |key| {
                    PaymentClient::new(key, &payment)
                        .map_err(|e| ClientError::construction("payment", e))
                },
            ),
        }
    }

    /// Presence/initialization flags for the health endpoint. Constructs nothing.
    pub fn report(&self) -> IntegrationsReport {
        fn status<T>(slot: &LazyClient<T>) -> IntegrationStatus {
            IntegrationStatus {
                configured: slot.is_configured(),
                initialized: slot.is_initialized(),
            }
        }
        IntegrationsReport {
            llm: status(&self.llm),
            email: status(&self.email),
            payment: status(&self.payment),
        }
    }

    /// Names of integrations whose secret is missing, for the startup warning.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (self.llm.is_configured(), self.llm.key_var()),
            (self.email.is_configured(), self.email.key_var()),
            (self.payment.is_configured(), self.payment.key_var()),
        ]
        .into_iter()
        .filter(|(configured, _)| !configured)
        .map(|(_, var)| var)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lazy::test_support::MapSource;

    #[test]
    fn test_unconfigured_registry() {
        let services = Services::with_source(Arc::new(MapSource::default()));

        assert!(matches!(
            services.llm.get().unwrap_err(),
            ClientError::NotConfigured { var: "ANTHROPIC_API_KEY", .. }
        ));
        assert!(matches!(
            services.email.get().unwrap_err(),
            ClientError::NotConfigured { var: "RESEND_API_KEY", .. }
        ));
        assert!(matches!(
            services.payment.get().unwrap_err(),
            ClientError::NotConfigured { var: "STRIPE_SECRET_KEY", .. }
        ));
        assert_eq!(
            services.missing(),
            vec!["ANTHROPIC_API_KEY", "RESEND_API_KEY", "STRIPE_SECRET_KEY"]
        );
    }

    #[test]
    fn test_each_slot_is_independent() {
        let source = Arc::new(MapSource::with(&[("RESEND_API_KEY", "re_123")]));
        let services = Services::with_source(source);

        let first = services.email.get().unwrap();
        let second = services.email.get().unwrap();
        assert!(std::ptr::eq(first, second));

        let report = services.report();
        assert_eq!(
            report.email,
            IntegrationStatus {
                configured: true,
                initialized: true
            }
        );
        assert!(!report.llm.configured);
        assert!(!report.payment.initialized);
    }

    #[test]
    fn test_report_does_not_construct() {
        let source = Arc::new(MapSource::with(&[
            ("ANTHROPIC_API_KEY", "sk-ant"),
            ("STRIPE_SECRET_KEY", "sk_test"),
        ]));
        let services = Services::with_source(source);

        let report = services.report();
        assert!(report.llm.configured && !report.llm.initialized);
        assert!(report.payment.configured && !report.payment.initialized);
        assert!(!services.llm.is_initialized());
    }

    #[test]
    fn test_default_endpoints_are_production() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.llm, "https://api.anthropic.com");
        assert_eq!(endpoints.email, "https://api.resend.com");
        assert_eq!(endpoints.payment, "https://api.stripe.com");
    }

    #[test]
    fn test_payment_client_survives_key_rotation() {
        let source = Arc::new(MapSource::with(&[("STRIPE_SECRET_KEY", "sk_test_old")]));
        let services = Services::with_source(source.clone());

        let before = services.payment.get().unwrap();
        source.set("STRIPE_SECRET_KEY", "sk_test_new");
        let after = services.payment.get().unwrap();
        assert!(std::ptr::eq(before, after));
    }
}
