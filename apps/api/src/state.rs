use std::sync::Arc;

use crate::billing::redemptions::RedeemedSessions;
use crate::config::Config;
use crate::services::Services;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Vendor client registry. Clients are built on first use and live as long as the process.
    pub services: Arc<Services>,
    /// Checkout sessions already exchanged for a rewrite.
    pub redeemed: Arc<RedeemedSessions>,
}

impl AppState {
    pub fn new(config: Config, services: Services) -> Self {
        Self {
            config,
            services: Arc::new(services),
            redeemed: Arc::new(RedeemedSessions::new()),
        }
    }
}
