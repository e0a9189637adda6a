mod billing;
mod config;
mod email_client;
mod errors;
mod grading;
mod lazy;
mod llm_client;
mod notifications;
mod payment_client;
mod routes;
mod services;
mod state;
mod ui;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::services::Services;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (loads .env, fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Grade API v{}", env!("CARGO_PKG_VERSION"));

    // Vendor clients are built lazily on first use; only check presence here.
    let services = Services::from_env();
    let missing = services.missing();
    if missing.is_empty() {
        info!("All integrations configured (model: {})", llm_client::MODEL);
    } else {
        warn!(
            "Integrations disabled until configured: {}",
            missing.join(", ")
        );
    }

    let state = AppState::new(config.clone(), services);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to PUBLIC_URL once the frontend is same-origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
