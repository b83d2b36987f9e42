use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atelier_server::api;
use atelier_server::config::Config;
use atelier_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "atelier_server=debug,atelier_client=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Atelier server...");

    let config = Config::parse();
    config.validate()?;
    config.warn_on_missing_credentials();

    tracing::info!(
        "Try-on provider: {:?}, poll budget: {} x {} ms",
        config.tryon_provider,
        config.poll_max_attempts,
        config.poll_interval_ms
    );

    let addr = config.bind_addr.clone();
    let app = api::create_router(AppState::from_config(config));

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
