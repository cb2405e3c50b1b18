//! Tgmart Server
//!
//! A Telegram storefront mini-app backend: order orchestration against a
//! WooCommerce store and the payment handshake with Telegram Payments.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use server::{build_router, run_server};
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tgmart_core::backend::WooClient;
use tgmart_core::gateway::{BotApi, PaymentGateway};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Tgmart - Telegram storefront backend
#[derive(Parser, Debug)]
#[command(name = "tgmart-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./tgmart-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Register the gateway webhook for this deployment, then exit
    #[arg(long, default_value = "false")]
    register_webhook: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting tgmart-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file + CLI overrides + env secrets)
    let loaded = config::load(&args.config, args.listen).map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let backend = WooClient::new(
        &loaded.backend.store_url,
        loaded.secrets.consumer_key.clone(),
        loaded.secrets.consumer_secret.clone(),
    )?;

    let gateway = BotApi::new(
        loaded.gateway.api_root.clone(),
        loaded.secrets.bot_token.clone(),
        loaded.secrets.provider_token.clone(),
    );

    if args.register_webhook {
        let webhook_url = loaded.gateway.app_url.join("telegram/webhook")?;
        gateway
            .set_webhook(&webhook_url, &loaded.secrets.webhook_secret)
            .await?;
        tracing::info!("Webhook registered at {}", webhook_url);
        return Ok(());
    }

    // Create application state
    let state = AppState::new(
        Arc::new(backend),
        Arc::new(gateway),
        &loaded.secrets.webhook_secret,
        loaded.gateway.app_url.clone(),
    );

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", loaded.server.listen);
    run_server(router, loaded.server.listen).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
