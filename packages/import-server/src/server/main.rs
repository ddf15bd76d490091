// Main entry point for the import server

use std::sync::Arc;

use anyhow::{Context, Result};
use import_server::{
    server::{build_app, build_identity_resolver, build_orchestrator, AppState},
    Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,import_server=debug,product_extraction=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting product import server");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let render_configured = config.render_configured();
    if !render_configured {
        tracing::warn!("FIRECRAWL_API_KEY not set; remote rendering disabled");
    }

    let orchestrator = build_orchestrator(&config)?;
    tracing::info!(strategies = ?orchestrator.strategy_names(), "Extraction pipeline ready");

    let state = AppState::new(orchestrator, render_configured);
    let identity_resolver = Arc::new(build_identity_resolver(&config));
    let app = build_app(state, identity_resolver, &config.allowed_origins);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
