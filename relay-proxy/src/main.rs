use anyhow::Context;
use relay_proxy::{AppState, Config, api};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present; real environment variables take precedence
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay_proxy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SEO feedback relay...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    tracing::info!("- Target webhook configured: {}", config.webhook_url.is_some());
    tracing::info!(
        "- Status webhook configured: {}",
        config.status_webhook_url.is_some()
    );
    tracing::info!(
        "- Execution API: {}",
        config.execution_api_url.as_deref().unwrap_or("(none)")
    );

    if config.webhook_url.is_none() {
        tracing::warn!("TARGET_WEBHOOK is not set; submissions will be rejected");
    }

    let state = AppState::new(&config);
    let poller = state.poller.clone();

    // Build router with all API endpoints
    let app = api::create_router(state);

    let addr = config.bind_addr();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    poller.shutdown();
    tracing::info!("Relay stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
