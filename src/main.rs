use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use ui_navigator::config::Config;
use ui_navigator::{GeminiBrain, Navigator, face};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let config = Config::parse();

    let filter = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("NAVIGATOR_LOG").unwrap_or_else(|_| filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let brain = GeminiBrain::new(&config)?;
    tracing::info!(model = %config.model, "brain ready");

    let navigator = Arc::new(Navigator::new(Arc::new(brain)));
    let app = face::router(navigator, config.max_upload_bytes());

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("could not bind to {}", config.bind))?;
    tracing::info!("UI navigation agent listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
