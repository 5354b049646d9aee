use anyhow::Result;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use reel_scripts::config::Config;
use reel_scripts::{build_state, handlers};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load();
    let state = build_state(&config)?;

    let bind: SocketAddr = config.server.bind.parse().map_err(|e| {
        anyhow::anyhow!("Invalid SCRIPTS_HTTP_BIND '{}' (expected host:port): {e}", config.server.bind)
    })?;
    let router = handlers::router(state, config.server.bearer_token.clone());

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(
        %bind,
        model = %config.gemini.model,
        version = %config.gemini.api_version,
        auth = %config.server.bearer_token.as_deref().map(|_| "bearer").unwrap_or("none"),
        "Starting {} HTTP server",
        config.server.name
    );

    axum::serve(listener, router).await?;
    Ok(())
}
