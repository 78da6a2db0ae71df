//! Day planner aggregation service: wires configuration, the shared HTTP
//! client, and the planner into an axum server.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use day_planner::api;
use day_planner::config::Config;
use day_planner::http::ReqwestFetch;
use day_planner::orchestrator::Planner;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,day_planner=debug".into()),
        )
        .init();

    let config = Config::from_env();
    info!(
        bind = %config.bind_addr,
        alt_events = config.alt_events_enabled,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        "starting day planner service"
    );

    let client = Arc::new(ReqwestFetch::new().context("failed to build HTTP client")?);
    let planner = Arc::new(Planner::new(&config, client));
    let app = api::router(planner, &config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("server exited")?;
    Ok(())
}
