//! Standalone MCP stub server: `/mcp/*` and `/health/live` on `mcp_stub_port`.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{bail, Context, Result};
use axum::{routing::get, Router};
use brainops_api::{config, health, mcp, shutdown_signal};
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    if !mcp::stubs_enabled(&cfg) {
        bail!("MCP stub servers are disabled; set APP__MCP_STUB_MODE=true outside production");
    }

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.mcp_stub_port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cfg.host, cfg.mcp_stub_port))?;

    let app = Router::new()
        .route("/health/live", get(health::liveness))
        .nest_service("/mcp", mcp::mcp_router(Arc::new(cfg)))
        .layer(TraceLayer::new_for_http());

    info!("mcp-stub-server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
