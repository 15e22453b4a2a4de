use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing::{error, info, warn};

use brainops_api as api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let db_pool = api::db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to database")?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }

    let embedder = api::rag::create_provider(&cfg.rag)?;
    if embedder.is_enabled() {
        info!(
            provider = embedder.kind(),
            model = embedder.model_name(),
            dims = embedder.dims(),
            "embedding provider ready"
        );
    } else {
        warn!("embedding provider disabled; /api/v1/rag/search will answer 503");
    }
    if api::mcp::stubs_enabled(&cfg) {
        warn!("MCP stub servers enabled; responses under /mcp are canned");
    }

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cfg.host, cfg.port))?;

    let state = api::AppState::new(Arc::new(db_pool), cfg, embedder);
    let app = api::build_router(state)?;

    info!("brainops-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(api::shutdown_signal())
        .await?;

    Ok(())
}
