use semantic_search::api::router;
use semantic_search::catalog::source::CatalogClient;
use semantic_search::catalog::CatalogEngine;
use semantic_search::config::{Config, ENV_LOG_LEVEL};
use semantic_search::orchestrator::Orchestrator;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    if let Some(raw) = &config.log_level_fallback {
        tracing::warn!(
            "Unknown {} '{}', using {}",
            ENV_LOG_LEVEL,
            raw,
            config.log_level
        );
    }

    // 1. Engine:
    let client = CatalogClient::new(&config.backend_url);
    let engine = Arc::new(CatalogEngine::new(client, config.bounds));

    // 2. Orchestrator, background worker and startup sequencer:
    let orchestrator = Orchestrator::new(engine, config.orchestrator_settings());
    let _startup = orchestrator.start();

    match config.default_term {
        Some(term) => tracing::info!("Default search term: {}", term),
        None => tracing::info!("No default term configured; searches must name one"),
    }

    // 3. HTTP server:
    let app = router(orchestrator);

    tracing::info!("Catalog backend at {}", config.backend_url);
    tracing::info!("HTTP server listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
