//! Papergraph console server
//!
//! Run with: cargo run -p papergraph-web

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use papergraph_client::HttpBackend;
use papergraph_web::config::ConsoleConfig;
use papergraph_web::console::Console;
use papergraph_web::controllers::status::refresh_status;
use papergraph_web::state::AppState;
use papergraph_web::store::Page;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("papergraph_web=info,papergraph_client=info,tower_http=info")),
        )
        .init();

    info!("Starting Papergraph console...");

    let config = ConsoleConfig::load()?;
    let backend = HttpBackend::new(&config.backend.base_url, config.request_timeout())
        .context("invalid backend.base_url")?;
    info!(backend = %config.backend.base_url, "Using paper graph backend");

    let console = Console::new(Arc::new(backend), config.task_interval());
    refresh_status(&console.store, console.backend.as_ref()).await;
    console.navigate(Page::Search).await;
    let refresher = console.spawn_status_refresher(config.status_refresh());

    let app = papergraph_web::router::build_router(AppState::new(console.clone()), &config.server.static_dir);

    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("invalid server.bind_addr: {}", config.server.bind_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Console listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    console.shutdown();
    let _ = refresher.await;
    Ok(())
}
