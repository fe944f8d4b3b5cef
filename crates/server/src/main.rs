use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelflix_core::{
    load_config, validate_config, CatalogClient, InMemorySourceRegistry, SearchCoordinator,
    SearchThrottle, VodClient,
};
use reelflix_server::api::{create_router, WsBroadcaster};
use reelflix_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("REELFLIX_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        "Search throttle: {} ms, catalog page: {}",
        config.search.min_interval_ms, config.search.page
    );

    // Source registry, seeded from config
    let registry = Arc::new(InMemorySourceRegistry::new(config.sources.clone()));
    if registry.is_empty().await {
        info!("No sources configured; add some via POST /api/v1/sources");
    } else {
        info!("{} source(s) configured", registry.len().await);
    }

    // Catalog HTTP client
    let catalog: Arc<dyn CatalogClient> = Arc::new(
        VodClient::new(&config.catalog).context("Failed to create catalog client")?,
    );

    // One throttle and one coordinator per process
    let throttle = Arc::new(SearchThrottle::new(Duration::from_millis(
        config.search.min_interval_ms,
    )));
    let coordinator = Arc::new(
        SearchCoordinator::new(Arc::clone(&catalog))
            .with_throttle(throttle)
            .with_page(config.search.page),
    );

    // WebSocket broadcaster for live session updates
    let ws_broadcaster = WsBroadcaster::default();

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        registry,
        catalog,
        coordinator,
        ws_broadcaster,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
