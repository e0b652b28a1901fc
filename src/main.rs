//! Eclaire - A multi-tenant static content host

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eclaire::{
    create_router, ensure_content_root, spawn_stats_reporter, with_request_timeout, AppState, Config,
};

/// Main entry point for the Eclaire content host.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Seed the content directory if it does not exist
/// 4. Start background stats reporter
/// 5. Create Axum router with the catch-all handler
/// 6. Start HTTP server on configured address
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eclaire=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Eclaire");

    let config = Config::from_env();
    info!(
        "Configuration loaded: content_dir={}, host={}, port={}, host_scoped_cache={}, stats_interval={}s, request_timeout={}s",
        config.content_dir.display(),
        config.server_host,
        config.server_port,
        config.host_scoped_cache,
        config.stats_interval,
        config.request_timeout
    );

    ensure_content_root(&config.content_dir)
        .await
        .with_context(|| format!("failed to prepare {}", config.content_dir.display()))?;

    let state = AppState::from_config(&config);

    let reporter = (config.stats_interval > 0).then(|| {
        info!("Background stats reporter started");
        spawn_stats_reporter(state.dispatcher.cache().clone(), config.stats_interval)
    });

    let app = with_request_timeout(create_router(state), config.request_timeout);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(reporter))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the reporter.
async fn shutdown_signal(reporter: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = reporter {
        handle.abort();
        warn!("Stats reporter aborted");
    }
}
