//! Doctor presence server.
//!
//! Entry point that loads configuration, starts the realtime engine and
//! serves the WebSocket and health endpoints.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use presence_api::AppState;
use presence_core::config::AppConfig;
use presence_core::error::AppError;
use presence_core::result::AppResult;

#[tokio::main]
async fn main() {
    let env = std::env::var("PRESENCE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting presence server v{}", env!("CARGO_PKG_VERSION"));

    let addr = config.server.bind_address();
    let grace = config.server.shutdown_grace();

    let state = AppState::new(config);
    let engine = Arc::clone(&state.realtime);
    let monitor_handle = engine.spawn_monitor();

    let app = presence_api::build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Presence server listening on {}", addr);

    let shutdown_engine = Arc::clone(&engine);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        if let Err(e) = shutdown_engine.shutdown().await {
            tracing::warn!("Realtime engine shutdown failed: {}", e);
        }
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    if tokio::time::timeout(grace, monitor_handle).await.is_err() {
        tracing::warn!("Inactivity monitor did not stop within {:?}", grace);
    }

    tracing::info!("Presence server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
