//! # Authorizer HTTP Server
//!
//! Serves the token authorizer over HTTP.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `PORT` - HTTP server port (default: 8080)
//! - `RUST_LOG` - Log level (default: info)
//! - `AZURE_TENANT_ID` / `AZURE_CLIENT_ID` - Token issuer tenant and audience
//! - `AUTHZ_ROLE_CONFIG` - JSON file replacing the built-in role tables
//! - `AUTHZ_KEY_CACHE_TTL_SECS` - Signing key cache lifetime (default: 3600)

use anyhow::Context;
use axum::serve;
use gateway_authz::server::{router, AppState};
use gateway_authz::{Authorizer, ServerConfig};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {}", e);
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
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }

    info!("Starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting gateway authorizer v{}", gateway_authz::VERSION);

    let server_config = ServerConfig::from_env();
    let authorizer = Authorizer::from_env().context("failed to initialize authorizer")?;

    let config = authorizer.config();
    info!("Configuration:");
    info!("  Port: {}", server_config.port);
    info!("  Key cache TTL: {}s", config.key_cache_ttl.as_secs());
    if let Some(path) = &config.role_config {
        info!("  Role tables: {}", path.display());
    }
    if let Err(e) = config.require() {
        warn!("{}; every request will be denied", e);
    }

    let app = router(AppState::new(authorizer));
    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Starting HTTP server on {}", addr);

    serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server shut down gracefully");
    Ok(())
}
