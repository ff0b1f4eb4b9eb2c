//! enrich-server - Main entry point
//!
//! Person registry enriched with age, gender and nationality from
//! external name lookup providers.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use enrich_common::db::init_database;
use enrich_server::api::health::BuildInfo;
use enrich_server::config::{Args, Settings};
use enrich_server::enrichment::HttpEnricher;
use enrich_server::store::SqlitePersonStore;
use enrich_server::{build_router, AppState, PersonService};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(args).context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "enrich_server={level},enrich_common={level},tower_http={level}",
                    level = settings.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let build = BuildInfo::current();
    info!(
        "Starting enrich-server v{} [{}] built {} ({})",
        build.version, build.git_hash, build.build_timestamp, build.build_profile
    );
    info!("Database: {}", settings.database_path.display());
    info!(
        age = %settings.providers.age_url,
        gender = %settings.providers.gender_url,
        nationality = %settings.providers.nationality_url,
        "Lookup providers"
    );

    let pool = init_database(&settings.database_path)
        .await
        .context("Failed to initialize database")?;
    let store = SqlitePersonStore::new(pool);

    let enricher = HttpEnricher::new(settings.providers.clone(), info_span!("enrichment"))
        .context("Failed to build provider HTTP client")?;

    let service = PersonService::new(
        Arc::new(store),
        Arc::new(enricher),
        info_span!("person_service"),
    );
    let app = build_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.bind_addr))?;
    info!("Listening on {}", settings.bind_addr);

    let shutdown = CancellationToken::new();
    let server_shutdown = shutdown.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
            .await
    });

    tokio::select! {
        result = &mut server => {
            // Server stopped on its own, no signal involved
            result.context("Server task panicked")?.context("Server error")?;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    shutdown.cancel();
    drain(server, settings.shutdown_grace).await
}

/// Wait up to `grace` for in-flight requests, then abandon them
async fn drain(
    server: tokio::task::JoinHandle<std::io::Result<()>>,
    grace: Duration,
) -> Result<()> {
    info!("Waiting up to {:?} for in-flight requests", grace);

    match tokio::time::timeout(grace, server).await {
        Ok(joined) => {
            joined.context("Server task panicked")?.context("Server error")?;
            info!("Server shutdown complete");
        }
        Err(_) => {
            warn!("Grace period elapsed, abandoning in-flight requests");
        }
    }
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
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
            Ok(mut stream) => {
                stream.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
