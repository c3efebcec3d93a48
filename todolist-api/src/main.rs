//! # Todolist API Server
//!
//! Multi-user to-do backend: accounts with bearer tokens, and tasks that are
//! only ever visible to the account that created them.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/todolist \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p todolist-api
//! ```

use anyhow::Context;
use std::sync::Arc;
use todolist_api::{
    app::{build_router, AppState},
    config::Config,
};
use todolist_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, get_pool_stats, DatabaseConfig},
    },
    store::PgStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before tracing, so RUST_LOG and LOG_FORMAT can come from .env
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!(
        "Todolist API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("failed to load configuration")?;

    let pool = create_pool(DatabaseConfig::new(
        config.database.url.clone(),
        config.database.max_connections,
    ))
    .await
    .context("failed to connect to database")?;

    run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;

    let stats = get_pool_stats(&pool);
    tracing::info!(
        total = stats.total_connections,
        idle = stats.idle_connections,
        "Database ready"
    );

    let bind_address = config.bind_address();
    let state = AppState::new(Arc::new(PgStore::new(pool.clone())), config)
        .context("failed to initialise services")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

/// `RUST_LOG` filter, human-readable output unless `LOG_FORMAT=json`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "todolist_api=debug,todolist_shared=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to register SIGTERM handler");
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

    tracing::info!("Shutdown signal received, draining connections...");
}
