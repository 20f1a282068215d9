//! Courier API server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use courier_common::config::AppConfig;
use courier_common::db::{create_pool, run_migrations};
use courier_common::redis_pool::create_redis_pool;
use courier_engine::messages::MessageService;
use courier_engine::store::PgMessageStore;
use courier_engine::worker::{DeliveryWorker, WorkerSettings};
use courier_notifier::{RedisDispatchCache, WebhookClient};

use courier_api::routes::create_router;
use courier_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "courier_api=debug,courier_engine=info,courier_notifier=info,tower_http=debug",
            )
        }))
        .init();

    tracing::info!("Starting Courier API server...");

    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    run_migrations(&pool).await?;

    let redis = create_redis_pool(&config.redis_url).await?;

    let sender = WebhookClient::new(
        config.webhook_url.clone(),
        config.webhook_auth_key.clone(),
        Duration::from_secs(config.webhook_timeout_secs),
    )?;
    tracing::info!(url = %sender.url(), "Delivery endpoint configured");

    let store = Arc::new(PgMessageStore::new(pool));
    let dispatches = Arc::new(RedisDispatchCache::new(redis));
    let shutdown = CancellationToken::new();

    let worker = DeliveryWorker::new(
        store.clone(),
        Arc::new(sender),
        dispatches.clone(),
        WorkerSettings::from_config(&config),
        shutdown.clone(),
    );
    let messages = MessageService::new(store, config.retrieve_limit);

    if config.worker_autostart {
        worker.start().await;
    }

    let state = AppState::new(worker, messages, dispatches);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("Courier API server stopped.");
    Ok(())
}

/// Wait for Ctrl+C, then cancel `shutdown` so the delivery loop exits too.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal, stopping gracefully...");
    shutdown.cancel();
}
