//! ETL service entry point.
//!
//! Runs the supermarket ETL pipeline on a fixed schedule and serves the
//! health endpoint (plus the manual trigger outside production).

use anyhow::Result;
use etl_service::{api, scheduler, EtlConfig, Orchestrator};
use metrics_exporter_prometheus::PrometheusBuilder;
use normalizer::TransformerRegistry;
use persistence::RedisRepository;
use source_gateway::{SourceGateway, SupermarketApiClient};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=========================================");
    info!("          ETL SERVICE STARTING           ");
    info!("=========================================");

    let config = EtlConfig::from_env()?;

    info!("Configuration:");
    info!("  SUPERMARKET_API_BASE_URL: {}", config.gateway.base_url);
    info!("  SUPERMARKET_API_TOKEN: {}", if config.gateway.token.is_some() { "set" } else { "unset" });
    info!("  ETL_CONCURRENCY_LIMIT: {}", config.concurrency_limit);
    info!("  ETL_SCHEDULE_INTERVAL_SECS: {}", config.schedule_interval.as_secs());
    info!("  ETL_RUN_ON_STARTUP: {}", config.run_on_startup);
    info!("  ETL_ENVIRONMENT: {}", config.environment);
    info!("  REDIS_URL: {}", config.redis_url);

    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.metrics_port))
        .install()?;
    info!(
        "Prometheus metrics available at http://0.0.0.0:{}/metrics",
        config.metrics_port
    );

    info!("Connecting to Redis...");
    let repository = RedisRepository::connect(&config.redis_url).await?;
    repository.ping().await?;
    info!("Connected to Redis at {}", config.redis_url);

    let gateway: Arc<dyn SourceGateway> =
        Arc::new(SupermarketApiClient::new(config.gateway.clone())?);

    let registry = TransformerRegistry::with_defaults();
    info!(
        "Registered transformers: {}",
        registry
            .supported_chains()
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let orchestrator = Arc::new(Orchestrator::new(
        gateway.clone(),
        Arc::new(registry),
        Arc::new(repository),
        config.concurrency_limit,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(shutdown_signal(shutdown_tx));

    let schedule_handle = tokio::spawn(scheduler::run_schedule(
        orchestrator.clone(),
        config.schedule_interval,
        config.run_on_startup,
        shutdown_rx.clone(),
    ));

    let health_handle = config.health_check_interval.map(|period| {
        tokio::spawn(scheduler::run_health_monitor(
            gateway.clone(),
            period,
            shutdown_rx.clone(),
        ))
    });

    let state = Arc::new(api::AppState {
        orchestrator: orchestrator.clone(),
        gateway,
        environment: config.environment,
    });
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await?;

    info!("=========================================");
    info!("  ETL service ready on port {}", config.http_port);
    info!("=========================================");
    info!("Endpoints:");
    info!("  GET /health                            - Health check");
    if !config.environment.is_production() {
        info!("  POST /etl-pipeline/run-etl-pipeline    - Manual ETL trigger");
    }

    let mut server_shutdown = shutdown_rx;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = server_shutdown.changed().await;
        })
        .await?;

    let _ = schedule_handle.await;
    if let Some(handle) = health_handle {
        let _ = handle.await;
    }

    // A manual run answered with 202 is not owned by any task handle.
    if orchestrator.is_running() {
        info!("Waiting for manual ETL run to finish...");
    }
    orchestrator.wait_idle().await;

    info!("ETL service stopped");
    Ok(())
}

/// Wait for Ctrl+C, then tell every loop to stop.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        // Keep the sender alive so the loops keep running.
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
    let _ = shutdown_tx.send(true);
}
