//! Background loops: the periodic ETL schedule and the upstream health monitor.

use crate::error::RunError;
use crate::orchestrator::Orchestrator;
use metrics::{counter, gauge};
use source_gateway::SourceGateway;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Trigger a run every `period` until `shutdown` flips to true.
///
/// Each run is spawned so the loop keeps watching for shutdown. A tick that
/// lands while the previous scheduled run is still going is skipped; a tick
/// that collides with a manual run is rejected by the orchestrator's run
/// guard. The scheduled run, if any, is awaited before returning.
pub async fn run_schedule(
    orchestrator: Arc<Orchestrator>,
    period: Duration,
    run_on_startup: bool,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    if !run_on_startup {
        // The first tick completes immediately.
        ticker.tick().await;
    }

    info!("ETL schedule started (every {}s)", period.as_secs());
    let mut in_flight: Option<JoinHandle<()>> = None;

    loop {
        tokio::select! {
            biased;

            _ = shutdown.changed() => {
                info!("ETL schedule received shutdown signal");
                break;
            }

            _ = ticker.tick() => {
                if in_flight.as_ref().is_some_and(|handle| !handle.is_finished()) {
                    counter!("etl_runs_total", "outcome" => "skipped").increment(1);
                    warn!("Scheduled run skipped: previous run still in progress");
                    continue;
                }

                let orchestrator = orchestrator.clone();
                in_flight = Some(tokio::spawn(async move {
                    match orchestrator.run_once().await {
                        Ok(_) => {}
                        Err(RunError::AlreadyRunning) => {
                            warn!("Scheduled run skipped: a manual run is in progress");
                        }
                        Err(e) => error!("Scheduled run failed: {}", e),
                    }
                }));
            }
        }
    }

    if let Some(handle) = in_flight {
        if !handle.is_finished() {
            info!("Waiting for in-flight ETL run to finish...");
        }
        if let Err(e) = handle.await {
            error!("Scheduled run task failed: {}", e);
        }
    }
}

/// Poll the upstream `/service_health` endpoint and log its status.
pub async fn run_health_monitor(
    gateway: Arc<dyn SourceGateway>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.changed() => break,

            _ = ticker.tick() => match gateway.health().await {
                Ok(health) => {
                    gauge!("etl_upstream_up").set(1.0);
                    info!("Upstream health: {}", health.status);
                }
                Err(e) => {
                    gauge!("etl_upstream_up").set(0.0);
                    warn!("Upstream health check failed: {}", e);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::{RawRow, SupermarketChain};
    use normalizer::TransformerRegistry;
    use persistence::MemoryRepository;
    use source_gateway::{FileType, ServiceHealth};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingGateway {
        discoveries: AtomicUsize,
        health_checks: AtomicUsize,
        discovery_delay: Duration,
    }

    #[async_trait]
    impl SourceGateway for CountingGateway {
        async fn health(&self) -> source_gateway::Result<ServiceHealth> {
            self.health_checks.fetch_add(1, Ordering::SeqCst);
            Ok(ServiceHealth {
                status: "ok".to_string(),
                timestamp: String::new(),
            })
        }

        async fn list_available_chains(&self) -> source_gateway::Result<Vec<String>> {
            self.discoveries.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.discovery_delay).await;
            Ok(vec!["SHUFERSAL".to_string()])
        }

        async fn list_files(
            &self,
            _chain: SupermarketChain,
            _file_type: FileType,
        ) -> source_gateway::Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn fetch_file_content(
            &self,
            _chain: SupermarketChain,
            _file_name: &str,
        ) -> source_gateway::Result<Vec<RawRow>> {
            Ok(Vec::new())
        }
    }

    fn orchestrator(gateway: Arc<CountingGateway>) -> Arc<Orchestrator> {
        Arc::new(Orchestrator::new(
            gateway,
            Arc::new(TransformerRegistry::with_defaults()),
            Arc::new(MemoryRepository::new()),
            2,
        ))
    }

    #[tokio::test]
    async fn test_schedule_runs_until_shutdown() {
        let gateway = Arc::new(CountingGateway::default());
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(run_schedule(
            orchestrator(gateway.clone()),
            Duration::from_millis(50),
            true,
            rx,
        ));

        tokio::time::sleep(Duration::from_millis(180)).await;
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();

        let runs = gateway.discoveries.load(Ordering::SeqCst);
        assert!(runs >= 2, "expected repeated runs, got {}", runs);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(gateway.discoveries.load(Ordering::SeqCst), runs);
    }

    #[tokio::test]
    async fn test_first_tick_skipped_without_startup_run() {
        let gateway = Arc::new(CountingGateway::default());
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(run_schedule(
            orchestrator(gateway.clone()),
            Duration::from_secs(3600),
            false,
            rx,
        ));

        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(gateway.discoveries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_long_run() {
        let gateway = Arc::new(CountingGateway {
            discovery_delay: Duration::from_millis(600),
            ..Default::default()
        });
        let orchestrator = orchestrator(gateway.clone());
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(run_schedule(
            orchestrator.clone(),
            Duration::from_millis(100),
            true,
            rx,
        ));

        // Ticks at 100ms and 200ms land while the first run is still going.
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(orchestrator.is_running());
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(3), handle)
            .await
            .unwrap()
            .unwrap();

        assert!(!orchestrator.is_running());
        assert_eq!(gateway.discoveries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_health_monitor_polls() {
        let gateway = Arc::new(CountingGateway::default());
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(run_health_monitor(
            gateway.clone(),
            Duration::from_millis(30),
            rx,
        ));

        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert!(gateway.health_checks.load(Ordering::SeqCst) >= 2);
    }
}
