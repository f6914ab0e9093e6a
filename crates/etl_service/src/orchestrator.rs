//! ETL orchestration: discover chains, then extract, transform and load each.

use crate::error::{ChainError, Result, RunError};
use crate::guard::{RunGuard, RunPermit};
use chrono::{DateTime, Utc};
use common::SupermarketChain;
use metrics::{counter, gauge};
use normalizer::TransformerRegistry;
use persistence::{upsert_products_bounded, upsert_stores_bounded, Repository};
use serde::Serialize;
use source_gateway::SourceGateway;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Per-chain counts of one run.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ChainReport {
    pub chain: String,
    pub raw_store_rows: usize,
    pub stores_transformed: usize,
    pub stores_rejected: usize,
    pub stores_upserted: usize,
    pub stores_failed: usize,
    pub raw_product_rows: usize,
    pub products_transformed: usize,
    pub products_rejected: usize,
    pub prices_inserted: usize,
    pub products_failed: usize,
    /// Set when the chain was aborted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChainReport {
    fn new(chain: SupermarketChain) -> Self {
        Self {
            chain: chain.to_string(),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub chains: Vec<ChainReport>,
}

impl RunReport {
    pub fn failed_chains(&self) -> usize {
        self.chains.iter().filter(|c| !c.is_success()).count()
    }

    pub fn prices_inserted(&self) -> usize {
        self.chains.iter().map(|c| c.prices_inserted).sum()
    }
}

/// Drives one ETL run at a time over every supported chain.
pub struct Orchestrator {
    gateway: Arc<dyn SourceGateway>,
    registry: Arc<TransformerRegistry>,
    repository: Arc<dyn Repository>,
    write_concurrency: usize,
    guard: RunGuard,
}

impl Orchestrator {
    pub fn new(
        gateway: Arc<dyn SourceGateway>,
        registry: Arc<TransformerRegistry>,
        repository: Arc<dyn Repository>,
        write_concurrency: usize,
    ) -> Self {
        Self {
            gateway,
            registry,
            repository,
            write_concurrency: write_concurrency.max(1),
            guard: RunGuard::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    /// Resolve once no run is in progress.
    pub async fn wait_idle(&self) {
        self.guard.wait_idle().await
    }

    /// Reserve the single run slot.
    pub fn try_begin(&self) -> Result<RunPermit> {
        self.guard.try_acquire().ok_or(RunError::AlreadyRunning)
    }

    /// Run the pipeline once; rejected if another run is in progress.
    pub async fn run_once(&self) -> Result<RunReport> {
        let permit = match self.try_begin() {
            Ok(permit) => permit,
            Err(e) => {
                counter!("etl_runs_total", "outcome" => "skipped").increment(1);
                warn!("Skipping ETL run: {}", e);
                return Err(e);
            }
        };
        self.run_with_permit(permit).await
    }

    /// Run the pipeline under an already acquired permit.
    pub async fn run_with_permit(&self, permit: RunPermit) -> Result<RunReport> {
        let _permit = permit;
        let clock = Instant::now();
        let started_at = Utc::now();

        info!("========================================================");
        info!("STARTING ETL PIPELINE EXECUTION");
        info!("========================================================");

        let result = self.run_all(started_at).await;

        gauge!("etl_last_run_duration_seconds").set(clock.elapsed().as_secs_f64());
        match &result {
            Ok(report) => {
                let outcome = if report.failed_chains() == 0 { "success" } else { "partial" };
                counter!("etl_runs_total", "outcome" => outcome).increment(1);
                info!(
                    "ETL PIPELINE COMPLETED in {:.1}s: {} chains, {} failed, {} price points",
                    clock.elapsed().as_secs_f64(),
                    report.chains.len(),
                    report.failed_chains(),
                    report.prices_inserted()
                );
            }
            Err(e) => {
                counter!("etl_runs_total", "outcome" => "failed").increment(1);
                error!("ETL PIPELINE FAILED: {}", e);
            }
        }

        result
    }

    async fn run_all(&self, started_at: DateTime<Utc>) -> Result<RunReport> {
        let chains = self.determine_chains_to_process().await?;
        info!("Found {} chains to process", chains.len());

        let mut reports = Vec::with_capacity(chains.len());
        for chain in chains {
            reports.push(self.run_chain(chain, started_at).await);
        }

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            chains: reports,
        })
    }

    /// Known chains the upstream publishes, sorted.
    ///
    /// A known chain without a registered transformer is kept here so that
    /// `run_chain` reports it as a failed chain.
    pub async fn determine_chains_to_process(&self) -> Result<Vec<SupermarketChain>> {
        let available = self.gateway.list_available_chains().await?;

        let mut chains = BTreeSet::new();
        for name in &available {
            match name.parse::<SupermarketChain>() {
                Ok(chain) => {
                    if !self.registry.is_supported(chain) {
                        warn!("Chain {} has no registered transformer", chain);
                    }
                    chains.insert(chain);
                }
                Err(_) => debug!("Ignoring unknown chain {}", name),
            }
        }

        if chains.is_empty() {
            return Err(RunError::NoChainsToProcess);
        }
        Ok(chains.into_iter().collect())
    }

    /// Process one chain. Failures are recorded in the report, never propagated.
    ///
    /// Every price point written shares `observed_at`.
    pub async fn run_chain(&self, chain: SupermarketChain, observed_at: DateTime<Utc>) -> ChainReport {
        let mut report = ChainReport::new(chain);
        if let Err(e) = self.process_chain(chain, observed_at, &mut report).await {
            error!("Chain {} failed: {}", chain, e);
            report.error = Some(e.to_string());
        }
        report
    }

    async fn process_chain(
        &self,
        chain: SupermarketChain,
        observed_at: DateTime<Utc>,
        report: &mut ChainReport,
    ) -> std::result::Result<(), ChainError> {
        let transformer = self.registry.get_transformer(chain)?;
        let chain_entity = self.repository.upsert_chain(chain.as_str()).await?;

        info!("Processing stores for {}", chain);
        let raw_stores = self.gateway.extract_store_data(chain).await;
        report.raw_store_rows = raw_stores.len();

        let (stores, store_stats) = transformer.transform_stores_with_report(&raw_stores);
        drop(raw_stores);
        report.stores_transformed = store_stats.accepted;
        report.stores_rejected = store_stats.rejected;

        let outcome = upsert_stores_bounded(
            self.repository.as_ref(),
            &chain_entity,
            &stores,
            self.write_concurrency,
        )
        .await;
        report.stores_upserted = outcome.succeeded;
        report.stores_failed = outcome.failed;

        info!("Processing products for {}", chain);
        let raw_products = self.gateway.extract_product_data(chain).await;
        report.raw_product_rows = raw_products.len();

        let (products, product_stats) = transformer.transform_products_with_report(&raw_products);
        drop(raw_products);
        report.products_transformed = product_stats.accepted;
        report.products_rejected = product_stats.rejected;

        let outcome = upsert_products_bounded(
            self.repository.as_ref(),
            &chain_entity,
            &products,
            observed_at,
            self.write_concurrency,
        )
        .await;
        report.prices_inserted = outcome.succeeded;
        report.products_failed = outcome.failed;

        info!(
            "Chain {} done: {} stores, {} price points ({} rows rejected)",
            chain,
            report.stores_upserted,
            report.prices_inserted,
            report.stores_rejected + report.products_rejected
        );
        Ok(())
    }
}
