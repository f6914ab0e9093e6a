//! Gateway trait so the pipeline can be driven by a fake upstream.

use crate::error::Result;
use crate::types::{FileType, ServiceHealth};
use async_trait::async_trait;
use common::{RawRow, SupermarketChain};
use futures::future::join_all;
use metrics::counter;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Default number of concurrent file fetches per chain.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 5;

/// Read access to the upstream scraper service.
#[async_trait]
pub trait SourceGateway: Send + Sync {
    /// Upstream liveness.
    async fn health(&self) -> Result<ServiceHealth>;

    /// Chain names the upstream currently publishes, verbatim.
    async fn list_available_chains(&self) -> Result<Vec<String>>;

    /// Names of the scraped files of one type for a chain.
    async fn list_files(&self, chain: SupermarketChain, file_type: FileType)
        -> Result<Vec<String>>;

    /// Raw rows of one scraped file.
    async fn fetch_file_content(
        &self,
        chain: SupermarketChain,
        file_name: &str,
    ) -> Result<Vec<RawRow>>;

    fn concurrency_limit(&self) -> usize {
        DEFAULT_CONCURRENCY_LIMIT
    }

    /// All rows of every store file of `chain`.
    async fn extract_store_data(&self, chain: SupermarketChain) -> Vec<RawRow> {
        info!("Extracting store data for chain {}", chain);
        extract_files(self, chain, FileType::StoreFile).await
    }

    /// All rows of every full price file of `chain`.
    async fn extract_product_data(&self, chain: SupermarketChain) -> Vec<RawRow> {
        info!("Extracting product data for chain {}", chain);
        extract_files(self, chain, FileType::PriceFullFile).await
    }
}

/// List the files of `file_type` for `chain`, fetch them with bounded
/// concurrency and flatten the rows.
///
/// Never fails: a failed listing yields no rows, a failed file yields no rows
/// for that file. Each failure is logged and counted.
pub async fn extract_files<G>(gateway: &G, chain: SupermarketChain, file_type: FileType) -> Vec<RawRow>
where
    G: SourceGateway + ?Sized,
{
    let files = match gateway.list_files(chain, file_type).await {
        Ok(files) => files,
        Err(e) => {
            counter!("etl_gateway_errors_total", "kind" => e.kind()).increment(1);
            error!("Failed to list {} files for {}: {}", file_type, chain, e);
            return Vec::new();
        }
    };

    if files.is_empty() {
        warn!("No {} files listed for {}", file_type, chain);
        return Vec::new();
    }

    let file_count = files.len();
    let limit = gateway.concurrency_limit().max(1);

    let semaphore = Semaphore::new(limit);
    let semaphore = &semaphore;
    let results: Vec<Vec<RawRow>> = join_all(files.iter().map(|file| async move {
        // The semaphore is never closed, so acquire cannot fail.
        let _permit = semaphore.acquire().await;
        match gateway.fetch_file_content(chain, file).await {
            Ok(rows) => rows,
            Err(e) => {
                counter!("etl_gateway_errors_total", "kind" => e.kind()).increment(1);
                if e.is_not_found() {
                    warn!(
                        "File {} of {} vanished between listing and fetch: {}",
                        file, chain, e
                    );
                } else {
                    error!("Failed to fetch {} for {}: {}", file, chain, e);
                }
                Vec::new()
            }
        }
    }))
    .await;

    let rows: Vec<RawRow> = results.into_iter().flatten().collect();
    info!(
        "Extracted {} rows from {} {} files for {}",
        rows.len(),
        file_count,
        file_type,
        chain
    );
    rows
}
