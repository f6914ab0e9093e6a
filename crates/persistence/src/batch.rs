//! Bounded-concurrency batch writes.
//!
//! Each record is written independently; a failure is logged and counted and
//! never aborts the batch. Writes of a batch run as one task group gated by a
//! semaphore of `limit` permits, and both functions return only after every
//! write has settled.

use crate::entities::{store_key, Chain, Store};
use crate::error::{PersistenceError, Result};
use crate::repository::Repository;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use metrics::counter;
use normalizer::{UniformItem, UniformStore};
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Default number of in-flight writes.
pub const DEFAULT_WRITE_CONCURRENCY: usize = 5;

/// Counts of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchOutcome {
    fn record(&mut self, ok: bool) {
        if ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Run `task` for every input with at most `limit` in flight.
async fn gated<I, F, Fut>(inputs: I, limit: usize, task: F) -> Vec<Fut::Output>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future,
{
    let semaphore = Semaphore::new(limit.max(1));
    let semaphore = &semaphore;
    join_all(inputs.into_iter().map(|input| {
        let work = task(input);
        async move {
            // The semaphore is never closed, so acquire cannot fail.
            let _permit = semaphore.acquire().await;
            work.await
        }
    }))
    .await
}

fn count_upsert(entity: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("etl_upserts_total", "entity" => entity, "outcome" => outcome).increment(1);
}

/// Upsert every store of `chain`, at most `limit` at a time.
pub async fn upsert_stores_bounded<R>(
    repo: &R,
    chain: &Chain,
    stores: &[UniformStore],
    limit: usize,
) -> BatchOutcome
where
    R: Repository + ?Sized,
{
    let results = gated(stores, limit, |store| async move {
        match repo.upsert_store(chain, store).await {
            Ok(_) => true,
            Err(e) => {
                error!(
                    "Failed to upsert store {} of {}: {}",
                    store.store_id, chain.name, e
                );
                false
            }
        }
    })
    .await;

    let mut outcome = BatchOutcome::default();
    for ok in results {
        count_upsert("store", ok);
        outcome.record(ok);
    }

    info!(
        "Upserted {}/{} stores for {}",
        outcome.succeeded,
        stores.len(),
        chain.name
    );
    outcome
}

/// Upsert the item and append the price point of every product of `chain`,
/// at most `limit` at a time.
///
/// A product whose store is unknown fails with
/// [`PersistenceError::StoreNotFound`] and is skipped.
pub async fn upsert_products_bounded<R>(
    repo: &R,
    chain: &Chain,
    products: &[UniformItem],
    observed_at: DateTime<Utc>,
    limit: usize,
) -> BatchOutcome
where
    R: Repository + ?Sized,
{
    let stores = resolve_stores(repo, chain, products, limit).await;

    let results = gated(products, limit, |product| {
        let store = stores.get(&store_key(&product.store_id)).cloned().flatten();
        async move {
            match write_product(repo, chain, store, product, observed_at).await {
                Ok(()) => true,
                Err(e @ PersistenceError::StoreNotFound { .. }) => {
                    warn!("Skipping item {}: {}", product.item_code, e);
                    false
                }
                Err(e) => {
                    error!(
                        "Failed to write item {} for store {} of {}: {}",
                        product.item_code, product.store_id, chain.name, e
                    );
                    false
                }
            }
        }
    })
    .await;

    let mut outcome = BatchOutcome::default();
    for ok in results {
        count_upsert("price", ok);
        outcome.record(ok);
    }

    info!(
        "Wrote {}/{} price points for {} ({} failed)",
        outcome.succeeded,
        products.len(),
        chain.name,
        outcome.failed
    );
    outcome
}

/// Look up every distinct store referenced by `products` once.
///
/// A lookup error is treated like a missing store for that batch.
async fn resolve_stores<R>(
    repo: &R,
    chain: &Chain,
    products: &[UniformItem],
    limit: usize,
) -> HashMap<String, Option<Store>>
where
    R: Repository + ?Sized,
{
    let ids: BTreeSet<String> = products.iter().map(|p| store_key(&p.store_id)).collect();

    gated(ids, limit, |id| async move {
        let store = match repo.find_store(&chain.name, &id).await {
            Ok(store) => store,
            Err(e) => {
                error!("Failed to look up store {} of {}: {}", id, chain.name, e);
                None
            }
        };
        (id, store)
    })
    .await
    .into_iter()
    .collect()
}

async fn write_product<R>(
    repo: &R,
    chain: &Chain,
    store: Option<Store>,
    product: &UniformItem,
    observed_at: DateTime<Utc>,
) -> Result<()>
where
    R: Repository + ?Sized,
{
    let store = store.ok_or_else(|| PersistenceError::StoreNotFound {
        chain: chain.name.clone(),
        store_id: product.store_id.clone(),
        item_code: product.item_code.clone(),
    })?;

    let item = repo.upsert_item(product).await?;
    repo.insert_price(&item, chain, &store, product, observed_at)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Item, ItemPrice};
    use crate::memory::MemoryRepository;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Delays every store write and records the peak number in flight.
    #[derive(Default)]
    struct SlowRepository {
        inner: MemoryRepository,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Repository for SlowRepository {
        async fn upsert_chain(&self, name: &str) -> Result<Chain> {
            self.inner.upsert_chain(name).await
        }

        async fn upsert_store(&self, chain: &Chain, store: &UniformStore) -> Result<Store> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.inner.upsert_store(chain, store).await
        }

        async fn upsert_item(&self, item: &UniformItem) -> Result<Item> {
            self.inner.upsert_item(item).await
        }

        async fn insert_price(
            &self,
            item: &Item,
            chain: &Chain,
            store: &Store,
            record: &UniformItem,
            observed_at: DateTime<Utc>,
        ) -> Result<ItemPrice> {
            self.inner
                .insert_price(item, chain, store, record, observed_at)
                .await
        }

        async fn find_store(&self, chain: &str, store_id: &str) -> Result<Option<Store>> {
            self.inner.find_store(chain, store_id).await
        }

        async fn price_history(
            &self,
            chain: &str,
            store_id: &str,
            item_code: &str,
        ) -> Result<Vec<ItemPrice>> {
            self.inner.price_history(chain, store_id, item_code).await
        }
    }

    fn store(store_id: &str) -> UniformStore {
        UniformStore {
            chain_id: "7290027600007".to_string(),
            store_id: store_id.to_string(),
            name: format!("Branch {}", store_id),
            address: String::new(),
            city: "חיפה".to_string(),
            zip_code: String::new(),
        }
    }

    fn product(store_id: &str, item_code: &str) -> UniformItem {
        UniformItem {
            chain_id: "7290027600007".to_string(),
            store_id: store_id.to_string(),
            item_code: item_code.to_string(),
            item_name: "Bread".to_string(),
            manufacturer_name: "Angel".to_string(),
            manufacture_country: "IL".to_string(),
            item_price: Decimal::new(590, 2),
            item_quantity: Decimal::ONE,
            item_unit_of_measure: "unit".to_string(),
            item_unit_of_measure_price: Decimal::new(590, 2),
            item_status: "1".to_string(),
            update_date: "2025-04-04".to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_batch_is_idempotent() {
        let repo = MemoryRepository::new();
        let chain = repo.upsert_chain("SHUFERSAL").await.unwrap();
        let stores: Vec<UniformStore> = (1..=12).map(|i| store(&i.to_string())).collect();

        let first = upsert_stores_bounded(&repo, &chain, &stores, 5).await;
        let second = upsert_stores_bounded(&repo, &chain, &stores, 5).await;

        assert_eq!(first, BatchOutcome { succeeded: 12, failed: 0 });
        assert_eq!(second, first);
        assert_eq!(repo.store_count(), 12);
        assert_eq!(repo.chain_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_store_fails_only_that_product() {
        let repo = MemoryRepository::new();
        let chain = repo.upsert_chain("SHUFERSAL").await.unwrap();
        upsert_stores_bounded(&repo, &chain, &[store("1")], 5).await;

        let products = vec![
            product("001", "7290000000001"),
            product("999", "7290000000002"),
            product("1", "7290000000003"),
        ];
        let outcome =
            upsert_products_bounded(&repo, &chain, &products, Utc::now(), 5).await;

        assert_eq!(outcome, BatchOutcome { succeeded: 2, failed: 1 });
        assert_eq!(repo.item_count(), 2);
        assert_eq!(repo.price_count(), 2);
    }

    #[tokio::test]
    async fn test_rerun_appends_new_points() {
        let repo = MemoryRepository::new();
        let chain = repo.upsert_chain("RAMI_LEVY").await.unwrap();
        upsert_stores_bounded(&repo, &chain, &[store("39")], 5).await;
        let products = vec![product("039", "7290000000001")];

        let t1 = Utc::now();
        let t2 = t1 + chrono::Duration::minutes(30);
        upsert_products_bounded(&repo, &chain, &products, t1, 5).await;
        upsert_products_bounded(&repo, &chain, &products, t1, 5).await;
        upsert_products_bounded(&repo, &chain, &products, t2, 5).await;

        let history = repo
            .price_history("RAMI_LEVY", "39", "7290000000001")
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(repo.item_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_rows_keep_one_point() {
        let repo = MemoryRepository::new();
        let chain = repo.upsert_chain("SHUFERSAL").await.unwrap();
        upsert_stores_bounded(&repo, &chain, &[store("1")], 5).await;

        let mut repriced = product("001", "7290000000001");
        repriced.item_price = Decimal::new(650, 2);
        let products = vec![product("1", "7290000000001"), repriced];
        let outcome = upsert_products_bounded(&repo, &chain, &products, Utc::now(), 5).await;

        assert_eq!(outcome, BatchOutcome { succeeded: 2, failed: 0 });
        assert_eq!(repo.price_count(), 1);
        let history = repo
            .price_history("SHUFERSAL", "1", "7290000000001")
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_writes_respect_limit() {
        let repo = SlowRepository::default();
        let chain = repo.upsert_chain("HAZI_HINAM").await.unwrap();
        let stores: Vec<UniformStore> = (1..=20).map(|i| store(&i.to_string())).collect();

        let outcome = upsert_stores_bounded(&repo, &chain, &stores, 3).await;

        assert_eq!(outcome.succeeded, 20);
        assert_eq!(repo.in_flight.load(Ordering::SeqCst), 0);
        let peak = repo.peak.load(Ordering::SeqCst);
        assert!(peak >= 2 && peak <= 3, "peak in-flight writes: {}", peak);
    }

    #[tokio::test]
    async fn test_empty_batches() {
        let repo = MemoryRepository::new();
        let chain = repo.upsert_chain("TIV_TAAM").await.unwrap();

        assert_eq!(
            upsert_stores_bounded(&repo, &chain, &[], 5).await,
            BatchOutcome::default()
        );
        assert_eq!(
            upsert_products_bounded(&repo, &chain, &[], Utc::now(), 0).await,
            BatchOutcome::default()
        );
    }
}
