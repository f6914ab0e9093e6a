//! In-memory repository using DashMap.
//!
//! Same semantics as the Redis repository; used by tests and dry runs.

use crate::entities::{store_key, Chain, Item, ItemPrice, Store};
use crate::error::Result;
use crate::repository::Repository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use normalizer::{UniformItem, UniformStore};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type PriceKey = (String, String, String);

#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    inner: Arc<MemoryRepositoryInner>,
}

#[derive(Debug, Default)]
struct MemoryRepositoryInner {
    chains: DashMap<String, Chain>,
    /// (chain, canonical store id) -> Store
    stores: DashMap<(String, String), Store>,
    items: DashMap<String, Item>,
    /// (chain, canonical store id, item code) -> observed_at -> ItemPrice
    prices: DashMap<PriceKey, BTreeMap<DateTime<Utc>, ItemPrice>>,
    total_writes: AtomicU64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain_count(&self) -> usize {
        self.inner.chains.len()
    }

    pub fn store_count(&self) -> usize {
        self.inner.stores.len()
    }

    pub fn item_count(&self) -> usize {
        self.inner.items.len()
    }

    /// Number of price points across every series.
    pub fn price_count(&self) -> usize {
        self.inner.prices.iter().map(|series| series.len()).sum()
    }

    /// Number of successful write calls.
    pub fn total_writes(&self) -> u64 {
        self.inner.total_writes.load(Ordering::Relaxed)
    }

    fn record_write(&self) {
        self.inner.total_writes.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn upsert_chain(&self, name: &str) -> Result<Chain> {
        let chain = self
            .inner
            .chains
            .entry(name.to_string())
            .or_insert_with(|| Chain {
                name: name.to_string(),
                created_at: Utc::now(),
            })
            .clone();
        self.record_write();
        Ok(chain)
    }

    async fn upsert_store(&self, chain: &Chain, store: &UniformStore) -> Result<Store> {
        let record = Store::from_uniform(chain, store, Utc::now());
        self.inner
            .stores
            .insert((chain.name.clone(), store_key(&store.store_id)), record.clone());
        self.record_write();
        Ok(record)
    }

    async fn upsert_item(&self, item: &UniformItem) -> Result<Item> {
        let record = Item::from_uniform(item, Utc::now());
        self.inner.items.insert(item.item_code.clone(), record.clone());
        self.record_write();
        Ok(record)
    }

    async fn insert_price(
        &self,
        item: &Item,
        chain: &Chain,
        store: &Store,
        record: &UniformItem,
        observed_at: DateTime<Utc>,
    ) -> Result<ItemPrice> {
        let key = (
            chain.name.clone(),
            store_key(&store.store_id),
            item.item_code.clone(),
        );
        let point = self
            .inner
            .prices
            .entry(key)
            .or_default()
            .entry(observed_at)
            .or_insert_with(|| ItemPrice::new(item, chain, store, record, observed_at))
            .clone();
        self.record_write();
        Ok(point)
    }

    async fn find_store(&self, chain: &str, store_id: &str) -> Result<Option<Store>> {
        Ok(self
            .inner
            .stores
            .get(&(chain.to_string(), store_key(store_id)))
            .map(|s| s.clone()))
    }

    async fn price_history(
        &self,
        chain: &str,
        store_id: &str,
        item_code: &str,
    ) -> Result<Vec<ItemPrice>> {
        let key = (chain.to_string(), store_key(store_id), item_code.to_string());
        Ok(self
            .inner
            .prices
            .get(&key)
            .map(|series| series.values().cloned().collect())
            .unwrap_or_default())
    }
}
