//! Storage trait for the ingestion pipeline.

use crate::entities::{Chain, Item, ItemPrice, Store};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use normalizer::{UniformItem, UniformStore};

/// Idempotent writes for chains, stores and items; append-only price points.
///
/// Implementations must be safe to call concurrently.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Create the chain if absent. Never modifies an existing chain.
    async fn upsert_chain(&self, name: &str) -> Result<Chain>;

    /// Insert or update the store keyed by (chain, store id).
    async fn upsert_store(&self, chain: &Chain, store: &UniformStore) -> Result<Store>;

    /// Insert or update the item keyed by item code, shared across chains.
    async fn upsert_item(&self, item: &UniformItem) -> Result<Item>;

    /// Append a price point. An existing point with the same key is kept and returned.
    async fn insert_price(
        &self,
        item: &Item,
        chain: &Chain,
        store: &Store,
        record: &UniformItem,
        observed_at: DateTime<Utc>,
    ) -> Result<ItemPrice>;

    async fn find_store(&self, chain: &str, store_id: &str) -> Result<Option<Store>>;

    /// Price points ordered by `observed_at`, oldest first.
    async fn price_history(
        &self,
        chain: &str,
        store_id: &str,
        item_code: &str,
    ) -> Result<Vec<ItemPrice>>;

    async fn current_price(
        &self,
        chain: &str,
        store_id: &str,
        item_code: &str,
    ) -> Result<Option<ItemPrice>> {
        let mut history = self.price_history(chain, store_id, item_code).await?;
        Ok(history.pop())
    }
}
