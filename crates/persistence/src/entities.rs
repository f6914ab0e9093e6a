//! Persisted entities.

use chrono::{DateTime, Utc};
use normalizer::{UniformItem, UniformStore};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A supermarket chain. Key: `name` (e.g. "SHUFERSAL").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chain {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A branch of a chain. Key: (`chain`, canonical `store_id`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Store {
    pub chain: String,
    /// Source-native id as last published.
    pub store_id: String,
    /// Chain's global location number from the feed.
    pub chain_id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    pub fn from_uniform(chain: &Chain, store: &UniformStore, now: DateTime<Utc>) -> Self {
        Self {
            chain: chain.name.clone(),
            store_id: store.store_id.clone(),
            chain_id: store.chain_id.clone(),
            name: store.name.clone(),
            address: store.address.clone(),
            city: store.city.clone(),
            zip_code: store.zip_code.clone(),
            updated_at: now,
        }
    }
}

/// A product, shared across chains. Key: `item_code`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub item_code: String,
    pub item_name: String,
    pub manufacturer_name: String,
    pub manufacture_country: String,
    pub unit_of_measure: String,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn from_uniform(item: &UniformItem, now: DateTime<Utc>) -> Self {
        Self {
            item_code: item.item_code.clone(),
            item_name: item.item_name.clone(),
            manufacturer_name: item.manufacturer_name.clone(),
            manufacture_country: item.manufacture_country.clone(),
            unit_of_measure: item.item_unit_of_measure.clone(),
            updated_at: now,
        }
    }
}

/// One observed price. Key: (`chain`, `store_id`, `item_code`, `observed_at`).
///
/// Append-only; the current price is the point with the latest `observed_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemPrice {
    pub chain: String,
    pub store_id: String,
    pub item_code: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub unit_of_measure_price: Decimal,
    pub item_status: String,
    /// Source-reported update time, verbatim.
    pub source_update_date: String,
    pub observed_at: DateTime<Utc>,
}

impl ItemPrice {
    pub fn new(
        item: &Item,
        chain: &Chain,
        store: &Store,
        record: &UniformItem,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            chain: chain.name.clone(),
            store_id: store.store_id.clone(),
            item_code: item.item_code.clone(),
            price: record.item_price,
            quantity: record.item_quantity,
            unit_of_measure_price: record.item_unit_of_measure_price,
            item_status: record.item_status.clone(),
            source_update_date: record.update_date.clone(),
            observed_at,
        }
    }
}

/// Canonical form of a store id for keys: price files write "001" where store
/// files write "1".
pub fn store_key(store_id: &str) -> String {
    let trimmed = store_id.trim();
    let stripped = trimmed.trim_start_matches('0');
    if stripped.is_empty() && !trimmed.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}
