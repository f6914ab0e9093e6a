//! Redis-backed repository.
//!
//! Key layout:
//!
//! | Key | Type | Contents |
//! |---|---|---|
//! | `chain:{name}` | hash | `name`, `created_at` (set once) |
//! | `store:{chain}:{store_id}` | hash | store fields |
//! | `item:{item_code}` | hash | item fields |
//! | `price:{chain}:{store_id}:{item_code}` | sorted set | JSON price points scored by `observed_at` millis |
//!
//! A price point is written by a Lua script so the check for an existing point
//! at the same score and the `ZADD` happen as one step.

use crate::entities::{store_key, Chain, Item, ItemPrice, Store};
use crate::error::{PersistenceError, Result};
use crate::repository::Repository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use normalizer::{UniformItem, UniformStore};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::collections::HashMap;
use tracing::{debug, info};

const CHAIN_KEY_PREFIX: &str = "chain:";
const STORE_KEY_PREFIX: &str = "store:";
const ITEM_KEY_PREFIX: &str = "item:";
const PRICE_KEY_PREFIX: &str = "price:";

fn chain_key(name: &str) -> String {
    format!("{}{}", CHAIN_KEY_PREFIX, name)
}

fn store_hash_key(chain: &str, store_id: &str) -> String {
    format!("{}{}:{}", STORE_KEY_PREFIX, chain, store_key(store_id))
}

fn item_key(item_code: &str) -> String {
    format!("{}{}", ITEM_KEY_PREFIX, item_code)
}

fn price_key(chain: &str, store_id: &str, item_code: &str) -> String {
    format!(
        "{}{}:{}:{}",
        PRICE_KEY_PREFIX,
        chain,
        store_key(store_id),
        item_code
    )
}

/// KEYS[1] = price key, ARGV[1] = score, ARGV[2] = JSON point.
/// Returns the point stored at that score.
const INSERT_PRICE_SCRIPT: &str = r"
local existing = redis.call('ZRANGEBYSCORE', KEYS[1], ARGV[1], ARGV[1])
if #existing > 0 then
    return existing[1]
end
redis.call('ZADD', KEYS[1], ARGV[1], ARGV[2])
return ARGV[2]
";

#[derive(Clone)]
pub struct RedisRepository {
    conn: MultiplexedConnection,
    insert_price_script: redis::Script,
}

impl RedisRepository {
    /// Connect to Redis. The multiplexed connection is shared by every call.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Connected to Redis at {}", redis_url);
        Ok(Self {
            conn,
            insert_price_script: redis::Script::new(INSERT_PRICE_SCRIPT),
        })
    }

    fn get_connection(&self) -> MultiplexedConnection {
        self.conn.clone()
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.get_connection();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

fn field(map: &mut HashMap<String, String>, key: &str, name: &str) -> Result<String> {
    map.remove(name).ok_or_else(|| PersistenceError::Corrupt {
        key: key.to_string(),
        message: format!("missing field {}", name),
    })
}

fn parse_time(key: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| PersistenceError::Corrupt {
            key: key.to_string(),
            message: format!("bad timestamp {:?}: {}", raw, e),
        })
}

#[async_trait]
impl Repository for RedisRepository {
    async fn upsert_chain(&self, name: &str) -> Result<Chain> {
        let mut conn = self.get_connection();
        let key = chain_key(name);

        let (created_at,): (String,) = redis::pipe()
            .atomic()
            .hset_nx(&key, "name", name)
            .ignore()
            .hset_nx(&key, "created_at", Utc::now().to_rfc3339())
            .ignore()
            .hget(&key, "created_at")
            .query_async(&mut conn)
            .await?;

        Ok(Chain {
            name: name.to_string(),
            created_at: parse_time(&key, &created_at)?,
        })
    }

    async fn upsert_store(&self, chain: &Chain, store: &UniformStore) -> Result<Store> {
        let mut conn = self.get_connection();
        let record = Store::from_uniform(chain, store, Utc::now());
        let key = store_hash_key(&chain.name, &record.store_id);

        let fields = [
            ("chain", record.chain.clone()),
            ("store_id", record.store_id.clone()),
            ("chain_id", record.chain_id.clone()),
            ("name", record.name.clone()),
            ("address", record.address.clone()),
            ("city", record.city.clone()),
            ("zip_code", record.zip_code.clone()),
            ("updated_at", record.updated_at.to_rfc3339()),
        ];

        let _: () = conn.hset_multiple(&key, &fields).await?;

        debug!("Upserted store {}", key);
        Ok(record)
    }

    async fn upsert_item(&self, item: &UniformItem) -> Result<Item> {
        let mut conn = self.get_connection();
        let record = Item::from_uniform(item, Utc::now());
        let key = item_key(&record.item_code);

        let fields = [
            ("item_code", record.item_code.clone()),
            ("item_name", record.item_name.clone()),
            ("manufacturer_name", record.manufacturer_name.clone()),
            ("manufacture_country", record.manufacture_country.clone()),
            ("unit_of_measure", record.unit_of_measure.clone()),
            ("updated_at", record.updated_at.to_rfc3339()),
        ];
        let _: () = conn.hset_multiple(&key, &fields).await?;

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
        let mut conn = self.get_connection();
        let key = price_key(&chain.name, &store.store_id, &item.item_code);
        let score = observed_at.timestamp_millis();

        let point = ItemPrice::new(item, chain, store, record, observed_at);
        let member = serde_json::to_string(&point)?;

        let stored: String = self
            .insert_price_script
            .key(&key)
            .arg(score)
            .arg(&member)
            .invoke_async(&mut conn)
            .await?;
        if stored == member {
            return Ok(point);
        }

        debug!("Price point {}@{} already recorded", key, score);
        Ok(serde_json::from_str(&stored)?)
    }

    async fn find_store(&self, chain: &str, store_id: &str) -> Result<Option<Store>> {
        let mut conn = self.get_connection();
        let key = store_hash_key(chain, store_id);

        let mut map: HashMap<String, String> = conn.hgetall(&key).await?;
        if map.is_empty() {
            return Ok(None);
        }

        let updated_at = field(&mut map, &key, "updated_at")?;
        Ok(Some(Store {
            chain: field(&mut map, &key, "chain")?,
            store_id: field(&mut map, &key, "store_id")?,
            chain_id: field(&mut map, &key, "chain_id")?,
            name: field(&mut map, &key, "name")?,
            address: field(&mut map, &key, "address")?,
            city: field(&mut map, &key, "city")?,
            zip_code: map.remove("zip_code").unwrap_or_default(),
            updated_at: parse_time(&key, &updated_at)?,
        }))
    }

    async fn price_history(
        &self,
        chain: &str,
        store_id: &str,
        item_code: &str,
    ) -> Result<Vec<ItemPrice>> {
        let mut conn = self.get_connection();
        let key = price_key(chain, store_id, item_code);

        let members: Vec<String> = conn.zrange(&key, 0, -1).await?;
        members
            .iter()
            .map(|m| serde_json::from_str(m).map_err(PersistenceError::from))
            .collect()
    }

    async fn current_price(
        &self,
        chain: &str,
        store_id: &str,
        item_code: &str,
    ) -> Result<Option<ItemPrice>> {
        let mut conn = self.get_connection();
        let key = price_key(chain, store_id, item_code);

        let latest: Vec<String> = conn.zrevrange(&key, 0, 0).await?;
        latest
            .first()
            .map(|m| serde_json::from_str(m).map_err(PersistenceError::from))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(chain_key("SHUFERSAL"), "chain:SHUFERSAL");
        assert_eq!(store_hash_key("SHUFERSAL", "001"), "store:SHUFERSAL:1");
        assert_eq!(item_key("7290000000001"), "item:7290000000001");
        assert_eq!(
            price_key("RAMI_LEVY", "039", "7290000000001"),
            "price:RAMI_LEVY:39:7290000000001"
        );
    }

    #[test]
    fn test_missing_field_is_corrupt() {
        let mut map = HashMap::new();
        map.insert("name".to_string(), "x".to_string());

        let err = field(&mut map, "store:SHUFERSAL:1", "city").unwrap_err();
        assert_eq!(err.kind(), "corrupt");
        assert_eq!(field(&mut map, "store:SHUFERSAL:1", "name").unwrap(), "x");
    }

    #[test]
    fn test_parse_time_round_trip() {
        let now = Utc::now();
        let parsed = parse_time("chain:SHUFERSAL", &now.to_rfc3339()).unwrap();
        assert_eq!(parsed, now);
        assert!(parse_time("chain:SHUFERSAL", "yesterday").is_err());
    }

    /// Needs a live Redis at `REDIS_URL` (default `redis://127.0.0.1:6379`).
    #[tokio::test]
    #[ignore]
    async fn test_concurrent_inserts_keep_one_point() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let repo = RedisRepository::connect(&url).await.unwrap();
        let chain_name = format!("TEST_{}", Utc::now().timestamp_nanos_opt().unwrap());
        let chain = repo.upsert_chain(&chain_name).await.unwrap();

        let uniform_store = UniformStore {
            chain_id: "7290027600007".to_string(),
            store_id: "1".to_string(),
            name: "Branch 1".to_string(),
            address: String::new(),
            city: "Haifa".to_string(),
            zip_code: String::new(),
        };
        let store = repo.upsert_store(&chain, &uniform_store).await.unwrap();

        let record = |price: i64| UniformItem {
            chain_id: "7290027600007".to_string(),
            store_id: "1".to_string(),
            item_code: "7290000000001".to_string(),
            item_name: "Bread".to_string(),
            manufacturer_name: "Angel".to_string(),
            manufacture_country: "IL".to_string(),
            item_price: rust_decimal::Decimal::new(price, 2),
            item_quantity: rust_decimal::Decimal::ONE,
            item_unit_of_measure: "unit".to_string(),
            item_unit_of_measure_price: rust_decimal::Decimal::new(price, 2),
            item_status: "1".to_string(),
            update_date: "2025-04-04".to_string(),
        };
        let first = record(590);
        let second = record(610);
        let item = repo.upsert_item(&first).await.unwrap();
        let observed_at = Utc::now();

        let (a, b) = tokio::join!(
            repo.insert_price(&item, &chain, &store, &first, observed_at),
            repo.insert_price(&item, &chain, &store, &second, observed_at),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        let history = repo
            .price_history(&chain_name, "1", "7290000000001")
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(a.price, b.price);
        assert_eq!(history[0].price, a.price);
    }
}
