//! Storage for the supermarket ETL pipeline.
//!
//! Chains, stores and items are upserted in place; price points are
//! append-only so every run adds history instead of replacing it.
//!
//! - [`Repository`]: async storage trait
//! - [`RedisRepository`]: production backend
//! - [`MemoryRepository`]: DashMap backend for tests and dry runs
//! - [`batch`]: bounded-concurrency batch writers used by the orchestrator

pub mod batch;
pub mod entities;
pub mod error;
pub mod memory;
pub mod redis_repository;
pub mod repository;

pub use batch::{upsert_products_bounded, upsert_stores_bounded, BatchOutcome, DEFAULT_WRITE_CONCURRENCY};
pub use entities::{Chain, Item, ItemPrice, Store};
pub use error::{PersistenceError, Result};
pub use memory::MemoryRepository;
pub use redis_repository::RedisRepository;
pub use repository::Repository;
