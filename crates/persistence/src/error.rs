//! Error types for the persistence layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store {store_id} of {chain} not found for item {item_code}")]
    StoreNotFound {
        chain: String,
        store_id: String,
        item_code: String,
    },

    #[error("Corrupt record at {key}: {message}")]
    Corrupt { key: String, message: String },
}

impl PersistenceError {
    pub fn kind(&self) -> &'static str {
        match self {
            PersistenceError::Redis(_) => "redis",
            PersistenceError::Serialization(_) => "serialization",
            PersistenceError::StoreNotFound { .. } => "store_not_found",
            PersistenceError::Corrupt { .. } => "corrupt",
        }
    }
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
