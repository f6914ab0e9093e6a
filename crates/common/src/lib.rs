//! Common types shared by the supermarket ingestion crates.
//!
//! - `SupermarketChain`: the closed set of chains this system can normalize
//! - `RawRow`: one row as delivered by the upstream scraper service
//! - `coerce`: serde helpers for fields that arrive as string or number

pub mod chain;
pub mod coerce;
pub mod error;
pub mod raw;

pub use chain::SupermarketChain;
pub use error::Error;
pub use raw::{RawRow, RowContent};
