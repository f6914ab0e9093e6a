//! Client library for the upstream supermarket scraper service.
//!
//! The upstream service publishes the raw price/store dumps of every chain it
//! scrapes. This crate only does network I/O: health check, chain discovery,
//! file listing and file content fetch. Failures are classified into typed
//! errors (timeout, not found, bad status, ...) so callers can log and skip.
//!
//! # Example
//!
//! ```ignore
//! use source_gateway::{GatewayConfig, SourceGateway, SupermarketApiClient};
//! use common::SupermarketChain;
//!
//! let client = SupermarketApiClient::new(GatewayConfig::default())?;
//! let chains = client.list_available_chains().await?;
//! let rows = client.extract_product_data(SupermarketChain::Shufersal).await;
//! ```

pub mod client;
pub mod error;
pub mod traits;
pub mod types;

pub use client::{GatewayConfig, SupermarketApiClient, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use traits::{extract_files, SourceGateway, DEFAULT_CONCURRENCY_LIMIT};
pub use types::{FileType, ServiceHealth};
