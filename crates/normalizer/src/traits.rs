//! Core traits for chain adapters (plugin interface).
//!
//! To add a new chain, describe its raw row layout with serde types and
//! implement [`ChainAdapter`]. Every adapter is a [`ChainTransformer`] through
//! the blanket impl, which owns the shared validate-map-or-drop loop.
//!
//! # Example
//!
//! ```ignore
//! pub struct VictoryAdapter;
//!
//! impl ChainAdapter for VictoryAdapter {
//!     const CHAIN: SupermarketChain = SupermarketChain::Victory;
//!     type Store = VictoryStore;
//!     type Product = VictoryProduct;
//!
//!     fn map_store(&self, store: VictoryStore) -> UniformStore { /* ... */ }
//!     fn map_product(&self, product: VictoryProduct) -> UniformItem { /* ... */ }
//! }
//! ```

use crate::error::{RowKind, ValidationError};
use crate::schema::{UniformItem, UniformStore};
use common::{RawRow, RowContent, SupermarketChain};
use metrics::counter;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

/// Outcome counts of one transform call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformReport {
    pub accepted: usize,
    pub rejected: usize,
}

impl TransformReport {
    pub fn total(&self) -> usize {
        self.accepted + self.rejected
    }
}

/// Object-safe transformer used by the registry and the orchestrator.
pub trait ChainTransformer: Send + Sync {
    fn chain(&self) -> SupermarketChain;

    /// Transform store rows, returning the rejected count as well.
    fn transform_stores_with_report(&self, rows: &[RawRow]) -> (Vec<UniformStore>, TransformReport);

    /// Transform price rows, returning the rejected count as well.
    fn transform_products_with_report(&self, rows: &[RawRow]) -> (Vec<UniformItem>, TransformReport);

    /// Rows failing validation are logged and dropped.
    fn transform_store_data(&self, rows: &[RawRow]) -> Vec<UniformStore> {
        self.transform_stores_with_report(rows).0
    }

    /// Rows failing validation are logged and dropped.
    fn transform_product_data(&self, rows: &[RawRow]) -> Vec<UniformItem> {
        self.transform_products_with_report(rows).0
    }
}

/// Per-chain schema plus mapping to the uniform format.
pub trait ChainAdapter: Send + Sync + 'static {
    /// Chain this adapter handles.
    const CHAIN: SupermarketChain;

    /// Validated store row.
    type Store: DeserializeOwned;

    /// Validated price row.
    type Product: DeserializeOwned;

    /// Validate a raw store row. Defaults to decoding `row_content` as [`Self::Store`].
    fn validate_store(&self, row: &RawRow) -> Result<Self::Store, ValidationError> {
        decode_content(Self::CHAIN, RowKind::Store, row, &row.row_content)
    }

    /// Validate a raw price row. Defaults to decoding `row_content` as [`Self::Product`].
    fn validate_product(&self, row: &RawRow) -> Result<Self::Product, ValidationError> {
        decode_content(Self::CHAIN, RowKind::Product, row, &row.row_content)
    }

    fn map_store(&self, store: Self::Store) -> UniformStore;

    fn map_product(&self, product: Self::Product) -> UniformItem;
}

impl<A: ChainAdapter> ChainTransformer for A {
    fn chain(&self) -> SupermarketChain {
        A::CHAIN
    }

    fn transform_stores_with_report(&self, rows: &[RawRow]) -> (Vec<UniformStore>, TransformReport) {
        transform_rows(A::CHAIN, RowKind::Store, rows, |row| {
            self.validate_store(row).map(|s| self.map_store(s))
        })
    }

    fn transform_products_with_report(&self, rows: &[RawRow]) -> (Vec<UniformItem>, TransformReport) {
        transform_rows(A::CHAIN, RowKind::Product, rows, |row| {
            self.validate_product(row).map(|p| self.map_product(p))
        })
    }
}

/// Decode `content` (usually the whole `row_content`) into a chain schema type.
pub fn decode_content<T: DeserializeOwned>(
    chain: SupermarketChain,
    kind: RowKind,
    row: &RawRow,
    content: &RowContent,
) -> Result<T, ValidationError> {
    serde_json::from_value(Value::Object(content.clone()))
        .map_err(|e| ValidationError::new(chain, kind, row, e.to_string()))
}

/// Validate and map each row independently; failures are logged, counted and dropped.
fn transform_rows<T, F>(
    chain: SupermarketChain,
    kind: RowKind,
    rows: &[RawRow],
    mut map_row: F,
) -> (Vec<T>, TransformReport)
where
    F: FnMut(&RawRow) -> Result<T, ValidationError>,
{
    let mut report = TransformReport::default();

    if rows.is_empty() {
        warn!("No {} data to transform for {}", kind, chain);
        return (Vec::new(), report);
    }

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        match map_row(row) {
            Ok(record) => {
                out.push(record);
                report.accepted += 1;
            }
            Err(e) => {
                report.rejected += 1;
                counter!(
                    "etl_rows_rejected_total",
                    "chain" => chain.as_str(),
                    "kind" => kind.as_str()
                )
                .increment(1);
                let content = Value::Object(e.row_content.clone());
                warn!("{} | row_content={}", e, content);
            }
        }
    }

    info!(
        "Transformed {}/{} {} rows for {} ({} rejected)",
        report.accepted,
        report.total(),
        kind,
        chain,
        report.rejected
    );

    (out, report)
}
