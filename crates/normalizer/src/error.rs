//! Error types for the normalizer.

use common::{RawRow, RowContent, SupermarketChain};
use std::fmt;
use thiserror::Error;

/// Which file family a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    Store,
    Product,
}

impl RowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowKind::Store => "store",
            RowKind::Product => "product",
        }
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw row that does not match its chain's schema.
///
/// Carries the offending row so the log line is enough to reproduce it.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{chain} {kind} row {file_name}#{row_index} failed validation: {message}")]
pub struct ValidationError {
    pub chain: SupermarketChain,
    pub kind: RowKind,
    pub file_name: String,
    pub row_index: String,
    pub message: String,
    pub row_content: RowContent,
}

impl ValidationError {
    pub fn new(
        chain: SupermarketChain,
        kind: RowKind,
        row: &RawRow,
        message: impl Into<String>,
    ) -> Self {
        Self {
            chain,
            kind,
            file_name: row.file_name.clone(),
            row_index: row.row_index.clone(),
            message: message.into(),
            row_content: row.row_content.clone(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No transformer registered for chain: {0}")]
    UnsupportedChain(String),
}
