//! Raw rows as delivered by the upstream scraper service.

use crate::coerce::string_or_number;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open mapping of field name to string-or-number value.
pub type RowContent = Map<String, Value>;

/// One record from a scraped file (`GET /raw/file_content`).
///
/// Transient: raw rows are never persisted as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRow {
    #[serde(deserialize_with = "string_or_number")]
    pub row_index: String,
    #[serde(default)]
    pub found_folder: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub row_content: RowContent,
}

impl RawRow {
    /// Create a row from already-decoded content.
    pub fn new(
        row_index: impl Into<String>,
        found_folder: impl Into<String>,
        file_name: impl Into<String>,
        row_content: RowContent,
    ) -> Self {
        Self {
            row_index: row_index.into(),
            found_folder: found_folder.into(),
            file_name: file_name.into(),
            row_content,
        }
    }

    /// Short identifier for log lines: `{file_name}#{row_index}`.
    pub fn locator(&self) -> String {
        format!("{}#{}", self.file_name, self.row_index)
    }
}
