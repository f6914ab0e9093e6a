//! Wire types of the upstream scraper service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /service_health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub timestamp: String,
}

/// `GET /list_chains`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AvailableChains {
    #[serde(default)]
    pub list_of_chains: Vec<String>,
}

/// `GET /list_scraped_files`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ScrapedFiles {
    #[serde(default)]
    pub processed_files: Vec<ScrapedFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ScrapedFile {
    pub file_name: String,
}

/// `GET /raw/file_content`
///
/// Rows are kept as raw JSON so one malformed row doesn't fail the whole file.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FileContent {
    #[serde(default)]
    pub rows: Vec<Value>,
}

/// Kinds of files the scraper publishes per chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileType {
    PriceFile,
    PriceFullFile,
    PromoFile,
    PromoFullFile,
    StoreFile,
}

impl FileType {
    /// Value of the `file_type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::PriceFile => "PRICE_FILE",
            FileType::PriceFullFile => "PRICE_FULL_FILE",
            FileType::PromoFile => "PROMO_FILE",
            FileType::PromoFullFile => "PROMO_FULL_FILE",
            FileType::StoreFile => "STORE_FILE",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
