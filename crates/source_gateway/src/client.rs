//! Supermarket scraper REST API client.

use crate::error::{Error, Result};
use crate::traits::{SourceGateway, DEFAULT_CONCURRENCY_LIMIT};
use crate::types::{AvailableChains, FileContent, FileType, ScrapedFiles, ServiceHealth};
use async_trait::async_trait;
use common::{RawRow, SupermarketChain};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Default upstream base URL.
pub const DEFAULT_BASE_URL: &str = "http://erlichsefi.ddns.net:8080";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`SupermarketApiClient`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
    /// Max concurrent file fetches inside one `extract_*` call.
    pub concurrency_limit: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
        }
    }
}

/// REST client for the scraper service.
#[derive(Debug, Clone)]
pub struct SupermarketApiClient {
    http: reqwest::Client,
    base_url: String,
    concurrency_limit: usize,
}

impl SupermarketApiClient {
    /// Build a client. Fails on a malformed token or a zero concurrency limit.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        if config.concurrency_limit == 0 {
            return Err(Error::InvalidConfig(
                "concurrency limit must be at least 1".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| Error::InvalidConfig(format!("invalid API token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            concurrency_limit: config.concurrency_limit,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}{endpoint}` and decode the JSON body.
    ///
    /// `context` ends up in every error so the caller's log line names the
    /// chain and file involved.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        context: String,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| classify(endpoint, &context, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                endpoint: endpoint.to_string(),
                context,
            });
        }
        if !status.is_success() {
            return Err(Error::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
                context,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify(endpoint, &context, e))?;

        serde_json::from_str(&body).map_err(|e| Error::Decode {
            endpoint: endpoint.to_string(),
            context,
            message: e.to_string(),
        })
    }
}

/// Map a transport-level reqwest error onto the gateway taxonomy.
fn classify(endpoint: &str, context: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            endpoint: endpoint.to_string(),
            context: context.to_string(),
        }
    } else if err.is_connect() {
        Error::Connect {
            endpoint: endpoint.to_string(),
            context: context.to_string(),
            source: err,
        }
    } else {
        Error::Http(err)
    }
}

#[async_trait]
impl SourceGateway for SupermarketApiClient {
    async fn health(&self) -> Result<ServiceHealth> {
        self.get_json("/service_health", &[], "health check".to_string())
            .await
    }

    async fn list_available_chains(&self) -> Result<Vec<String>> {
        let response: AvailableChains = self
            .get_json("/list_chains", &[], "chain discovery".to_string())
            .await?;
        Ok(response.list_of_chains)
    }

    async fn list_files(
        &self,
        chain: SupermarketChain,
        file_type: FileType,
    ) -> Result<Vec<String>> {
        let response: ScrapedFiles = self
            .get_json(
                "/list_scraped_files",
                &[("chain", chain.as_str()), ("file_type", file_type.as_str())],
                format!("chain={} file_type={}", chain, file_type),
            )
            .await?;

        Ok(response
            .processed_files
            .into_iter()
            .map(|f| f.file_name)
            .collect())
    }

    async fn fetch_file_content(
        &self,
        chain: SupermarketChain,
        file_name: &str,
    ) -> Result<Vec<RawRow>> {
        let content: FileContent = self
            .get_json(
                "/raw/file_content",
                &[("chain", chain.as_str()), ("file", file_name)],
                format!("chain={} file={}", chain, file_name),
            )
            .await?;

        let total = content.rows.len();
        let rows: Vec<RawRow> = content
            .rows
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| match serde_json::from_value::<RawRow>(value) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!(
                        "Skipping malformed raw row {} of {} ({}): {}",
                        i, file_name, chain, e
                    );
                    None
                }
            })
            .collect();

        debug!("Fetched {}/{} rows from {} ({})", rows.len(), total, file_name, chain);
        Ok(rows)
    }

    fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }
}
