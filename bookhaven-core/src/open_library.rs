//! Open Library client for the reading list and work details.
//!
//! Each call is one GET with no caching and no retry. A failed fetch is
//! surfaced to the caller, who decides whether to try again.

use crate::catalog::{self, CatalogDetail, CatalogItem};
use crate::config::Config;
use async_trait::async_trait;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    /// Transport failure or a non-success HTTP status
    #[error("{0}")]
    Network(String),
    /// The body was not JSON, or lacked fields every record needs
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The id cannot name a work, e.g. it contains a path separator
    #[error("invalid work id: {0:?}")]
    InvalidId(String),
}

/// Open Library work ids look like `OL45804W`. Anything outside ASCII
/// alphanumerics would change the request path.
fn check_work_id(id: &str) -> Result<(), CatalogError> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CatalogError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Source of catalog data. The service talks to this seam so tests can
/// swap in a fake.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// The reading list, normalized and truncated to the first
    /// `catalog::MAX_LIST_ITEMS` valid entries.
    async fn fetch_catalog_list(&self) -> Result<Vec<CatalogItem>, CatalogError>;

    /// One work's detail record.
    async fn fetch_catalog_detail(&self, id: &str) -> Result<CatalogDetail, CatalogError>;
}

/// Shared HTTP client for all Open Library requests.
fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .user_agent(concat!("bookhaven/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// HTTP-backed catalog source
#[derive(Clone, Debug)]
pub struct OpenLibraryClient {
    config: Config,
}

impl OpenLibraryClient {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, CatalogError> {
        debug!("Open Library request: {}", url);
        let response = http_client()
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Open Library returned {} for {}", status, url);
            return Err(CatalogError::Network(format!(
                "Request failed with status code {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;
        serde_json::from_str(&body)
            .map_err(|e| CatalogError::InvalidResponse(format!("{url}: {e}")))
    }
}

#[async_trait]
impl CatalogSource for OpenLibraryClient {
    async fn fetch_catalog_list(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        let json = self.get_json(&self.config.reading_list_url()).await?;
        let items = catalog::normalize_reading_list(&json, &self.config.covers_url);
        info!("Fetched {} reading list entries", items.len());
        Ok(items)
    }

    async fn fetch_catalog_detail(&self, id: &str) -> Result<CatalogDetail, CatalogError> {
        check_work_id(id)?;
        let json = self.get_json(&self.config.work_url(id)).await?;
        catalog::normalize_detail(&json, &self.config.covers_url).ok_or_else(|| {
            CatalogError::InvalidResponse(format!("work {id} has no key or title"))
        })
    }
}
