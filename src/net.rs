//! Text fetching for manifests and page documents.

use crate::{Error, PageConfig, Result};
use reqwest::blocking::Client;
use std::time::Duration;

/// Fetches a text document. Implementations must be shareable with the
/// prefetch worker threads.
pub trait Fetcher: Send + Sync {
    fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP fetcher.
///
/// Sends no cookies and asks intermediaries not to serve cached copies, so a
/// manifest is always read fresh.
pub struct HttpFetcher {
    client: Client,
    config: PageConfig,
}

impl HttpFetcher {
    pub fn new(config: PageConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                Error::InitializationError(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client, config })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String> {
        let mut req = self
            .client
            .get(url)
            .header("User-Agent", self.config.user_agent.clone())
            .header("Cache-Control", "no-store");
        for (k, v) in &self.config.headers {
            req = req.header(k.as_str(), v.as_str());
        }
        let resp = req
            .send()
            .map_err(|e| Error::NetworkError(format!("Failed to fetch {}: {}", url, e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::HttpStatus { url: url.to_string(), status: status.as_u16() });
        }

        resp.text()
            .map_err(|e| Error::NetworkError(format!("Failed to read response body: {}", e)))
    }
}

/// Refuses every request; the default for platforms without network access.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineFetcher;

impl Fetcher for OfflineFetcher {
    fn fetch_text(&self, url: &str) -> Result<String> {
        Err(Error::NetworkError(format!("offline: {}", url)))
    }
}
