use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;
use wreq::Client;
use wreq_util::Emulation;

use crate::config::ScrapingConfig;

/// Raw body of a downloaded asset
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// A fetched page with the status it was served with
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub body: String,
    pub status: u16,
}

/// Everything the tools need from the network
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage>;

    async fn fetch_asset(&self, url: &str) -> Result<FetchedAsset>;
}

/// Browser-emulating HTTP client; one request per call, no retries
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(config: &ScrapingConfig) -> Result<Self> {
        let client = Client::builder()
            .emulation(Emulation::Chrome131)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(HttpPageFetcher { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Network error for {}: {}", url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("HTTP error {} for {}", status, url));
        }

        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read response text from {}: {}", url, e))?;

        info!("Fetched {} characters from {}", body.chars().count(), url);
        Ok(FetchedPage {
            body,
            status: status.as_u16(),
        })
    }

    async fn fetch_asset(&self, url: &str) -> Result<FetchedAsset> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Network error for {}: {}", url, e))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error {} for {}", response.status(), url));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| anyhow!("Failed to read body of {}: {}", url, e))?;

        Ok(FetchedAsset {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

/// In-memory fetcher keyed by URL, used for offline runs and tests
#[derive(Debug, Default)]
pub struct StaticPageFetcher {
    pages: HashMap<String, String>,
    assets: HashMap<String, FetchedAsset>,
}

impl StaticPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    pub fn with_asset(mut self, url: impl Into<String>, bytes: Vec<u8>, content_type: Option<&str>) -> Self {
        self.assets.insert(
            url.into(),
            FetchedAsset {
                bytes,
                content_type: content_type.map(str::to_string),
            },
        );
        self
    }
}

#[async_trait]
impl PageFetcher for StaticPageFetcher {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        self.pages
            .get(url)
            .map(|body| FetchedPage {
                body: body.clone(),
                status: 200,
            })
            .ok_or_else(|| anyhow!("HTTP error 404 Not Found for {}", url))
    }

    async fn fetch_asset(&self, url: &str) -> Result<FetchedAsset> {
        self.assets
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("HTTP error 404 Not Found for {}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_fetcher_serves_known_urls() {
        let fetcher = StaticPageFetcher::new()
            .with_page("https://example.com/a", "<html></html>")
            .with_asset("https://example.com/a.png", vec![1, 2, 3], Some("image/png"));

        let page = fetcher.fetch_page("https://example.com/a").await.unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(page.body, "<html></html>");

        let asset = fetcher.fetch_asset("https://example.com/a.png").await.unwrap();
        assert_eq!(asset.bytes, vec![1, 2, 3]);
        assert_eq!(asset.content_type.as_deref(), Some("image/png"));

        assert!(fetcher.fetch_page("https://example.com/missing").await.is_err());
    }

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpPageFetcher::new(&ScrapingConfig::default()).is_ok());
    }
}
