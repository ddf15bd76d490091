//! Firecrawl-based ingestor implementation.
//!
//! Delegates fetching and rendering to the Firecrawl API, which executes
//! JavaScript and returns both a markdown and a raw-HTML view of the page.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{CrawlError, CrawlResult};
use crate::security::RenderCredentials;
use crate::traits::ingestor::Ingestor;
use crate::types::page::RawPage;

const FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev";

/// Default settle time for dynamic content (milliseconds)
const DEFAULT_WAIT_FOR_MS: u64 = 3000;

/// Transport budget on top of the settle time
const TRANSPORT_HEADROOM_SECS: u64 = 30;

/// Firecrawl-based ingestor for JavaScript-heavy sites.
///
/// Built without credentials, it stays in the pipeline but every fetch
/// returns [`CrawlError::NotConfigured`].
///
/// # Example
///
/// ```rust,ignore
/// use product_extraction::ingestors::{FirecrawlIngestor, ValidatedIngestor};
///
/// let ingestor = ValidatedIngestor::new(FirecrawlIngestor::from_env()?);
/// let page = ingestor.fetch("https://www.aliexpress.com/item/1005001.html").await?;
/// ```
pub struct FirecrawlIngestor {
    client: Client,
    credentials: Option<RenderCredentials>,
    wait_for_ms: u64,
}

// Request/Response types for Firecrawl API

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'static str; 2],
    only_main_content: bool,
    wait_for: u64,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    success: bool,
    data: Option<ScrapeData>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
    html: Option<String>,
    metadata: Option<PageMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageMetadata {
    title: Option<String>,
    status_code: Option<u16>,
}

impl FirecrawlIngestor {
    /// Create a Firecrawl ingestor. `None` yields an unconfigured ingestor.
    pub fn new(credentials: Option<RenderCredentials>) -> CrawlResult<Self> {
        Self::build(credentials, DEFAULT_WAIT_FOR_MS)
    }

    /// Create from `FIRECRAWL_API_KEY` / `FIRECRAWL_API_URL`.
    pub fn from_env() -> CrawlResult<Self> {
        Self::new(RenderCredentials::from_env())
    }

    fn build(credentials: Option<RenderCredentials>, wait_for_ms: u64) -> CrawlResult<Self> {
        let timeout =
            Duration::from_millis(wait_for_ms) + Duration::from_secs(TRANSPORT_HEADROOM_SECS);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CrawlError::Http(Box::new(e)))?;

        Ok(Self {
            client,
            credentials,
            wait_for_ms,
        })
    }

    /// Set how long the service waits for dynamic content to settle.
    ///
    /// Rebuilds the HTTP client so the transport timeout covers the wait.
    pub fn with_wait_for(self, ms: u64) -> CrawlResult<Self> {
        Self::build(self.credentials, ms)
    }

    fn endpoint(&self, credentials: &RenderCredentials) -> String {
        let base = credentials
            .base_url
            .as_deref()
            .unwrap_or(FIRECRAWL_API_URL)
            .trim_end_matches('/');
        format!("{}/v1/scrape", base)
    }

    /// Convert a scrape payload to a RawPage.
    fn data_to_raw_page(url: &str, data: ScrapeData) -> Option<RawPage> {
        let html = data.html.unwrap_or_default();
        let markdown = data.markdown.filter(|m| !m.trim().is_empty());

        if html.trim().is_empty() && markdown.is_none() {
            return None;
        }

        let mut page = RawPage::new(url, html)
            .with_fetched_at(Utc::now())
            .with_content_type("text/html")
            .with_metadata("source", "firecrawl");

        if let Some(markdown) = markdown {
            page = page.with_markdown(markdown);
        }

        if let Some(metadata) = data.metadata {
            if let Some(title) = metadata.title {
                page = page.with_title(title);
            }
            if let Some(status) = metadata.status_code {
                page = page.with_metadata("http_status", status.to_string());
            }
        }

        Some(page)
    }
}

#[async_trait]
impl Ingestor for FirecrawlIngestor {
    async fn fetch(&self, url: &str) -> CrawlResult<RawPage> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| CrawlError::NotConfigured("FIRECRAWL_API_KEY is not set".into()))?;

        tracing::debug!(url = %url, wait_for_ms = self.wait_for_ms, "Firecrawl scrape starting");

        let request = ScrapeRequest {
            url,
            formats: ["markdown", "html"],
            only_main_content: false,
            wait_for: self.wait_for_ms,
        };

        let endpoint = self.endpoint(credentials);
        let response = self
            .client
            .post(&endpoint)
            .header(
                "Authorization",
                format!("Bearer {}", credentials.api_key()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| CrawlError::from_reqwest(e, url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(url = %url, status = %status, body = %text, "Firecrawl API error");
            return Err(CrawlError::Status {
                status: status.as_u16(),
                url: endpoint,
            });
        }

        let body: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| CrawlError::Http(Box::new(e)))?;

        if !body.success {
            let reason = body.error.unwrap_or_else(|| "Firecrawl scrape failed".into());
            return Err(CrawlError::Http(reason.into()));
        }

        body.data
            .and_then(|data| Self::data_to_raw_page(url, data))
            .ok_or_else(|| CrawlError::EmptyContent {
                url: url.to_string(),
            })
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn name(&self) -> &str {
        "firecrawl"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ingestor() {
        let ingestor = FirecrawlIngestor::new(Some(RenderCredentials::new("test-key"))).unwrap();
        assert_eq!(ingestor.name(), "firecrawl");
        assert!(ingestor.is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_fetch_is_not_configured() {
        let ingestor = FirecrawlIngestor::new(None).unwrap();
        assert!(!ingestor.is_configured());

        let result = ingestor.fetch("https://example.com/p/1").await;
        assert!(matches!(result, Err(CrawlError::NotConfigured(_))));
    }

    #[test]
    fn test_data_to_raw_page() {
        let data = ScrapeData {
            markdown: Some("# Test\n\nContent".to_string()),
            html: Some("<h1>Test</h1>".to_string()),
            metadata: Some(PageMetadata {
                title: Some("Test Page".to_string()),
                status_code: Some(200),
            }),
        };

        let page = FirecrawlIngestor::data_to_raw_page("https://example.com/test", data).unwrap();
        assert_eq!(page.url, "https://example.com/test");
        assert_eq!(page.title, Some("Test Page".to_string()));
        assert!(page.readable_text().contains("# Test"));
        assert_eq!(page.html, "<h1>Test</h1>");
    }

    #[test]
    fn test_data_to_raw_page_empty_content() {
        let data = ScrapeData {
            markdown: Some("   ".to_string()),
            html: None,
            metadata: None,
        };

        assert!(FirecrawlIngestor::data_to_raw_page("https://example.com/empty", data).is_none());
    }

    #[tokio::test]
    async fn test_fetch_requests_both_views() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/scrape")
            .match_header("authorization", "Bearer fc-test")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "url": "https://shop.example.com/p/1",
                "formats": ["markdown", "html"],
                "onlyMainContent": false,
                "waitFor": 3000
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "success": true,
                    "data": {
                        "markdown": "# Rendered Product",
                        "html": "<h1>Rendered Product</h1>",
                        "metadata": { "title": "Rendered Product", "statusCode": 200 }
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let credentials = RenderCredentials::new("fc-test").with_base_url(server.url());
        let ingestor = FirecrawlIngestor::new(Some(credentials)).unwrap();
        let page = ingestor.fetch("https://shop.example.com/p/1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.html, "<h1>Rendered Product</h1>");
        assert_eq!(page.readable_text(), "# Rendered Product");
    }

    #[tokio::test]
    async fn test_fetch_service_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/scrape")
            .with_status(402)
            .with_body("payment required")
            .create_async()
            .await;

        let credentials = RenderCredentials::new("fc-test").with_base_url(server.url());
        let ingestor = FirecrawlIngestor::new(Some(credentials)).unwrap();
        let result = ingestor.fetch("https://shop.example.com/p/1").await;

        assert!(matches!(result, Err(CrawlError::Status { status: 402, .. })));
    }
}
