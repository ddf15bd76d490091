//! Direct HTTP ingestor.
//!
//! Plain GET against the product page with a browser-like request identity
//! to get past trivial bot filters. No JavaScript is executed.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, UPGRADE_INSECURE_REQUESTS};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{CrawlError, CrawlResult};
use crate::traits::ingestor::Ingestor;
use crate::types::page::RawPage;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default transport timeout
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// HTTP ingestor that fetches the raw page markup.
///
/// For JavaScript-heavy sites, use `FirecrawlIngestor` instead.
///
/// # Example
///
/// ```rust,ignore
/// use product_extraction::ingestors::{HttpIngestor, ValidatedIngestor};
///
/// let ingestor = ValidatedIngestor::new(HttpIngestor::new()?);
/// let page = ingestor.fetch("https://example.com/products/lamp").await?;
/// ```
pub struct HttpIngestor {
    client: reqwest::Client,
}

impl HttpIngestor {
    /// Create a new HTTP ingestor with the default timeout.
    pub fn new() -> CrawlResult<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new HTTP ingestor with a custom transport timeout.
    pub fn with_timeout(timeout: Duration) -> CrawlResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| CrawlError::Http(Box::new(e)))?;

        Ok(Self { client })
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Extract title from HTML.
    fn extract_title(html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("title").ok()?;
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Convert HTML to a readable markdown view.
    fn html_to_markdown(html: &str) -> Option<String> {
        match htmd::convert(html) {
            Ok(markdown) if !markdown.trim().is_empty() => Some(markdown),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "HTML to markdown conversion failed");
                None
            }
        }
    }
}

#[async_trait]
impl Ingestor for HttpIngestor {
    async fn fetch(&self, url: &str) -> CrawlResult<RawPage> {
        debug!(url = %url, "HTTP fetch starting");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed");
            CrawlError::from_reqwest(e, url)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let html = response
            .text()
            .await
            .map_err(|e| CrawlError::from_reqwest(e, url))?;

        if html.trim().is_empty() {
            return Err(CrawlError::EmptyContent {
                url: url.to_string(),
            });
        }

        let mut page = RawPage::new(url, html.as_str())
            .with_fetched_at(Utc::now())
            .with_metadata("source", "http")
            .with_metadata("http_status", status.as_u16().to_string())
            .with_metadata("final_url", final_url);

        if let Some(title) = Self::extract_title(&html) {
            page = page.with_title(title);
        }
        if let Some(markdown) = Self::html_to_markdown(&html) {
            page = page.with_markdown(markdown);
        }
        if let Some(ct) = content_type {
            page = page.with_content_type(ct);
        }

        debug!(url = %url, html_len = page.html.len(), "HTTP fetch completed");
        Ok(page)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>Page Title</title></head></html>";
        assert_eq!(
            HttpIngestor::extract_title(html),
            Some("Page Title".to_string())
        );

        let html_no_title = "<html><body>No title</body></html>";
        assert_eq!(HttpIngestor::extract_title(html_no_title), None);
    }

    #[test]
    fn test_html_to_markdown() {
        let md = HttpIngestor::html_to_markdown("<h1>Hello</h1><p>World</p>").unwrap();
        assert!(md.contains("Hello"));
        assert!(md.contains("World"));
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_identity() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/products/desk-lamp")
            .match_header("user-agent", mockito::Matcher::Regex("Mozilla/5.0".into()))
            .match_header("accept-language", mockito::Matcher::Regex("fr-FR".into()))
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html><head><title>Desk Lamp</title></head><body><h1>Desk Lamp</h1></body></html>")
            .create_async()
            .await;

        let ingestor = HttpIngestor::new().unwrap();
        let url = format!("{}/products/desk-lamp", server.url());
        let page = ingestor.fetch(&url).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.title.as_deref(), Some("Desk Lamp"));
        assert!(page.html.contains("<h1>Desk Lamp</h1>"));
        assert!(page.readable_text().contains("Desk Lamp"));
        assert_eq!(page.metadata.get("http_status").map(String::as_str), Some("200"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/blocked")
            .with_status(403)
            .with_body("Forbidden")
            .create_async()
            .await;

        let ingestor = HttpIngestor::new().unwrap();
        let result = ingestor.fetch(&format!("{}/blocked", server.url())).await;

        assert!(matches!(result, Err(CrawlError::Status { status: 403, .. })));
    }
}
