//! Ingestor trait for pluggable page fetching.
//!
//! An ingestor turns a URL into a [`RawPage`]. The pipeline ships two
//! network-backed implementations (a remote rendering service and a plain
//! HTTP fetch) and a mock for tests. Strategies depend on this trait only,
//! so tests never need real network access.
//!
//! # Usage
//!
//! ```rust,ignore
//! use product_extraction::traits::ingestor::{Ingestor, ValidatedIngestor};
//! use product_extraction::ingestors::HttpIngestor;
//!
//! let ingestor = ValidatedIngestor::new(HttpIngestor::new()?);
//! let page = ingestor.fetch("https://example.com/products/shoe").await?;
//! ```

use async_trait::async_trait;

use crate::error::{CrawlError, CrawlResult};
use crate::security::UrlValidator;
use crate::types::page::RawPage;

/// Ingestor trait for fetching a single page.
///
/// Implementations:
/// - `FirecrawlIngestor` - remote rendering service (JavaScript executed)
/// - `HttpIngestor` - plain HTTP GET with browser-like headers
/// - `MockIngestor` - canned responses for tests
///
/// An implementation that cannot run at all (e.g. missing credentials)
/// returns [`CrawlError::NotConfigured`], which is distinct from a fetch
/// that ran and failed.
#[async_trait]
pub trait Ingestor: Send + Sync {
    /// Fetch one URL.
    async fn fetch(&self, url: &str) -> CrawlResult<RawPage>;

    /// Whether the ingestor has what it needs to attempt a fetch.
    fn is_configured(&self) -> bool {
        true
    }

    /// Get the ingestor name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

/// An ingestor that validates URLs before fetching (SSRF protection).
///
/// # Example
///
/// ```rust,ignore
/// let ingestor = ValidatedIngestor::new(HttpIngestor::new()?);
/// // Private and loopback addresses are refused before any request is sent
/// let page = ingestor.fetch("https://shop.example.com/p/42").await?;
/// ```
pub struct ValidatedIngestor<I: Ingestor> {
    inner: I,
    validator: UrlValidator,
}

impl<I: Ingestor> ValidatedIngestor<I> {
    /// Create a new validated ingestor with default security rules.
    pub fn new(ingestor: I) -> Self {
        Self {
            inner: ingestor,
            validator: UrlValidator::new(),
        }
    }

    /// Create with a custom validator.
    pub fn with_validator(ingestor: I, validator: UrlValidator) -> Self {
        Self {
            inner: ingestor,
            validator,
        }
    }
}

#[async_trait]
impl<I: Ingestor> Ingestor for ValidatedIngestor<I> {
    async fn fetch(&self, url: &str) -> CrawlResult<RawPage> {
        if let Err(e) = self.validator.validate_with_dns(url).await {
            tracing::warn!(url = %url, error = %e, "Refusing blocked URL");
            return Err(CrawlError::Security(e));
        }

        self.inner.fetch(url).await
    }

    fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestors::MockIngestor;

    #[tokio::test]
    async fn test_validated_ingestor_blocks_private_hosts() {
        let mock = MockIngestor::new().with_page(RawPage::new("http://127.0.0.1/admin", "<html/>"));
        let ingestor = ValidatedIngestor::new(mock.clone());

        let result = ingestor.fetch("http://127.0.0.1/admin").await;

        assert!(matches!(result, Err(CrawlError::Security(_))));
        assert_eq!(mock.fetch_call_count(), 0);
    }

    #[tokio::test]
    async fn test_validated_ingestor_passes_allowed_hosts() {
        let mock = MockIngestor::new().with_page(RawPage::new("http://127.0.0.1/p", "<html/>"));
        let validator = UrlValidator::new().allow_host("127.0.0.1");
        let ingestor = ValidatedIngestor::with_validator(mock.clone(), validator);

        let page = ingestor.fetch("http://127.0.0.1/p").await.unwrap();

        assert_eq!(page.url, "http://127.0.0.1/p");
        assert_eq!(ingestor.name(), "mock");
    }
}
