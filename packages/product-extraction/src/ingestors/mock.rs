//! Mock ingestor for testing.
//!
//! Provides a configurable mock implementation of the Ingestor trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{CrawlError, CrawlResult};
use crate::traits::ingestor::Ingestor;
use crate::types::page::RawPage;

/// Canned failure a mock can return for a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Non-success HTTP status
    Status(u16),
    /// Transport timeout
    Timeout,
    /// Response had no content
    Empty,
}

impl MockFailure {
    fn into_error(self, url: &str) -> CrawlError {
        match self {
            MockFailure::Status(status) => CrawlError::Status {
                status,
                url: url.to_string(),
            },
            MockFailure::Timeout => CrawlError::Timeout {
                url: url.to_string(),
            },
            MockFailure::Empty => CrawlError::EmptyContent {
                url: url.to_string(),
            },
        }
    }
}

#[derive(Default)]
struct MockState {
    pages: HashMap<String, RawPage>,
    failures: HashMap<String, MockFailure>,
    fetch_calls: Vec<String>,
}

/// Mock ingestor for testing.
///
/// Clones share state, so a test can hand one clone to a strategy and
/// inspect recorded calls on the other. Unknown URLs return HTTP 404.
///
/// # Example
///
/// ```rust
/// use product_extraction::ingestors::MockIngestor;
/// use product_extraction::types::page::RawPage;
///
/// let mock = MockIngestor::new()
///     .with_page(RawPage::new("https://example.com/p/1", "<h1>Lamp</h1>"));
/// assert_eq!(mock.fetch_call_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct MockIngestor {
    state: Arc<RwLock<MockState>>,
    unconfigured: bool,
    name: Option<String>,
}

impl MockIngestor {
    /// Create a new empty mock ingestor.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that reports itself as not configured and refuses every fetch.
    pub fn unconfigured() -> Self {
        Self {
            unconfigured: true,
            ..Self::default()
        }
    }

    /// Override the reported ingestor name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, MockState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, MockState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a page that will be returned by fetch.
    pub fn add_page(&self, page: RawPage) {
        self.write().pages.insert(page.url.clone(), page);
    }

    /// Make fetches of `url` fail.
    pub fn add_failure(&self, url: impl Into<String>, failure: MockFailure) {
        self.write().failures.insert(url.into(), failure);
    }

    /// Create a mock with a pre-configured page (builder pattern).
    pub fn with_page(self, page: RawPage) -> Self {
        self.add_page(page);
        self
    }

    /// Create a mock with a pre-configured failure (builder pattern).
    pub fn with_failure(self, url: impl Into<String>, failure: MockFailure) -> Self {
        self.add_failure(url, failure);
        self
    }

    /// Get the number of times fetch was called.
    pub fn fetch_call_count(&self) -> usize {
        self.read().fetch_calls.len()
    }

    /// Get the URLs that were requested via fetch.
    pub fn fetch_calls(&self) -> Vec<String> {
        self.read().fetch_calls.clone()
    }

    /// Clear all recorded calls.
    pub fn reset_calls(&self) {
        self.write().fetch_calls.clear();
    }
}

#[async_trait]
impl Ingestor for MockIngestor {
    async fn fetch(&self, url: &str) -> CrawlResult<RawPage> {
        if self.unconfigured {
            return Err(CrawlError::NotConfigured("mock ingestor disabled".into()));
        }

        let mut state = self.write();
        state.fetch_calls.push(url.to_string());

        if let Some(failure) = state.failures.get(url) {
            return Err(failure.into_error(url));
        }

        state
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| MockFailure::Status(404).into_error(url))
    }

    fn is_configured(&self) -> bool {
        !self.unconfigured
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("mock")
    }
}

/// Builder for creating test scenarios with the mock ingestor.
pub struct MockIngestorBuilder {
    mock: MockIngestor,
}

impl MockIngestorBuilder {
    /// Start building a mock ingestor.
    pub fn new() -> Self {
        Self {
            mock: MockIngestor::new(),
        }
    }

    /// Add a page with just URL and markup.
    pub fn page(self, url: &str, html: &str) -> Self {
        self.mock.add_page(RawPage::new(url, html));
        self
    }

    /// Add a page that only has a readable-text view.
    pub fn markdown_page(self, url: &str, markdown: &str) -> Self {
        self.mock.add_page(RawPage::new(url, "").with_markdown(markdown));
        self
    }

    /// Make a URL fail with the given HTTP status.
    pub fn status(self, url: &str, status: u16) -> Self {
        self.mock.add_failure(url, MockFailure::Status(status));
        self
    }

    /// Build the mock ingestor.
    pub fn build(self) -> MockIngestor {
        self.mock
    }
}

impl Default for MockIngestorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
