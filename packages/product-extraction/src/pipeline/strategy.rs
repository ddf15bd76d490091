//! Page-based strategies: fetch through an ingestor, then extract.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{StrategyError, StrategyResult};
use crate::extractors::extract_from_page;
use crate::traits::ingestor::Ingestor;
use crate::traits::strategy::Strategy;
use crate::types::config::ExtractorConfig;
use crate::types::page::RawPage;
use crate::types::product::{ExtractedProduct, PageSource};
use crate::types::target::ExtractionTarget;

/// Fetches the target through one ingestor and runs structured, then
/// heuristic extraction over the page.
///
/// The remote render and direct fetch strategies are both this type with
/// a different ingestor and [`PageSource`].
pub struct PageStrategy {
    name: &'static str,
    ingestor: Arc<dyn Ingestor>,
    source: PageSource,
    config: ExtractorConfig,
}

impl PageStrategy {
    pub fn new(ingestor: Arc<dyn Ingestor>, source: PageSource) -> Self {
        let name = match source {
            PageSource::RemoteRender => "remote_render",
            PageSource::DirectFetch => "direct_fetch",
        };
        Self {
            name,
            ingestor,
            source,
            config: ExtractorConfig::default(),
        }
    }

    /// Strategy over an external rendering service.
    pub fn remote_render(ingestor: Arc<dyn Ingestor>) -> Self {
        Self::new(ingestor, PageSource::RemoteRender)
    }

    /// Strategy over a plain HTTP fetch.
    pub fn direct_fetch(ingestor: Arc<dyn Ingestor>) -> Self {
        Self::new(ingestor, PageSource::DirectFetch)
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    fn extract(&self, page: &RawPage) -> StrategyResult<ExtractedProduct> {
        if !page.has_content() {
            return Err(StrategyError::NoUsableData);
        }
        extract_from_page(page, self.source, &self.config)
            .filter(|product| product.has_usable_name(self.config.min_name_chars))
            .ok_or(StrategyError::NoUsableData)
    }
}

#[async_trait]
impl Strategy for PageStrategy {
    fn name(&self) -> &str {
        self.name
    }

    async fn attempt(&self, target: &ExtractionTarget) -> StrategyResult<ExtractedProduct> {
        if !self.ingestor.is_configured() {
            return Err(StrategyError::Unavailable(format!(
                "{} ingestor is not configured",
                self.ingestor.name()
            )));
        }

        let page = self.ingestor.fetch(target.as_str()).await?;
        tracing::debug!(
            strategy = self.name,
            url = %target.url,
            html_len = page.html.len(),
            "Page fetched"
        );

        self.extract(&page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestors::{MockFailure, MockIngestor};
    use crate::types::product::ExtractionStrategy;
    use crate::types::target::Supplier;
    use url::Url;

    const URL: &str = "https://shop.example.com/products/desk-lamp";

    fn target() -> ExtractionTarget {
        ExtractionTarget::new(Url::parse(URL).unwrap(), Supplier::new("Shop"))
    }

    #[tokio::test]
    async fn test_structured_page() {
        let html = r#"<script type="application/ld+json">
            {"@type": "Product", "name": "Desk Lamp", "offers": {"price": "19.99", "priceCurrency": "EUR"}}
        </script>"#;
        let mock = MockIngestor::new().with_page(RawPage::new(URL, html));
        let strategy = PageStrategy::direct_fetch(Arc::new(mock.clone()));

        let product = strategy.attempt(&target()).await.unwrap();

        assert_eq!(strategy.name(), "direct_fetch");
        assert_eq!(product.name, "Desk Lamp");
        assert_eq!(product.extraction_strategy, ExtractionStrategy::DirectFetchStructured);
        assert_eq!(mock.fetch_calls(), vec![URL]);
    }

    #[tokio::test]
    async fn test_unconfigured_ingestor_is_unavailable() {
        let strategy = PageStrategy::remote_render(Arc::new(MockIngestor::unconfigured()));
        let result = strategy.attempt(&target()).await;
        assert!(matches!(result, Err(StrategyError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported() {
        let mock = MockIngestor::new().with_failure(URL, MockFailure::Status(503));
        let strategy = PageStrategy::direct_fetch(Arc::new(mock));
        let result = strategy.attempt(&target()).await;
        assert!(matches!(result, Err(StrategyError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_page_without_name_has_no_usable_data() {
        let mock = MockIngestor::new()
            .with_page(RawPage::new(URL, "<html><body><p>Hi</p></body></html>"));
        let strategy = PageStrategy::remote_render(Arc::new(mock));
        let result = strategy.attempt(&target()).await;
        assert!(matches!(result, Err(StrategyError::NoUsableData)));
    }
}
