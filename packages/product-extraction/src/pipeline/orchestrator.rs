//! Extraction orchestrator: runs the strategy chain for one URL.
//!
//! ```text
//! URL ─► validate ─► detect supplier ─► remote render ─► direct fetch ─► URL fallback
//!                                           │               │               │
//!                                           └── first record with a usable name wins
//! ```

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::fallback::UrlFallbackStrategy;
use super::strategy::PageStrategy;
use super::supplier::detect_supplier;
use crate::error::{CrawlResult, ExtractionError, Result, StrategyError};
use crate::extractors::normalize_product;
use crate::ingestors::{FirecrawlIngestor, HttpIngestor, ValidatedIngestor};
use crate::traits::ingestor::Ingestor;
use crate::traits::strategy::Strategy;
use crate::types::config::ExtractorConfig;
use crate::types::product::{ExtractedProduct, ExtractionStrategy};
use crate::types::target::ExtractionTarget;

/// Result of a successful extraction.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub product: ExtractedProduct,
    pub strategy: ExtractionStrategy,
}

/// Runs an ordered list of strategies and assembles the final record.
///
/// Holds no per-request state; one instance can serve concurrent requests
/// behind an `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// let orchestrator = Orchestrator::from_env()?;
/// let outcome = orchestrator.extract("https://shop.example.com/products/lamp").await?;
/// println!("{} via {}", outcome.product.name, outcome.strategy);
/// ```
pub struct Orchestrator {
    strategies: Vec<Arc<dyn Strategy>>,
    config: ExtractorConfig,
}

impl Orchestrator {
    /// Create an orchestrator with an empty strategy chain.
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            strategies: Vec::new(),
            config,
        }
    }

    /// Append a strategy to the chain.
    pub fn with_strategy(mut self, strategy: Arc<dyn Strategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// The standard chain: remote render, direct fetch, URL fallback.
    pub fn from_ingestors(
        render: Arc<dyn Ingestor>,
        direct: Arc<dyn Ingestor>,
        config: ExtractorConfig,
    ) -> Self {
        let render = PageStrategy::remote_render(render).with_config(config.clone());
        let direct = PageStrategy::direct_fetch(direct).with_config(config.clone());

        Self::new(config.clone())
            .with_strategy(Arc::new(render))
            .with_strategy(Arc::new(direct))
            .with_strategy(Arc::new(UrlFallbackStrategy::new().with_config(config)))
    }

    /// Standard chain over the network ingestors, with SSRF validation.
    ///
    /// The render service is configured from `FIRECRAWL_API_KEY`; without
    /// it the render strategy reports itself unavailable on every request.
    pub fn from_env() -> CrawlResult<Self> {
        let render = ValidatedIngestor::new(FirecrawlIngestor::from_env()?);
        let direct = ValidatedIngestor::new(HttpIngestor::new()?);
        Ok(Self::from_ingestors(
            Arc::new(render),
            Arc::new(direct),
            ExtractorConfig::default(),
        ))
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Names of the strategies in the order they run.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Extract a product record for `url`.
    pub async fn extract(&self, url: &str) -> Result<ExtractionOutcome> {
        self.extract_with_cancellation(url, &CancellationToken::new())
            .await
    }

    /// Extract with cooperative cancellation.
    ///
    /// Cancelling drops the in-flight strategy and runs no further ones.
    pub async fn extract_with_cancellation(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<ExtractionOutcome> {
        let input = url.trim();
        let parsed = validate_url(input)?;
        let supplier = detect_supplier(&parsed);
        let target = ExtractionTarget::new(parsed, supplier);

        info!(
            url = %input,
            supplier = %target.supplier.label,
            strategies = self.strategies.len(),
            "Starting product extraction"
        );

        let budget = Duration::from_secs(self.config.strategy_timeout_secs);

        for strategy in &self.strategies {
            if cancel.is_cancelled() {
                return Err(ExtractionError::Cancelled);
            }

            let attempt = tokio::time::timeout(budget, strategy.attempt(&target));
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(url = %input, strategy = strategy.name(), "Extraction cancelled");
                    return Err(ExtractionError::Cancelled);
                }
                result = attempt => result.unwrap_or(Err(StrategyError::Timeout {
                    secs: self.config.strategy_timeout_secs,
                })),
            };

            match result {
                Ok(product) => {
                    let product = normalize_product(product, &self.config);
                    if product.has_usable_name(self.config.min_name_chars) {
                        let outcome = self.finish(product, &target, input);
                        info!(
                            url = %input,
                            strategy = %outcome.strategy,
                            name = %outcome.product.name,
                            "Product extracted"
                        );
                        return Ok(outcome);
                    }
                    debug!(strategy = strategy.name(), "Record rejected: name too short");
                }
                Err(StrategyError::Unavailable(reason)) => {
                    debug!(strategy = strategy.name(), reason = %reason, "Strategy unavailable");
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "Strategy failed, trying next");
                }
            }
        }

        warn!(url = %input, supplier = %target.supplier.label, "All strategies failed");
        Err(ExtractionError::ExtractionFailed {
            supplier: target.supplier.label,
        })
    }

    fn finish(
        &self,
        mut product: ExtractedProduct,
        target: &ExtractionTarget,
        input: &str,
    ) -> ExtractionOutcome {
        product.source_url = input.to_string();
        product.source_name = target.supplier.label.clone();
        product.title = product.name.clone();
        if product.supplier_product_id.is_none() {
            product.supplier_product_id = target.supplier.product_id.clone();
        }

        let strategy = product.extraction_strategy;
        ExtractionOutcome { product, strategy }
    }
}

/// Parse and check the request URL.
pub fn validate_url(raw: &str) -> Result<Url> {
    if raw.is_empty() {
        return Err(ExtractionError::invalid_input("URL is required"));
    }

    let url = Url::parse(raw)
        .map_err(|e| ExtractionError::invalid_input(format!("malformed URL: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ExtractionError::invalid_input(format!(
            "unsupported URL scheme: {}",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ExtractionError::invalid_input("URL has no host"));
    }

    Ok(url)
}
