//! Product Extraction Library
//!
//! Turns an arbitrary external product-page URL into a normalized product
//! record (name, description, price and currency, images, stock status,
//! rating) without per-site adapters.
//!
//! # Design Philosophy
//!
//! **"Never a hard failure for a valid URL"**
//!
//! - Several strategies run in order; the first plausible record wins
//! - Structured data first, heuristics second, the URL itself last
//! - Locale-aware normalization of prices, counts and availability
//! - Page sources are pluggable behind the [`Ingestor`] trait
//!
//! # Usage
//!
//! ```rust,ignore
//! use product_extraction::Orchestrator;
//!
//! let orchestrator = Orchestrator::from_env()?;
//! let outcome = orchestrator
//!     .extract("https://www.aliexpress.com/item/1005006123456789.html")
//!     .await?;
//!
//! println!("{} ({}) via {}", outcome.product.name, outcome.product.price, outcome.strategy);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (Ingestor, Strategy)
//! - [`types`] - Product record, pages, configuration
//! - [`extractors`] - Structured and heuristic extraction, field normalizers
//! - [`ingestors`] - Page sources (Firecrawl, HTTP, mock)
//! - [`pipeline`] - Strategy chain and orchestration
//! - [`security`] - Credential handling and SSRF protection
//! - [`testing`] - Fixtures and mock wiring for tests

pub mod error;
pub mod extractors;
pub mod ingestors;
pub mod pipeline;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{CrawlError, ExtractionError, SecurityError, StrategyError};
pub use ingestors::{FirecrawlIngestor, HttpIngestor, MockIngestor};
pub use pipeline::{ExtractionOutcome, Orchestrator, PageStrategy, UrlFallbackStrategy};
pub use security::{RenderCredentials, UrlValidator};
pub use traits::{
    ingestor::{Ingestor, ValidatedIngestor},
    strategy::Strategy,
};
pub use types::{
    config::ExtractorConfig,
    page::RawPage,
    product::{
        Currency, ExtractedProduct, ExtractionStrategy, PageSource, ProductVariant, StockStatus,
    },
    target::{ExtractionTarget, Supplier},
};
pub use rust_decimal::Decimal;
pub use tokio_util::sync::CancellationToken;
