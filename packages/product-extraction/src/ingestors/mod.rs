//! Ingestor implementations for the page sources the pipeline can use.
//!
//! # Available Ingestors
//!
//! - `FirecrawlIngestor` - Remote rendering service (executes JavaScript)
//! - `HttpIngestor` - Plain HTTP GET with a browser-like identity
//! - `MockIngestor` - For testing
//!
//! # Example
//!
//! ```rust,ignore
//! use product_extraction::ingestors::{HttpIngestor, Ingestor, ValidatedIngestor};
//!
//! let ingestor = ValidatedIngestor::new(HttpIngestor::new()?);
//! let page = ingestor.fetch("https://example.com/products/lamp").await?;
//! ```

mod firecrawl;
mod http;
mod mock;

pub use firecrawl::FirecrawlIngestor;
pub use http::HttpIngestor;
pub use mock::{MockFailure, MockIngestor, MockIngestorBuilder};

// Re-export from traits for convenience
pub use crate::traits::ingestor::{Ingestor, ValidatedIngestor};
