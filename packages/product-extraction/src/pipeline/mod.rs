//! Extraction pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - URL validation and supplier detection
//! - The ordered strategy chain (remote render, direct fetch, URL fallback)
//! - Per-strategy timeouts and caller cancellation
//! - Final normalization and labelling of the winning record

pub mod fallback;
pub mod orchestrator;
pub mod strategy;
pub mod supplier;

pub use fallback::{name_from_url, synthesize_product, UrlFallbackStrategy};
pub use orchestrator::{validate_url, ExtractionOutcome, Orchestrator};
pub use strategy::PageStrategy;
pub use supplier::detect_supplier;
