//! Configuration for the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tunables shared by the extractors and the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// A record's name must be longer than this many characters for the
    /// orchestrator to accept it.
    ///
    /// Default: 3.
    pub min_name_chars: usize,

    /// Heuristic name candidates must be longer than this.
    ///
    /// Rejects generic chrome like a bare site name. Default: 10.
    pub min_heuristic_name_chars: usize,

    /// Maximum images kept per record. Default: 10.
    pub max_images: usize,

    /// Maximum videos kept per record. Default: 5.
    pub max_videos: usize,

    /// Maximum variants kept per record. Default: 100.
    pub max_variants: usize,

    /// Maximum name length after cleaning. Default: 200.
    pub max_name_chars: usize,

    /// Maximum description length after cleaning. Default: 1000.
    pub max_description_chars: usize,

    /// Prices at or above this are treated as parse noise.
    ///
    /// Default: 100 000.
    pub max_price: Decimal,

    /// Per-strategy wall-clock budget in seconds.
    ///
    /// Default: 45.
    pub strategy_timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_name_chars: 3,
            min_heuristic_name_chars: 10,
            max_images: 10,
            max_videos: 5,
            max_variants: 100,
            max_name_chars: 200,
            max_description_chars: 1000,
            max_price: Decimal::from(100_000),
            strategy_timeout_secs: 45,
        }
    }
}

impl ExtractorConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum accepted name length.
    pub fn with_min_name_chars(mut self, chars: usize) -> Self {
        self.min_name_chars = chars;
        self
    }

    /// Set the minimum heuristic name candidate length.
    pub fn with_min_heuristic_name_chars(mut self, chars: usize) -> Self {
        self.min_heuristic_name_chars = chars;
        self
    }

    /// Set the image cap.
    pub fn with_max_images(mut self, max: usize) -> Self {
        self.max_images = max;
        self
    }

    /// Set the price sanity bound.
    pub fn with_max_price(mut self, max: Decimal) -> Self {
        self.max_price = max;
        self
    }

    /// Set the per-strategy timeout.
    pub fn with_strategy_timeout(mut self, secs: u64) -> Self {
        self.strategy_timeout_secs = secs;
        self
    }
}
