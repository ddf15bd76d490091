//! Strategy trait: one self-contained way of producing a product record.

use async_trait::async_trait;

use crate::error::StrategyResult;
use crate::types::product::ExtractedProduct;
use crate::types::target::ExtractionTarget;

/// One method of extracting a product record from a URL.
///
/// The orchestrator holds an ordered list of strategies and stops at the
/// first one whose record carries a usable name. Any error is treated as
/// "no result" and the next strategy runs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Try to produce a record for the target.
    async fn attempt(&self, target: &ExtractionTarget) -> StrategyResult<ExtractedProduct>;
}
