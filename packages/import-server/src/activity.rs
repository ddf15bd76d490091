//! Activity log for authenticated imports.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use product_extraction::{ExtractionOutcome, ExtractionStrategy};

/// One successful import by an authenticated user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub user_id: Uuid,
    pub action: String,
    pub source_url: String,
    pub product_name: String,
    pub strategy: ExtractionStrategy,
    pub recorded_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn product_import(user_id: Uuid, outcome: &ExtractionOutcome) -> Self {
        Self {
            user_id,
            action: "product_import".to_string(),
            source_url: outcome.product.source_url.clone(),
            product_name: outcome.product.name.clone(),
            strategy: outcome.strategy,
            recorded_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn record(&self, entry: ActivityEntry) -> Result<()>;
}

/// Writes entries to the tracing log.
#[derive(Debug, Default, Clone)]
pub struct TracingActivitySink;

#[async_trait]
impl ActivitySink for TracingActivitySink {
    async fn record(&self, entry: ActivityEntry) -> Result<()> {
        info!(
            user_id = %entry.user_id,
            action = %entry.action,
            source_url = %entry.source_url,
            strategy = %entry.strategy,
            "Activity recorded"
        );
        Ok(())
    }
}

/// Record an entry, logging and swallowing sink failures.
pub async fn record_quietly(sink: &dyn ActivitySink, entry: ActivityEntry) {
    let user_id = entry.user_id;
    if let Err(e) = sink.record(entry).await {
        warn!(user_id = %user_id, error = %e, "Failed to record activity");
    }
}
