//! Raw fetched pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Page content as returned by an ingestor, before any extraction.
///
/// Render services return both a raw-markup view and a readable-text
/// (markdown) view; a plain HTTP fetch has the markup and a markdown
/// conversion of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPage {
    /// URL that was requested
    pub url: String,

    /// Raw HTML markup (may be empty when a source only returns text)
    pub html: String,

    /// Readable-text rendering of the page
    pub markdown: Option<String>,

    /// Page title if the source reported one
    pub title: Option<String>,

    /// MIME type from the response
    pub content_type: Option<String>,

    /// When the content was fetched
    pub fetched_at: DateTime<Utc>,

    /// Source-specific metadata (e.g., HTTP status, which service)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl RawPage {
    /// Create a new raw page from its markup.
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            markdown: None,
            title: None,
            content_type: None,
            fetched_at: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Set the readable-text view.
    pub fn with_markdown(mut self, markdown: impl Into<String>) -> Self {
        self.markdown = Some(markdown.into());
        self
    }

    /// Set the page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the fetched timestamp.
    pub fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = fetched_at;
        self
    }

    /// Add a metadata key-value pair.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Readable text, empty when the source gave none.
    pub fn readable_text(&self) -> &str {
        self.markdown.as_deref().unwrap_or("")
    }

    /// Check if either view carries content.
    pub fn has_content(&self) -> bool {
        !self.html.trim().is_empty() || !self.readable_text().trim().is_empty()
    }
}
