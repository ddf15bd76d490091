//! The validated input of one extraction request.

use url::Url;

/// Human-readable label for the source site, plus a product id when the
/// URL has a recognizable shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supplier {
    pub label: String,
    pub product_id: Option<String>,
}

impl Supplier {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            product_id: None,
        }
    }

    pub fn with_product_id(mut self, id: impl Into<String>) -> Self {
        self.product_id = Some(id.into());
        self
    }
}

/// A parsed, absolute product URL and the supplier detected from it.
#[derive(Debug, Clone)]
pub struct ExtractionTarget {
    pub url: Url,
    pub supplier: Supplier,
}

impl ExtractionTarget {
    pub fn new(url: Url, supplier: Supplier) -> Self {
        Self { url, supplier }
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}
