//! The extracted product record and its enums.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Currency of the extracted price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
    Cad,
    Aud,
    Chf,
    Jpy,
    Cny,
}

impl Currency {
    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Chf => "CHF",
            Currency::Jpy => "JPY",
            Currency::Cny => "CNY",
        }
    }

    /// Parse an ISO code or a currency symbol.
    ///
    /// A bare `$` is read as USD and `¥` as JPY.
    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "EUR" | "€" => Some(Currency::Eur),
            "USD" | "$" | "US$" => Some(Currency::Usd),
            "GBP" | "£" => Some(Currency::Gbp),
            "CAD" | "CA$" => Some(Currency::Cad),
            "AUD" | "AU$" => Some(Currency::Aud),
            "CHF" => Some(Currency::Chf),
            "JPY" | "¥" => Some(Currency::Jpy),
            "CNY" | "RMB" => Some(Currency::Cny),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Stock availability of the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
    LimitedStock,
}

/// Where the page content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    /// External rendering service (JavaScript executed)
    RemoteRender,
    /// Plain HTTP GET against the target
    DirectFetch,
}

/// How the record was read out of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    Structured,
    Heuristic,
}

/// Which strategy produced a record. Observability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    RemoteRenderStructured,
    RemoteRenderHeuristic,
    DirectFetchStructured,
    DirectFetchHeuristic,
    UrlFallback,
}

impl ExtractionStrategy {
    pub fn from_parts(source: PageSource, method: ExtractionMethod) -> Self {
        match (source, method) {
            (PageSource::RemoteRender, ExtractionMethod::Structured) => {
                ExtractionStrategy::RemoteRenderStructured
            }
            (PageSource::RemoteRender, ExtractionMethod::Heuristic) => {
                ExtractionStrategy::RemoteRenderHeuristic
            }
            (PageSource::DirectFetch, ExtractionMethod::Structured) => {
                ExtractionStrategy::DirectFetchStructured
            }
            (PageSource::DirectFetch, ExtractionMethod::Heuristic) => {
                ExtractionStrategy::DirectFetchHeuristic
            }
        }
    }

    /// Wire label, as reported in `scrapeMethod`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::RemoteRenderStructured => "remote_render_structured",
            ExtractionStrategy::RemoteRenderHeuristic => "remote_render_heuristic",
            ExtractionStrategy::DirectFetchStructured => "direct_fetch_structured",
            ExtractionStrategy::DirectFetchHeuristic => "direct_fetch_heuristic",
            ExtractionStrategy::UrlFallback => "url_fallback",
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            ExtractionStrategy::RemoteRenderStructured | ExtractionStrategy::DirectFetchStructured
        )
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One purchasable option of a product, such as a size or a colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub name: String,
    pub sku: Option<String>,

    /// Only set when the page prices the option separately.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,

    pub stock_status: Option<StockStatus>,
    pub image: Option<String>,
}

impl ProductVariant {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sku: None,
            price: None,
            stock_status: None,
            image: None,
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }
}

/// A normalized product record.
///
/// Built once per request by the orchestrator and not mutated after
/// [`crate::extractors::normalize::normalize_product`] has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedProduct {
    pub name: String,

    /// Display alias of `name`, kept identical by the orchestrator.
    pub title: String,

    pub description: String,

    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    pub currency: Currency,

    /// Absolute, deduplicated, capped image URLs.
    pub images: Vec<String>,

    pub brand: Option<String>,
    pub category: Option<String>,
    pub sku: Option<String>,

    /// Supplier label detected from the URL.
    pub source_name: String,

    pub source_url: String,

    /// Product identifier parsed from a known URL shape.
    pub supplier_product_id: Option<String>,

    pub stock_status: StockStatus,

    #[serde(with = "rust_decimal::serde::float_option")]
    pub rating: Option<Decimal>,

    pub review_count: Option<u64>,

    #[serde(default)]
    pub variants: Vec<ProductVariant>,

    /// Label to value pairs, e.g. `"Material" => "Oak"`.
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,

    /// Absolute, deduplicated, capped video URLs.
    #[serde(default)]
    pub videos: Vec<String>,

    pub extraction_strategy: ExtractionStrategy,
}

impl ExtractedProduct {
    /// Create a record with the given name and defaults everywhere else.
    pub fn new(name: impl Into<String>, strategy: ExtractionStrategy) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            description: String::new(),
            price: Decimal::ZERO,
            currency: Currency::default(),
            images: Vec::new(),
            brand: None,
            category: None,
            sku: None,
            source_name: String::new(),
            source_url: String::new(),
            supplier_product_id: None,
            stock_status: StockStatus::default(),
            rating: None,
            review_count: None,
            variants: Vec::new(),
            specifications: BTreeMap::new(),
            videos: Vec::new(),
            extraction_strategy: strategy,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_price(mut self, price: Decimal, currency: Currency) -> Self {
        self.price = price;
        self.currency = currency;
        self
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_stock_status(mut self, status: StockStatus) -> Self {
        self.stock_status = status;
        self
    }

    /// True when the name is non-empty and longer than `min_chars` characters.
    pub fn has_usable_name(&self, min_chars: usize) -> bool {
        let trimmed = self.name.trim();
        !trimmed.is_empty() && trimmed.chars().count() > min_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_from_code_and_symbol() {
        assert_eq!(Currency::from_code("eur"), Some(Currency::Eur));
        assert_eq!(Currency::from_code("€"), Some(Currency::Eur));
        assert_eq!(Currency::from_code(" GBP "), Some(Currency::Gbp));
        assert_eq!(Currency::from_code("$"), Some(Currency::Usd));
        assert_eq!(Currency::from_code("XYZ"), None);
    }

    #[test]
    fn test_strategy_labels() {
        let strategy =
            ExtractionStrategy::from_parts(PageSource::DirectFetch, ExtractionMethod::Structured);
        assert_eq!(strategy, ExtractionStrategy::DirectFetchStructured);
        assert_eq!(strategy.as_str(), "direct_fetch_structured");
        assert!(strategy.is_structured());
        assert!(!ExtractionStrategy::UrlFallback.is_structured());
    }

    #[test]
    fn test_usable_name() {
        let product = ExtractedProduct::new("Shoe", ExtractionStrategy::UrlFallback);
        assert!(product.has_usable_name(3));
        assert!(!product.has_usable_name(4));

        let blank = ExtractedProduct::new("   ", ExtractionStrategy::UrlFallback);
        assert!(!blank.has_usable_name(0));
    }

    #[test]
    fn test_serializes_camel_case_with_numeric_price() {
        let product = ExtractedProduct::new("Wireless Ear Buds", ExtractionStrategy::UrlFallback)
            .with_price(Decimal::new(1999, 2), Currency::Eur);
        let json = serde_json::to_value(&product).unwrap();

        assert_eq!(json["price"], serde_json::json!(19.99));
        assert_eq!(json["currency"], "EUR");
        assert_eq!(json["stockStatus"], "in_stock");
        assert_eq!(json["extractionStrategy"], "url_fallback");
        assert_eq!(json["sourceUrl"], "");
        assert!(json["rating"].is_null());
        assert_eq!(json["variants"], serde_json::json!([]));
        assert_eq!(json["specifications"], serde_json::json!({}));
        assert_eq!(json["videos"], serde_json::json!([]));
    }

    #[test]
    fn test_variant_serializes_optional_price() {
        let mut variant = ProductVariant::named("Large").with_sku("TS-L");
        variant.price = Some(Decimal::new(2450, 2));
        variant.stock_status = Some(StockStatus::OutOfStock);

        let json = serde_json::to_value(&variant).unwrap();

        assert_eq!(json["name"], "Large");
        assert_eq!(json["sku"], "TS-L");
        assert_eq!(json["price"], serde_json::json!(24.5));
        assert_eq!(json["stockStatus"], "out_of_stock");
        assert!(json["image"].is_null());
    }
}
