//! Structured-data extraction: schema.org JSON-LD and Open Graph product meta.
//!
//! JSON-LD in the wild is loosely typed. A price may be a number or a
//! string, `offers` an object or a list, `brand` an object or a bare name.
//! The wire types below are untagged enums with an `Other` catch-all so a
//! surprising shape degrades to "field missing" instead of failing the
//! whole entity.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

use super::dom::PageDom;
use super::normalize::{map_availability, normalize_currency, parse_price};
use crate::types::product::{
    Currency, ExtractedProduct, ExtractionMethod, ExtractionStrategy, PageSource, ProductVariant,
    StockStatus,
};

/// One value or a list of values.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
    Other(Value),
}

impl<T> OneOrMany<T> {
    /// All values as a list; shapes that did not match yield nothing.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
            OneOrMany::Other(_) => Vec::new(),
        }
    }

    pub fn into_first(self) -> Option<T> {
        self.into_vec().into_iter().next()
    }
}

/// A scalar that sites publish either as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
    Other(Value),
}

impl NumberOrText {
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            NumberOrText::Number(n) => n.to_string(),
            NumberOrText::Text(s) => s.trim().to_string(),
            NumberOrText::Other(_) => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    /// Numeric value; text goes through the locale-aware price parser.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            NumberOrText::Number(n) => Decimal::from_str(&n.to_string())
                .or_else(|_| Decimal::from_scientific(&n.to_string()))
                .ok(),
            NumberOrText::Text(s) => parse_price(s),
            NumberOrText::Other(_) => None,
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            NumberOrText::Number(n) => n.as_u64(),
            NumberOrText::Text(s) => s.trim().replace([',', '.', ' '], "").parse().ok(),
            NumberOrText::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BrandRef {
    Name(String),
    Object { name: Option<NumberOrText> },
    Other(Value),
}

impl BrandRef {
    pub fn name(&self) -> Option<String> {
        match self {
            BrandRef::Name(name) => Some(name.trim().to_string()).filter(|n| !n.is_empty()),
            BrandRef::Object { name } => name.as_ref().and_then(NumberOrText::as_text),
            BrandRef::Other(_) => None,
        }
    }
}

/// An image or video: a bare URL or an `ImageObject`/`VideoObject`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MediaRef {
    Url(String),
    Object {
        url: Option<String>,
        #[serde(rename = "contentUrl")]
        content_url: Option<String>,
        #[serde(rename = "embedUrl")]
        embed_url: Option<String>,
    },
    Other(Value),
}

impl MediaRef {
    pub fn url(self) -> Option<String> {
        match self {
            MediaRef::Url(url) => Some(url),
            MediaRef::Object {
                url,
                content_url,
                embed_url,
            } => content_url.or(url).or(embed_url),
            MediaRef::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Offer {
    name: Option<NumberOrText>,
    sku: Option<NumberOrText>,
    image: Option<OneOrMany<MediaRef>>,
    price: Option<NumberOrText>,
    low_price: Option<NumberOrText>,
    price_currency: Option<String>,
    availability: Option<String>,
}

impl Offer {
    fn price(&self) -> Option<Decimal> {
        self.price
            .as_ref()
            .and_then(NumberOrText::as_decimal)
            .or_else(|| self.low_price.as_ref().and_then(NumberOrText::as_decimal))
    }

    /// A named or SKU-carrying offer in a multi-offer list.
    fn into_variant(self) -> Option<ProductVariant> {
        let sku = self.sku.as_ref().and_then(NumberOrText::as_text);
        let name = self
            .name
            .as_ref()
            .and_then(NumberOrText::as_text)
            .or_else(|| sku.clone())?;

        Some(ProductVariant {
            name,
            sku,
            price: self.price(),
            stock_status: self.availability.as_deref().map(|a| map_availability(Some(a))),
            image: self
                .image
                .and_then(OneOrMany::into_first)
                .and_then(MediaRef::url),
        })
    }
}

/// A schema.org `PropertyValue` from `additionalProperty`.
#[derive(Debug, Clone, Deserialize)]
struct PropertyValue {
    name: Option<NumberOrText>,
    value: Option<NumberOrText>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AggregateRating {
    rating_value: Option<NumberOrText>,
    review_count: Option<NumberOrText>,
    rating_count: Option<NumberOrText>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductNode {
    name: Option<NumberOrText>,
    description: Option<NumberOrText>,
    sku: Option<NumberOrText>,
    image: Option<OneOrMany<MediaRef>>,
    video: Option<OneOrMany<MediaRef>>,
    brand: Option<OneOrMany<BrandRef>>,
    category: Option<OneOrMany<NumberOrText>>,
    offers: Option<OneOrMany<Offer>>,
    aggregate_rating: Option<OneOrMany<AggregateRating>>,
    additional_property: Option<OneOrMany<PropertyValue>>,
}

/// Where a structured record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredSource {
    JsonLd,
    OpenGraph,
}

/// Raw product fields read from structured data, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredProduct {
    pub source: StructuredSource,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub currency: Currency,
    pub images: Vec<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub sku: Option<String>,
    pub stock_status: StockStatus,
    pub rating: Option<Decimal>,
    pub review_count: Option<u64>,
    pub variants: Vec<ProductVariant>,
    pub specifications: BTreeMap<String, String>,
    pub videos: Vec<String>,
}

impl StructuredProduct {
    /// Convert to a product record labelled with the page source.
    pub fn into_product(self, source: PageSource) -> ExtractedProduct {
        let strategy = ExtractionStrategy::from_parts(source, ExtractionMethod::Structured);
        let mut product = ExtractedProduct::new(self.name.unwrap_or_default(), strategy)
            .with_description(self.description.unwrap_or_default())
            .with_price(self.price.unwrap_or(Decimal::ZERO), self.currency)
            .with_images(self.images)
            .with_stock_status(self.stock_status);
        product.brand = self.brand;
        product.category = self.category;
        product.sku = self.sku;
        product.rating = self.rating;
        product.review_count = self.review_count;
        product.variants = self.variants;
        product.specifications = self.specifications;
        product.videos = self.videos;
        product
    }
}

fn is_product_type(entity: &Value) -> bool {
    match entity.get("@type") {
        Some(Value::String(kind)) => kind == "Product",
        Some(Value::Array(kinds)) => kinds.iter().any(|k| k.as_str() == Some("Product")),
        _ => false,
    }
}

/// Candidate entities of one JSON-LD document: the top-level object, each
/// element of a top-level array, and each element of any `@graph`.
fn candidates(document: Value) -> Vec<Value> {
    let top_level = match document {
        Value::Array(items) => items,
        other => vec![other],
    };

    let mut expanded = Vec::new();
    for item in top_level {
        let graph = item.get("@graph").and_then(Value::as_array).cloned();
        expanded.push(item);
        if let Some(graph) = graph {
            expanded.extend(graph);
        }
    }
    expanded
}

fn map_product_node(node: ProductNode) -> StructuredProduct {
    let offers = node.offers.map(OneOrMany::into_vec).unwrap_or_default();
    // A lone offer is the product itself; several are its variants
    let variants = if offers.len() > 1 {
        offers.iter().cloned().filter_map(Offer::into_variant).collect()
    } else {
        Vec::new()
    };
    let offer = offers.into_iter().next().unwrap_or_default();
    let price = offer.price();

    let rating = node
        .aggregate_rating
        .and_then(OneOrMany::into_first)
        .unwrap_or_default();

    StructuredProduct {
        source: StructuredSource::JsonLd,
        name: node.name.as_ref().and_then(NumberOrText::as_text),
        description: node.description.as_ref().and_then(NumberOrText::as_text),
        price,
        currency: normalize_currency(offer.price_currency.as_deref()),
        images: media_urls(node.image),
        brand: node
            .brand
            .and_then(OneOrMany::into_first)
            .and_then(|brand| brand.name()),
        category: node
            .category
            .and_then(OneOrMany::into_first)
            .and_then(|c| c.as_text()),
        sku: node.sku.as_ref().and_then(NumberOrText::as_text),
        stock_status: map_availability(offer.availability.as_deref()),
        rating: rating.rating_value.as_ref().and_then(NumberOrText::as_decimal),
        review_count: rating
            .review_count
            .as_ref()
            .and_then(NumberOrText::as_count)
            .or_else(|| rating.rating_count.as_ref().and_then(NumberOrText::as_count)),
        variants,
        specifications: node
            .additional_property
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|property| {
                let name = property.name.as_ref().and_then(NumberOrText::as_text)?;
                let value = property.value.as_ref().and_then(NumberOrText::as_text)?;
                Some((name, value))
            })
            .collect(),
        videos: media_urls(node.video),
    }
}

fn media_urls(media: Option<OneOrMany<MediaRef>>) -> Vec<String> {
    media
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .filter_map(MediaRef::url)
        .collect()
}

fn from_json_ld(dom: &PageDom) -> Option<StructuredProduct> {
    dom.json_ld_blocks()
        .iter()
        .filter_map(|block| serde_json::from_str::<Value>(block).ok())
        .flat_map(candidates)
        .find(is_product_type)
        .and_then(|entity| serde_json::from_value::<ProductNode>(entity).ok())
        .map(map_product_node)
}

fn from_open_graph(dom: &PageDom) -> Option<StructuredProduct> {
    if !dom.meta("og:type")?.eq_ignore_ascii_case("product") {
        return None;
    }
    let name = dom.meta("og:title")?;
    let price = dom
        .meta("product:price:amount")
        .or_else(|| dom.meta("og:price:amount"))
        .and_then(|raw| parse_price(&raw))?;
    let currency = dom
        .meta("product:price:currency")
        .or_else(|| dom.meta("og:price:currency"));

    Some(StructuredProduct {
        source: StructuredSource::OpenGraph,
        name: Some(name),
        description: dom.meta("og:description"),
        price: Some(price),
        currency: normalize_currency(currency.as_deref()),
        images: dom.meta("og:image").into_iter().collect(),
        brand: dom.meta("product:brand"),
        category: None,
        sku: None,
        stock_status: map_availability(dom.meta("product:availability").as_deref()),
        rating: None,
        review_count: None,
        variants: Vec::new(),
        specifications: BTreeMap::new(),
        videos: ["og:video:secure_url", "og:video", "og:video:url"]
            .iter()
            .filter_map(|key| dom.meta(key))
            .collect(),
    })
}

/// Read a product from the page's structured data.
///
/// JSON-LD wins over Open Graph. Absence of data is `None`, never an error.
pub fn extract_structured(html: &str) -> Option<StructuredProduct> {
    let dom = PageDom::parse(html);
    extract_structured_from(&dom)
}

pub(crate) fn extract_structured_from(dom: &PageDom) -> Option<StructuredProduct> {
    from_json_ld(dom).or_else(|| from_open_graph(dom))
}
