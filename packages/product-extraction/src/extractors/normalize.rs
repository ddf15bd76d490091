//! Field normalizers.
//!
//! Pure functions that turn messy page fragments into the canonical field
//! values of an [`ExtractedProduct`]. No I/O.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

use crate::types::config::ExtractorConfig;
use crate::types::product::{Currency, ExtractedProduct, ProductVariant, StockStatus};

/// Cap for brand, category and variant labels.
pub const MAX_LABEL_CHARS: usize = 100;

/// Specification labels must be shorter than this.
pub const MAX_SPEC_LABEL_CHARS: usize = 50;

/// Specification values must be shorter than this.
pub const MAX_SPEC_VALUE_CHARS: usize = 200;

/// Shortest image URL worth keeping.
pub const MIN_IMAGE_URL_CHARS: usize = 20;

/// Category used when a page names none.
pub const DEFAULT_CATEGORY: &str = "Import URL";

const IMAGE_EXCLUSION_MARKERS: &[&str] = &[
    "icon",
    "logo",
    "placeholder",
    "sprite",
    "pixel",
    "blank.gif",
    "spacer",
    "1x1",
];

const OUT_OF_STOCK_MARKERS: &[&str] = &[
    "out of stock",
    "sold out",
    "outofstock",
    "rupture de stock",
    "épuisé",
    "currently unavailable",
];

const SCARCITY_MARKERS: &[&str] = &[
    "limited stock",
    "hurry",
    "limitedavailability",
    "stock limité",
];

// Number body shared by the price patterns: grouped thousands with an
// optional 1-2 digit decimal part, or a plain run of digits.
const NUM: &str = r"\d{1,3}(?:[ \u{a0}.,]\d{3})+(?:[.,]\d{1,2})?|\d+(?:[.,]\d{1,2})?";

lazy_static! {
    /// Ordered locale price patterns. The first match that parses into the
    /// accepted range wins.
    static ref PRICE_PATTERNS: Vec<(Regex, Currency)> = vec![
        (Regex::new(&format!(r"({NUM})\s*(?:€|EUR\b)")).unwrap(), Currency::Eur),
        (Regex::new(&format!(r"(?:€|\bEUR)\s*({NUM})")).unwrap(), Currency::Eur),
        (Regex::new(&format!(r"(?:US\$|\$|\bUSD)\s*({NUM})")).unwrap(), Currency::Usd),
        (Regex::new(&format!(r"({NUM})\s*(?:\$|USD\b)")).unwrap(), Currency::Usd),
        (Regex::new(&format!(r"(?:£|\bGBP)\s*({NUM})")).unwrap(), Currency::Gbp),
        (Regex::new(&format!(r"({NUM})\s*(?:£|GBP\b)")).unwrap(), Currency::Gbp),
    ];

    static ref RATING_PATTERN: Regex =
        Regex::new(r"(?i)(\d(?:[.,]\d{1,2})?)\s*(?:out of|/|sur)\s*5\b").unwrap();

    static ref EMBEDDED_RATING: Regex =
        Regex::new(r#""ratingValue"\s*:\s*"?(\d+(?:\.\d+)?)"?"#).unwrap();

    // The count must not continue a number such as the "5" of "4.5/5"
    static ref REVIEW_PATTERN: Regex = Regex::new(concat!(
        r"(?i)(?:^|[^\d./,])",
        r"(\d{1,3}(?:[,. \u{a0}]\d{3})+|\d+(?:[.,]\d+)?[km]?)",
        r"\s*(?:reviews?|ratings?|avis|évaluations?)\b",
    )).unwrap();

    static ref EMBEDDED_REVIEWS: Regex =
        Regex::new(r#""(?:reviewCount|ratingCount)"\s*:\s*"?(\d+)"?"#).unwrap();

    static ref ONLY_N_LEFT: Regex = Regex::new(r"only\s+\d+\s+left").unwrap();

    static ref NUMERIC_ENTITY: Regex = Regex::new(r"&#(x[0-9a-fA-F]+|\d+);").unwrap();

    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Parse a price fragment using locale-aware separator rules.
///
/// With both `,` and `.` present, the last one is the decimal separator.
/// A lone separator followed by exactly three digits is a thousands
/// separator; otherwise it is the decimal separator.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    if !digits.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let last_comma = digits.rfind(',');
    let last_dot = digits.rfind('.');

    let canonical = match (last_comma, last_dot) {
        (Some(c), Some(d)) => {
            let (decimal, thousands) = if c > d { (',', '.') } else { ('.', ',') };
            digits.replace(thousands, "").replace(decimal, ".")
        }
        (Some(_), None) => resolve_single_separator(&digits, ','),
        (None, Some(_)) => resolve_single_separator(&digits, '.'),
        (None, None) => digits,
    };

    Decimal::from_str(canonical.trim_matches('.')).ok()
}

fn resolve_single_separator(digits: &str, sep: char) -> String {
    let parts: Vec<&str> = digits.split(sep).collect();
    let is_grouping = parts.len() > 2 || parts.last().is_some_and(|tail| tail.len() == 3);
    if is_grouping {
        parts.concat()
    } else {
        digits.replace(sep, ".")
    }
}

/// Whether a parsed price is plausible: strictly between zero and `max`.
pub fn price_in_range(price: Decimal, max: Decimal) -> bool {
    price > Decimal::ZERO && price < max
}

/// Find the first plausible price in free text.
///
/// Patterns are tried in a fixed order and the first match that parses
/// into range wins, together with that pattern's currency.
pub fn extract_price(text: &str, max_price: Decimal) -> Option<(Decimal, Currency)> {
    PRICE_PATTERNS.iter().find_map(|(pattern, currency)| {
        pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| parse_price(m.as_str()))
            .find(|price| price_in_range(*price, max_price))
            .map(|price| (price, *currency))
    })
}

/// Map a currency code or symbol to a supported currency, defaulting to EUR.
pub fn normalize_currency(raw: Option<&str>) -> Currency {
    raw.and_then(Currency::from_code).unwrap_or_default()
}

fn is_excluded_image(url: &str) -> bool {
    let lower = url.to_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or(&lower);
    lower.starts_with("data:")
        || path.ends_with(".svg")
        || IMAGE_EXCLUSION_MARKERS.iter().any(|m| lower.contains(m))
}

/// Canonicalize one image URL candidate.
pub fn normalize_image_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let absolute = if let Some(rest) = trimmed.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        trimmed.to_string()
    };

    if !absolute.starts_with("http") || absolute.len() < MIN_IMAGE_URL_CHARS {
        return None;
    }
    if is_excluded_image(&absolute) {
        return None;
    }
    Some(absolute)
}

/// Canonicalize, filter, deduplicate and cap an image list, keeping order.
pub fn normalize_images<I, S>(candidates: I, max: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter_map(|c| normalize_image_url(c.as_ref()))
        .filter(|url| seen.insert(url.clone()))
        .take(max)
        .collect()
}

/// Keep absolute http(s) video URLs, deduplicated and capped, in order.
///
/// Protocol-relative URLs are upgraded to https.
pub fn normalize_videos<I, S>(candidates: I, max: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter_map(|c| {
            let trimmed = c.as_ref().trim();
            let absolute = match trimmed.strip_prefix("//") {
                Some(rest) => format!("https://{}", rest),
                None => trimmed.to_string(),
            };
            (absolute.starts_with("https://") || absolute.starts_with("http://"))
                .then_some(absolute)
        })
        .filter(|url| seen.insert(url.clone()))
        .take(max)
        .collect()
}

/// Clean variant labels and drop nameless or repeated variants.
///
/// Two variants are the same when both name and SKU match.
pub fn normalize_variants(
    variants: Vec<ProductVariant>,
    max_price: Decimal,
    max: usize,
) -> Vec<ProductVariant> {
    let mut seen = HashSet::new();
    variants
        .into_iter()
        .filter_map(|mut variant| {
            variant.name = clean_text(&variant.name, MAX_LABEL_CHARS);
            if variant.name.is_empty() {
                return None;
            }
            variant.sku = clean_label(variant.sku);
            variant.price = variant.price.filter(|p| price_in_range(*p, max_price));
            variant.image = variant.image.and_then(|url| normalize_image_url(&url));
            Some(variant)
        })
        .filter(|variant| seen.insert((variant.name.clone(), variant.sku.clone())))
        .take(max)
        .collect()
}

/// Clean specification pairs. A trailing colon on the label is dropped;
/// pairs with an empty side or an oversized label or value are skipped.
pub fn normalize_specifications<I>(pairs: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    pairs
        .into_iter()
        .filter_map(|(label, value)| {
            let label = clean_text(&label, usize::MAX);
            let label = label.trim_end_matches(':').trim_end().to_string();
            let value = clean_text(&value, usize::MAX);

            let fits = !label.is_empty()
                && !value.is_empty()
                && label.chars().count() < MAX_SPEC_LABEL_CHARS
                && value.chars().count() < MAX_SPEC_VALUE_CHARS;
            fits.then_some((label, value))
        })
        .collect()
}

/// Classify stock availability from page text.
pub fn detect_stock(text: &str) -> StockStatus {
    let lower = text.to_lowercase();
    if OUT_OF_STOCK_MARKERS.iter().any(|m| lower.contains(m)) {
        StockStatus::OutOfStock
    } else if SCARCITY_MARKERS.iter().any(|m| lower.contains(m)) || ONLY_N_LEFT.is_match(&lower) {
        StockStatus::LimitedStock
    } else {
        StockStatus::InStock
    }
}

/// Map a schema.org or Open Graph availability value.
///
/// Matching ignores case, spaces and underscores, so `InStock`,
/// `https://schema.org/InStock` and `in stock` all map the same way.
pub fn map_availability(raw: Option<&str>) -> StockStatus {
    let value: String = raw
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect::<String>()
        .to_lowercase();
    if value.is_empty() {
        return StockStatus::InStock;
    }
    if ["instock", "instoreonly", "onlineonly"]
        .iter()
        .any(|m| value.contains(m))
    {
        StockStatus::InStock
    } else if value.contains("limitedavailability") {
        StockStatus::LimitedStock
    } else {
        StockStatus::OutOfStock
    }
}

/// Accept a rating only when it lies in `0..=5`.
pub fn bound_rating(rating: Decimal) -> Option<Decimal> {
    (rating >= Decimal::ZERO && rating <= Decimal::from(5)).then_some(rating)
}

/// Find a rating such as `4.5 out of 5`, `4,5/5` or `4.5 sur 5`.
pub fn extract_rating(text: &str) -> Option<Decimal> {
    RATING_PATTERN
        .captures_iter(text)
        .chain(EMBEDDED_RATING.captures_iter(text))
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| Decimal::from_str(&m.as_str().replace(',', ".")).ok())
        .find_map(bound_rating)
}

/// Parse a count with an optional `k`/`m` suffix and thousands separators.
pub fn parse_count(raw: &str) -> Option<u64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let lower = compact.to_lowercase();

    let (number, multiplier) = if let Some(n) = lower.strip_suffix('k') {
        (n, 1_000u64)
    } else if let Some(n) = lower.strip_suffix('m') {
        (n, 1_000_000u64)
    } else {
        (lower.as_str(), 1u64)
    };

    if multiplier == 1 {
        let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
        return digits.parse().ok();
    }

    let scaled = Decimal::from_str(&number.replace(',', ".")).ok()? * Decimal::from(multiplier);
    scaled.trunc().to_u64()
}

/// Find a review count such as `1,234 reviews` or `2.5k avis`.
pub fn extract_review_count(text: &str) -> Option<u64> {
    REVIEW_PATTERN
        .captures_iter(text)
        .chain(EMBEDDED_REVIEWS.captures_iter(text))
        .filter_map(|caps| caps.get(1))
        .find_map(|m| parse_count(m.as_str()))
}

fn decode_entities(raw: &str) -> String {
    let named = raw
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&euro;", "€")
        .replace("&pound;", "£");

    let numeric = NUMERIC_ENTITY.replace_all(&named, |caps: &regex::Captures| {
        let body = &caps[1];
        let code = match body.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => body.parse().ok(),
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    // Last, so `&amp;lt;` decodes to `&lt;` rather than `<`
    numeric.replace("&amp;", "&")
}

/// Shared text cleaner: decode entities, drop angle brackets, collapse
/// whitespace, trim and bound the length in characters.
pub fn clean_text(raw: &str, max_chars: usize) -> String {
    let decoded = decode_entities(raw).replace(['<', '>'], "");
    let collapsed = WHITESPACE.replace_all(&decoded, " ");
    collapsed.trim().chars().take(max_chars).collect::<String>().trim_end().to_string()
}

fn clean_label(raw: Option<String>) -> Option<String> {
    raw.map(|v| clean_text(&v, MAX_LABEL_CHARS))
        .filter(|v| !v.is_empty())
}

/// Pass a whole record through the normalizers.
///
/// Applied once by the orchestrator to whatever the winning strategy
/// produced, so every record leaves with the same guarantees.
pub fn normalize_product(
    mut product: ExtractedProduct,
    config: &ExtractorConfig,
) -> ExtractedProduct {
    product.name = clean_text(&product.name, config.max_name_chars);
    product.title = product.name.clone();
    product.description = clean_text(&product.description, config.max_description_chars);
    product.brand = clean_label(product.brand);
    product.category = clean_label(product.category).or_else(|| Some(DEFAULT_CATEGORY.to_string()));
    product.sku = clean_label(product.sku);
    product.images = normalize_images(&product.images, config.max_images);
    product.videos = normalize_videos(&product.videos, config.max_videos);
    product.variants = normalize_variants(product.variants, config.max_price, config.max_variants);
    product.specifications = normalize_specifications(product.specifications);

    if product.price < Decimal::ZERO || product.price >= config.max_price {
        product.price = Decimal::ZERO;
    }
    product.rating = product.rating.and_then(bound_rating);

    product
}
