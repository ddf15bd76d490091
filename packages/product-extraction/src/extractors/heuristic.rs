//! Heuristic extraction from markup and readable text.
//!
//! Used when a page carries no structured product data. Every field is
//! probed from several places in a fixed order; see [`first_found`].

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use url::Url;

use super::dom::PageDom;
use super::normalize::{
    clean_text, detect_stock, extract_price, extract_rating, extract_review_count,
    normalize_currency, normalize_images, parse_price, price_in_range, DEFAULT_CATEGORY,
    MAX_LABEL_CHARS,
};
use super::probe::first_found;
use crate::types::config::ExtractorConfig;
use crate::types::page::RawPage;
use crate::types::product::{
    Currency, ExtractedProduct, ExtractionMethod, ExtractionStrategy, PageSource, ProductVariant,
};

/// Cap for descriptions assembled from readable text.
const READABLE_DESCRIPTION_CHARS: usize = 500;

/// Lines of readable text used for a fallback description.
const READABLE_DESCRIPTION_LINES: usize = 3;

const VIDEO_META_KEYS: &[&str] = &["og:video:secure_url", "og:video", "og:video:url"];

const TITLE_SEPARATORS: &[&str] = &[" | ", " - ", " – ", " — "];

/// Title segments that name the site or a landing page rather than a product.
const KNOWN_SITE_NAMES: &[&str] = &[
    "aliexpress",
    "amazon",
    "amazon.com",
    "amazon.fr",
    "banggood",
    "cdiscount",
    "ebay",
    "etsy",
    "shein",
    "temu",
    "walmart",
    "home",
    "accueil",
    "shop",
    "boutique",
];

lazy_static! {
    static ref EMBEDDED_BRAND: Regex = Regex::new(r#""brand"\s*:\s*"([^"]+)""#).unwrap();
    static ref BRAND_LABEL: Regex =
        Regex::new(r"(?i)\b(?:brand|marque)\**\s*:\s*\**\s*([^\n<|*]{2,60})").unwrap();
    static ref EMBEDDED_CATEGORY: Regex = Regex::new(r#""category"\s*:\s*"([^"]+)""#).unwrap();
    static ref CATEGORY_LABEL: Regex =
        Regex::new(r"(?i)\b(?:category|catégorie)\**\s*:\s*\**\s*([^\n<|*]{2,60})").unwrap();
    static ref EMBEDDED_SKU: Regex = Regex::new(r#""sku"\s*:\s*"([^"]+)""#).unwrap();
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Clean a name candidate and keep it only when it is long enough.
fn qualifying_name(raw: String, config: &ExtractorConfig) -> Option<String> {
    let cleaned = clean_text(&raw, config.max_name_chars);
    (cleaned.chars().count() > config.min_heuristic_name_chars).then_some(cleaned)
}

/// First segment of a document title, unless it is just the site name.
fn title_segment(title: &str) -> Option<String> {
    let first = TITLE_SEPARATORS
        .iter()
        .fold(title, |segment, sep| segment.split(sep).next().unwrap_or(segment))
        .trim();

    let lower = first.to_lowercase();
    if first.is_empty() || KNOWN_SITE_NAMES.contains(&lower.as_str()) {
        return None;
    }
    Some(first.to_string())
}

fn markdown_heading(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(|heading| heading.trim().to_string())
}

fn is_prose_line(line: &str) -> bool {
    !line.is_empty()
        && !line.starts_with('#')
        && !line.starts_with('[')
        && !line.starts_with("![")
        && !line.starts_with('<')
        && !line.contains("](")
}

/// First few prose lines of the readable text.
fn readable_summary(markdown: &str) -> Option<String> {
    let lines: Vec<&str> = markdown
        .lines()
        .map(str::trim)
        .filter(|line| is_prose_line(line))
        .take(READABLE_DESCRIPTION_LINES)
        .collect();

    let summary = clean_text(&lines.join(" "), READABLE_DESCRIPTION_CHARS);
    (!summary.is_empty()).then_some(summary)
}

fn meta_price(dom: &PageDom, max_price: Decimal) -> Option<(Decimal, Currency)> {
    let amount = dom
        .meta("product:price:amount")
        .or_else(|| dom.meta("og:price:amount"))?;
    let price = parse_price(&amount).filter(|p| price_in_range(*p, max_price))?;
    let currency = dom
        .meta("product:price:currency")
        .or_else(|| dom.meta("og:price:currency"));
    Some((price, normalize_currency(currency.as_deref())))
}

fn resolve_media_url(base: Option<&Url>, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.starts_with("//") || raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    base?.join(raw).ok().map(|url| url.to_string())
}

/// Fill videos, specifications and variants the record lacks from plain
/// markup: video meta and tags, spec tables, and option pickers.
///
/// Relative video URLs are resolved against `page_url`.
pub(crate) fn fill_markup_extras(dom: &PageDom, page_url: &str, product: &mut ExtractedProduct) {
    if product.videos.is_empty() {
        product.videos = VIDEO_META_KEYS
            .iter()
            .filter_map(|key| dom.meta(key))
            .chain(dom.video_candidates())
            .collect();
    }
    let base = Url::parse(page_url).ok();
    product.videos = product
        .videos
        .iter()
        .filter_map(|raw| resolve_media_url(base.as_ref(), raw))
        .collect();

    if product.specifications.is_empty() {
        product.specifications = dom.specification_rows().into_iter().collect();
    }

    if product.variants.is_empty() {
        product.variants = dom
            .variant_options()
            .into_iter()
            .map(|(value, label)| ProductVariant::named(label).with_sku(value))
            .collect();
    }
}

/// Extract a product from loosely-structured page content.
///
/// Returns `None` when no name candidate is longer than
/// `min_heuristic_name_chars`.
pub fn extract_heuristic(
    page: &RawPage,
    source: PageSource,
    config: &ExtractorConfig,
) -> Option<ExtractedProduct> {
    let dom = PageDom::parse(&page.html);
    extract_heuristic_from(&dom, page, source, config)
}

pub(crate) fn extract_heuristic_from(
    dom: &PageDom,
    page: &RawPage,
    source: PageSource,
    config: &ExtractorConfig,
) -> Option<ExtractedProduct> {
    let readable = page.readable_text();
    let combined = format!("{}\n{}", readable, page.html);

    let name = first_found(&[
        &|| {
            dom.first_text("title")
                .or_else(|| page.title.clone())
                .and_then(|title| title_segment(&title))
                .and_then(|segment| qualifying_name(segment, config))
        },
        &|| dom.meta("og:title").and_then(|t| qualifying_name(t, config)),
        &|| markdown_heading(readable).and_then(|h| qualifying_name(h, config)),
        &|| dom.first_text("h1").and_then(|h| qualifying_name(h, config)),
    ])?;

    let description = first_found(&[
        &|| dom.meta("og:description"),
        &|| dom.meta("description"),
        &|| readable_summary(readable),
    ])
    .unwrap_or_default();

    let (price, currency) = first_found(&[
        &|| meta_price(dom, config.max_price),
        &|| extract_price(&combined, config.max_price),
    ])
    .unwrap_or((Decimal::ZERO, Currency::Eur));

    let images = normalize_images(
        dom.meta("og:image")
            .into_iter()
            .chain(dom.image_candidates()),
        config.max_images,
    );

    let brand = first_found(&[
        &|| capture(&EMBEDDED_BRAND, &combined),
        &|| capture(&BRAND_LABEL, &combined),
    ])
    .map(|b| clean_text(&b, MAX_LABEL_CHARS));

    let category = first_found(&[
        &|| capture(&EMBEDDED_CATEGORY, &combined),
        &|| capture(&CATEGORY_LABEL, &combined),
    ])
    .map(|c| clean_text(&c, MAX_LABEL_CHARS))
    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    let sku = first_found(&[
        &|| capture(&EMBEDDED_SKU, &combined),
        &|| dom.first_attr("[data-sku]", "data-sku"),
    ]);

    let strategy = ExtractionStrategy::from_parts(source, ExtractionMethod::Heuristic);
    let mut product = ExtractedProduct::new(name, strategy)
        .with_description(description)
        .with_price(price, currency)
        .with_images(images)
        .with_category(category)
        .with_stock_status(detect_stock(&combined));
    product.brand = brand;
    product.sku = sku;
    product.rating = extract_rating(&combined);
    product.review_count = extract_review_count(&combined);
    fill_markup_extras(dom, &page.url, &mut product);

    Some(product)
}
