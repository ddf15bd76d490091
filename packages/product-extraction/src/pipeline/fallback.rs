//! Last-resort product synthesis from the URL alone.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use url::Url;

use crate::error::StrategyResult;
use crate::extractors::normalize::{normalize_product, DEFAULT_CATEGORY};
use crate::traits::strategy::Strategy;
use crate::types::config::ExtractorConfig;
use crate::types::product::{ExtractedProduct, ExtractionStrategy};
use crate::types::target::ExtractionTarget;

const MARKUP_SUFFIXES: &[&str] = &[".html", ".htm", ".php", ".aspx", ".jsp"];

const MANUAL_COMPLETION_NOTE: &str =
    "Imported from URL only. Complete the description, price and images manually.";

/// Turn the last path segment of a URL into a display name.
///
/// `wireless-ear-buds-2024.html` becomes `Wireless Ear Buds`. Returns an
/// empty string when nothing readable is left.
pub fn name_from_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default();

    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    let stem = MARKUP_SUFFIXES
        .iter()
        .find_map(|suffix| {
            let cut = decoded.len().checked_sub(suffix.len())?;
            decoded.get(cut..).filter(|tail| tail.eq_ignore_ascii_case(suffix))?;
            decoded.get(..cut)
        })
        .unwrap_or(&decoded);

    let spaced: String = stem
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .map(|c| if matches!(c, '-' | '_' | '+' | '.') { ' ' } else { c })
        .collect();

    spaced
        .split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Build a minimally valid record from the URL. Never fails.
///
/// The slug name is kept only when it still passes the orchestrator's
/// usable-name check after normalization; otherwise a dated placeholder
/// naming the supplier is used.
pub fn synthesize_product(
    url: &Url,
    supplier_label: &str,
    today: NaiveDate,
    config: &ExtractorConfig,
) -> ExtractedProduct {
    let candidate = ExtractedProduct::new(name_from_url(url), ExtractionStrategy::UrlFallback)
        .with_description(MANUAL_COMPLETION_NOTE)
        .with_category(DEFAULT_CATEGORY);

    if normalize_product(candidate.clone(), config).has_usable_name(config.min_name_chars) {
        return candidate;
    }

    let placeholder = format!("{} product {}", supplier_label, today.format("%Y-%m-%d"));
    ExtractedProduct::new(placeholder, ExtractionStrategy::UrlFallback)
        .with_description(MANUAL_COMPLETION_NOTE)
        .with_category(DEFAULT_CATEGORY)
}

/// Strategy wrapper around [`synthesize_product`]; the last link of the chain.
#[derive(Debug, Default, Clone)]
pub struct UrlFallbackStrategy {
    config: ExtractorConfig,
}

impl UrlFallbackStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the orchestrator's thresholds for the name check.
    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }
}

#[async_trait]
impl Strategy for UrlFallbackStrategy {
    fn name(&self) -> &str {
        "url_fallback"
    }

    async fn attempt(&self, target: &ExtractionTarget) -> StrategyResult<ExtractedProduct> {
        let today = Utc::now().date_naive();
        Ok(synthesize_product(
            &target.url,
            &target.supplier.label,
            today,
            &self.config,
        ))
    }
}
