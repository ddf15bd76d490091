//! Page-to-product extraction.
//!
//! Given a fetched page, structured data is tried first and heuristics
//! second. Both produce raw records; final cleanup happens once in
//! [`normalize::normalize_product`].

pub mod dom;
pub mod heuristic;
pub mod normalize;
pub mod probe;
pub mod structured;

use tracing::debug;

use crate::types::config::ExtractorConfig;
use crate::types::page::RawPage;
use crate::types::product::{ExtractedProduct, PageSource};

pub use heuristic::extract_heuristic;
pub use normalize::normalize_product;
pub use structured::{extract_structured, StructuredProduct};

/// Extract a product from one page: structured data, then heuristics.
///
/// A structured record is only kept when its name is usable; otherwise
/// the heuristic extractor gets the page. Videos, specifications and
/// variants the structured data leaves out are read from the markup.
pub fn extract_from_page(
    page: &RawPage,
    source: PageSource,
    config: &ExtractorConfig,
) -> Option<ExtractedProduct> {
    let dom = dom::PageDom::parse(&page.html);

    if let Some(structured) = structured::extract_structured_from(&dom) {
        let mut product = structured.into_product(source);
        if product.has_usable_name(config.min_name_chars) {
            heuristic::fill_markup_extras(&dom, &page.url, &mut product);
            return Some(product);
        }
        debug!(url = %page.url, "Structured data has no usable name, trying heuristics");
    }

    heuristic::extract_heuristic_from(&dom, page, source, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::product::ExtractionStrategy;

    #[test]
    fn test_structured_wins_over_heuristics() {
        let html = r#"<html><head>
            <title>Some Other Name Entirely</title>
            <script type="application/ld+json">
                {"@type": "Product", "name": "Structured Lamp", "offers": {"price": "19.99"}}
            </script>
        </head></html>"#;
        let page = RawPage::new("https://example.com/lamp", html);

        let product = extract_from_page(&page, PageSource::DirectFetch, &ExtractorConfig::default())
            .unwrap();

        assert_eq!(product.name, "Structured Lamp");
        assert_eq!(product.extraction_strategy, ExtractionStrategy::DirectFetchStructured);
    }

    #[test]
    fn test_structured_record_gains_markup_extras() {
        let html = r#"<html><head>
            <script type="application/ld+json">
                {"@type": "Product", "name": "Structured Lamp",
                 "additionalProperty": {"name": "Wattage", "value": "40 W"}}
            </script>
        </head><body>
            <table><tr><td>Colour</td><td>Brass</td></tr></table>
            <video><source src="clips/lamp.webm"></video>
        </body></html>"#;
        let page = RawPage::new("https://example.com/shop/lamp", html);

        let product = extract_from_page(&page, PageSource::DirectFetch, &ExtractorConfig::default())
            .unwrap();

        assert_eq!(product.specifications.len(), 1);
        assert_eq!(product.specifications["Wattage"], "40 W");
        assert_eq!(product.videos, vec!["https://example.com/shop/clips/lamp.webm"]);
    }

    #[test]
    fn test_nameless_structured_falls_through() {
        let html = r#"<html><head>
            <title>Heuristic Desk Lamp</title>
            <script type="application/ld+json">{"@type": "Product", "name": ""}</script>
        </head></html>"#;
        let page = RawPage::new("https://example.com/lamp", html);

        let product =
            extract_from_page(&page, PageSource::RemoteRender, &ExtractorConfig::default())
                .unwrap();

        assert_eq!(product.name, "Heuristic Desk Lamp");
        assert_eq!(product.extraction_strategy, ExtractionStrategy::RemoteRenderHeuristic);
    }

    #[test]
    fn test_empty_page_yields_nothing() {
        let page = RawPage::new("https://example.com/empty", "<html></html>");
        let config = ExtractorConfig::default();
        assert!(extract_from_page(&page, PageSource::DirectFetch, &config).is_none());
    }
}
