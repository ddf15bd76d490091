//! Testing utilities: page fixtures and a network-free orchestrator.
//!
//! These are useful for testing applications that use the extraction
//! library without making real render-service or HTTP calls.

use std::sync::Arc;

use crate::ingestors::MockIngestor;
use crate::pipeline::Orchestrator;
use crate::types::config::ExtractorConfig;
use crate::types::page::RawPage;

/// A page carrying a schema.org Product block.
pub fn json_ld_page(url: &str, name: &str, price: &str, currency: &str) -> RawPage {
    let html = format!(
        r#"<html><head>
<title>{name} | Test Store</title>
<script type="application/ld+json">
{{
  "@context": "https://schema.org",
  "@type": "Product",
  "name": "{name}",
  "image": ["https://cdn.teststore.example/{slug}/main.jpg"],
  "offers": {{
    "@type": "Offer",
    "price": "{price}",
    "priceCurrency": "{currency}",
    "availability": "https://schema.org/InStock"
  }}
}}
</script>
</head><body><h1>{name}</h1></body></html>"#,
        name = name,
        slug = name.to_lowercase().replace(' ', "-"),
        price = price,
        currency = currency,
    );
    RawPage::new(url, html)
}

/// A page with no structured data, only Open Graph title and a text price.
pub fn heuristic_page(url: &str, og_title: &str, price_text: &str) -> RawPage {
    let html = format!(
        r#"<html><head>
<title>Accueil</title>
<meta property="og:title" content="{og_title}">
<meta property="og:image" content="https://cdn.teststore.example/og/cover.jpg">
</head><body>
<img src="https://cdn.teststore.example/ui/logo.png">
<p>{price_text}</p>
</body></html>"#,
    );
    RawPage::new(url, html)
}

/// An orchestrator running the standard chain over mock ingestors.
pub fn mock_orchestrator(render: MockIngestor, direct: MockIngestor) -> Orchestrator {
    Orchestrator::from_ingestors(Arc::new(render), Arc::new(direct), ExtractorConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::extract_structured;

    #[test]
    fn test_json_ld_fixture_is_structured() {
        let page = json_ld_page("https://teststore.example/p/1", "Desk Lamp", "19.99", "EUR");
        let structured = extract_structured(&page.html).unwrap();
        assert_eq!(structured.name.as_deref(), Some("Desk Lamp"));
        assert_eq!(
            structured.images,
            vec!["https://cdn.teststore.example/desk-lamp/main.jpg"]
        );
    }

    #[test]
    fn test_heuristic_fixture_has_no_structured_data() {
        let page = heuristic_page(
            "https://teststore.example/p/2",
            "Lampe de bureau LED",
            "Prix: 29,99 €",
        );
        assert!(extract_structured(&page.html).is_none());
    }
}
