//! Integration tests for the full extraction chain.
//!
//! Tests wire the standard chain (remote render, direct fetch, URL
//! fallback) over mock ingestors, so no network is touched. The short-slug
//! test also runs the URL fallback strategy on its own.

use product_extraction::{
    ingestors::{MockFailure, MockIngestor},
    testing::{heuristic_page, json_ld_page, mock_orchestrator},
    Currency, ExtractionError, ExtractionStrategy, ExtractorConfig, Orchestrator, RawPage,
    StockStatus, UrlFallbackStrategy,
};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

const PRODUCT_URL: &str = "https://www.lumenstore.com/products/desk-lamp";

fn price(raw: &str) -> Decimal {
    Decimal::from_str(raw).unwrap()
}

fn lamp_page() -> RawPage {
    json_ld_page(PRODUCT_URL, "Desk Lamp Pro", "19.99", "EUR")
}

#[tokio::test]
async fn test_structured_page_via_direct_fetch() {
    let direct = MockIngestor::new().with_page(lamp_page());
    let orchestrator = mock_orchestrator(MockIngestor::unconfigured(), direct);

    let outcome = assert_ok!(orchestrator.extract(PRODUCT_URL).await);

    assert_eq!(outcome.strategy, ExtractionStrategy::DirectFetchStructured);
    assert_eq!(outcome.product.name, "Desk Lamp Pro");
    assert_eq!(outcome.product.price, price("19.99"));
    assert_eq!(outcome.product.currency, Currency::Eur);
    assert_eq!(outcome.product.stock_status, StockStatus::InStock);
    assert_eq!(outcome.product.source_url, PRODUCT_URL);
    assert_eq!(outcome.product.source_name, "Lumenstore");
    assert_eq!(outcome.product.supplier_product_id.as_deref(), Some("desk-lamp"));
}

#[tokio::test]
async fn test_structured_page_via_remote_render() {
    let render = MockIngestor::new().with_page(lamp_page());
    let direct = MockIngestor::new();
    let orchestrator = mock_orchestrator(render, direct.clone());

    let outcome = assert_ok!(orchestrator.extract(PRODUCT_URL).await);

    assert_eq!(outcome.strategy, ExtractionStrategy::RemoteRenderStructured);
    assert_eq!(direct.fetch_call_count(), 0);
}

#[tokio::test]
async fn test_heuristic_price_and_og_title() {
    let direct = MockIngestor::new().with_page(heuristic_page(
        PRODUCT_URL,
        "Lampe de bureau LED orientable",
        "Prix: 29,99 €",
    ));
    let orchestrator = mock_orchestrator(MockIngestor::unconfigured(), direct);

    let outcome = assert_ok!(orchestrator.extract(PRODUCT_URL).await);

    assert_eq!(outcome.strategy, ExtractionStrategy::DirectFetchHeuristic);
    assert_eq!(outcome.product.name, "Lampe de bureau LED orientable");
    assert_eq!(outcome.product.price, price("29.99"));
    assert_eq!(outcome.product.currency, Currency::Eur);
    assert_eq!(outcome.product.images, vec!["https://cdn.teststore.example/og/cover.jpg"]);
}

#[tokio::test]
async fn test_url_fallback_without_network() {
    let url = "https://shop.example.com/wireless-ear-buds-2024.html";
    let orchestrator = mock_orchestrator(MockIngestor::unconfigured(), MockIngestor::new());

    let outcome = assert_ok!(orchestrator.extract(url).await);

    assert_eq!(outcome.strategy, ExtractionStrategy::UrlFallback);
    assert_eq!(outcome.product.name, "Wireless Ear Buds");
    assert_eq!(outcome.product.title, "Wireless Ear Buds");
    assert_eq!(outcome.product.price, Decimal::ZERO);
    assert_eq!(outcome.product.currency, Currency::Eur);
    assert!(outcome.product.images.is_empty());
    assert_eq!(outcome.product.source_url, url);
}

#[tokio::test]
async fn test_short_slugs_still_yield_a_record() {
    let fallback_only = Orchestrator::new(ExtractorConfig::default())
        .with_strategy(Arc::new(UrlFallbackStrategy::new()));
    let offline_chain = mock_orchestrator(MockIngestor::unconfigured(), MockIngestor::new());

    for url in [
        "https://example.com/mug",
        "https://example.com/ab",
        "https://example.com/a1b",
    ] {
        for orchestrator in [&fallback_only, &offline_chain] {
            let outcome = assert_ok!(orchestrator.extract(url).await);
            assert_eq!(outcome.strategy, ExtractionStrategy::UrlFallback);
            assert!(
                outcome.product.name.starts_with("Example product "),
                "unexpected name {:?} for {}",
                outcome.product.name,
                url
            );
            assert_eq!(outcome.product.source_url, url);
        }
    }
}

#[tokio::test]
async fn test_four_letter_slug_is_kept() {
    let orchestrator = mock_orchestrator(MockIngestor::unconfigured(), MockIngestor::new());

    let outcome = assert_ok!(orchestrator.extract("https://example.com/lamp").await);

    assert_eq!(outcome.product.name, "Lamp");
}

#[tokio::test]
async fn test_render_failure_then_direct_fetch_matches_direct_alone() {
    let page = lamp_page();

    let failing_render = MockIngestor::new().with_failure(PRODUCT_URL, MockFailure::Status(502));
    let chained = mock_orchestrator(failing_render, MockIngestor::new().with_page(page.clone()));
    let alone = mock_orchestrator(
        MockIngestor::unconfigured(),
        MockIngestor::new().with_page(page),
    );

    let chained = assert_ok!(chained.extract(PRODUCT_URL).await);
    let alone = assert_ok!(alone.extract(PRODUCT_URL).await);

    assert_eq!(chained.strategy, ExtractionStrategy::DirectFetchStructured);
    assert_eq!(chained.product, alone.product);
}

#[tokio::test]
async fn test_extraction_is_idempotent() {
    let render = MockIngestor::new().with_page(heuristic_page(
        PRODUCT_URL,
        "Lampe de bureau LED orientable",
        "Prix: 29,99 €",
    ));
    let orchestrator = mock_orchestrator(render, MockIngestor::new());

    let first = assert_ok!(orchestrator.extract(PRODUCT_URL).await);
    let second = assert_ok!(orchestrator.extract(PRODUCT_URL).await);

    assert_eq!(first.product, second.product);
    assert_eq!(first.strategy, second.strategy);
}

#[tokio::test]
async fn test_image_invariants_on_noisy_page() {
    let mut html =
        String::from("<html><head><title>Noisy Gallery Product Page</title></head><body>");
    html.push_str(r#"<img src="https://cdn.example.com/assets/site-logo.png">"#);
    html.push_str(r#"<img src="https://cdn.example.com/assets/placeholder.jpg">"#);
    html.push_str(r#"<img src="https://cdn.example.com/assets/icons/cart.png">"#);
    for i in 0..15 {
        html.push_str(&format!(
            r#"<img src="https://cdn.example.com/gallery/{0}.jpg" data-src="//cdn.example.com/gallery/{0}.jpg">"#,
            i
        ));
    }
    html.push_str("</body></html>");

    let direct = MockIngestor::new().with_page(RawPage::new(PRODUCT_URL, html));
    let orchestrator = mock_orchestrator(MockIngestor::unconfigured(), direct);

    let outcome = assert_ok!(orchestrator.extract(PRODUCT_URL).await);
    let images = &outcome.product.images;

    assert_eq!(images.len(), 10);
    assert_eq!(images.iter().collect::<HashSet<_>>().len(), images.len());
    for url in images {
        assert!(url.starts_with("https://"), "not absolute: {}", url);
        for marker in ["logo", "icon", "placeholder"] {
            assert!(!url.contains(marker), "kept {}: {}", marker, url);
        }
    }
}

#[tokio::test]
async fn test_variants_specifications_and_videos_are_normalized() {
    let mut html = String::from(
        r#"<html><head><script type="application/ld+json">
        {"@type": "Product", "name": "Cotton Tee",
         "offers": [
            {"name": "Cotton Tee - S", "sku": "TEE-S", "price": "15.00", "priceCurrency": "EUR"},
            {"name": "Cotton Tee - S", "sku": "TEE-S", "price": "15.00"},
            {"name": "Cotton Tee - XL", "sku": "TEE-XL", "price": "999999"}
         ]}
        </script></head><body>
        <table><tr><th>Fabric :</th><td> 100% cotton </td></tr></table>"#,
    );
    for i in 0..8 {
        html.push_str(&format!(r#"<video src="/media/tee-{}.mp4"></video>"#, i));
    }
    html.push_str("</body></html>");

    let direct = MockIngestor::new().with_page(RawPage::new(PRODUCT_URL, html));
    let orchestrator = mock_orchestrator(MockIngestor::unconfigured(), direct);

    let outcome = assert_ok!(orchestrator.extract(PRODUCT_URL).await);
    let product = &outcome.product;

    assert_eq!(product.variants.len(), 2);
    assert_eq!(product.variants[0].price, Some(price("15.00")));
    assert_eq!(product.variants[1].name, "Cotton Tee - XL");
    assert_eq!(product.variants[1].price, None);
    assert_eq!(product.specifications.get("Fabric").map(String::as_str), Some("100% cotton"));
    assert_eq!(product.videos.len(), 5);
    assert_eq!(product.videos[0], "https://www.lumenstore.com/media/tee-0.mp4");
}

#[tokio::test]
async fn test_invalid_urls_are_rejected() {
    let orchestrator = mock_orchestrator(MockIngestor::new(), MockIngestor::new());

    for url in ["", "   ", "not a url", "ftp://files.example.com/a.zip", "mailto:a@b.c"] {
        let err = assert_err!(orchestrator.extract(url).await);
        assert!(
            matches!(err, ExtractionError::InvalidInput { .. }),
            "expected invalid input for {:?}, got {:?}",
            url,
            err
        );
    }
}

#[tokio::test]
async fn test_record_invariants_for_every_strategy() {
    let urls_and_pages = [
        Some(json_ld_page(PRODUCT_URL, "Desk Lamp Pro", "19.99", "USD")),
        Some(heuristic_page(PRODUCT_URL, "Lampe de bureau LED orientable", "Prix: 29,99 €")),
        None,
    ];

    for page in urls_and_pages {
        let direct = match page {
            Some(page) => MockIngestor::new().with_page(page),
            None => MockIngestor::new(),
        };
        let orchestrator = mock_orchestrator(MockIngestor::unconfigured(), direct);
        let product = assert_ok!(orchestrator.extract(PRODUCT_URL).await).product;

        assert!(!product.name.trim().is_empty());
        assert_eq!(product.title, product.name);
        assert!(product.price >= Decimal::ZERO);
        assert_eq!(product.source_url, PRODUCT_URL);
        assert!(product.images.len() <= 10);
        assert!(product.videos.len() <= 5);
        assert!(product.videos.iter().all(|url| url.starts_with("http")));
        assert!(product.category.is_some());
    }
}
