//! Supplier detection from the product URL.
//!
//! The label is descriptive only: it names the source in the record and
//! in error messages, and never changes how extraction runs.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::types::target::Supplier;

/// Host prefixes dropped before deriving a label from an unknown host.
const HOST_PREFIXES: &[&str] = &[
    "www.", "m.", "shop.", "store.", "fr.", "en.", "de.", "es.", "it.", "uk.",
];

struct KnownSupplier {
    markers: &'static [&'static str],
    label: &'static str,
    id_patterns: Vec<Regex>,
}

fn patterns(sources: &[&str]) -> Vec<Regex> {
    sources.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

lazy_static! {
    /// Known suppliers in priority order. The first host marker hit wins.
    static ref KNOWN_SUPPLIERS: Vec<KnownSupplier> = vec![
        KnownSupplier {
            markers: &["aliexpress.", "ali.ski", "s.click.aliexpress"],
            label: "AliExpress",
            id_patterns: patterns(&[
                r"item/(\d+)\.html",
                r"/(\d+)\.html",
                r"productId=(\d+)",
                r"item/(\d+)",
            ]),
        },
        KnownSupplier {
            markers: &["amazon."],
            label: "Amazon",
            id_patterns: patterns(&[
                r"(?i)/dp/([A-Z0-9]{10})",
                r"(?i)/gp/product/([A-Z0-9]{10})",
                r"(?i)asin=([A-Z0-9]{10})",
            ]),
        },
        KnownSupplier {
            markers: &["ebay."],
            label: "eBay",
            id_patterns: patterns(&[r"/itm/(\d+)", r"/itm/[^/]+/(\d+)", r"item=(\d+)"]),
        },
        KnownSupplier {
            markers: &["temu.com", "share.temu"],
            label: "Temu",
            id_patterns: patterns(&[r"goods/(\d+)", r"g-(\d+)", r"goods_id=(\d+)"]),
        },
        KnownSupplier {
            markers: &["wish.com"],
            label: "Wish",
            id_patterns: patterns(&[r"product/([a-zA-Z0-9]+)", r"/c/([a-zA-Z0-9]+)"]),
        },
        KnownSupplier {
            markers: &["cjdropshipping.com", "cjdrop"],
            label: "CJ Dropshipping",
            id_patterns: patterns(&[r"product/([^/?]+)", r"pid=([^&]+)"]),
        },
        KnownSupplier {
            markers: &["bigbuy.eu", "bigbuy.com"],
            label: "BigBuy",
            id_patterns: patterns(&[r"/([^/]+)\.html", r"sku=([^&]+)"]),
        },
        KnownSupplier {
            markers: &["banggood.com"],
            label: "Banggood",
            id_patterns: patterns(&[r"-p-(\d+)\.html", r"products/(\d+)"]),
        },
        KnownSupplier {
            markers: &["dhgate.com"],
            label: "DHgate",
            id_patterns: patterns(&[r"product/([^/.]+)", r"/(\d+)\.html"]),
        },
        KnownSupplier {
            markers: &["shein."],
            label: "Shein",
            id_patterns: patterns(&[r"-p-(\d+)", r"productId=(\d+)"]),
        },
        KnownSupplier {
            markers: &["etsy.com"],
            label: "Etsy",
            id_patterns: patterns(&[r"listing/(\d+)"]),
        },
        KnownSupplier {
            markers: &["made-in-china.com"],
            label: "Made-in-China",
            id_patterns: patterns(&[r"product/([^/?]+)"]),
        },
        KnownSupplier {
            markers: &["walmart.com"],
            label: "Walmart",
            id_patterns: patterns(&[r"/ip/[^/]+/(\d+)", r"/(\d+)\?"]),
        },
        KnownSupplier {
            markers: &["cdiscount.com"],
            label: "Cdiscount",
            id_patterns: patterns(&[r"/f-\d+-([a-z0-9]+)\.html"]),
        },
    ];

    /// Storefront path shapes shared by many platforms.
    static ref GENERIC_ID_PATTERNS: Vec<Regex> =
        patterns(&[r"/products/([^/?#]+)", r"/product/([^/?#]+)"]);
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Label for a host with no table entry: common prefixes and the TLD
/// dropped, first remaining label capitalized.
fn host_label(host: &str) -> String {
    let mut bare = host.trim_end_matches('.');
    while let Some(prefix) = HOST_PREFIXES.iter().find(|p| bare.starts_with(*p)) {
        bare = &bare[prefix.len()..];
    }
    let first = bare.split('.').next().unwrap_or(bare);
    capitalize(first)
}

/// Detect the supplier label and product id for a URL.
pub fn detect_supplier(url: &Url) -> Supplier {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let full = url.as_str();

    if let Some(known) = KNOWN_SUPPLIERS
        .iter()
        .find(|s| s.markers.iter().any(|m| host.contains(m)))
    {
        let supplier = Supplier::new(known.label);
        return match first_capture(&known.id_patterns, full) {
            Some(id) => supplier.with_product_id(id),
            None => supplier,
        };
    }

    let supplier = Supplier::new(host_label(&host));
    match first_capture(&GENERIC_ID_PATTERNS, url.path()) {
        Some(id) => supplier.with_product_id(id),
        None => supplier,
    }
}
