//! Thin DOM query helpers over `scraper`.

use scraper::{ElementRef, Html, Selector};

/// Image attributes scanned on every `<img>`, in order.
const IMAGE_ATTRS: &[&str] = &[
    "src",
    "data-src",
    "data-lazy-src",
    "data-original",
    "data-zoom-image",
];

/// `<select>` controls whose name or id contains one of these are page
/// chrome, not product options.
const NON_VARIANT_SELECTS: &[&str] = &[
    "country", "currency", "lang", "locale", "quantity", "qty", "sort", "region",
];

/// Option labels that only prompt for a choice.
const PLACEHOLDER_OPTIONS: &[&str] = &["select", "choose", "choisir", "sélectionner"];

/// Text content with whitespace collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    let raw = element.text().collect::<Vec<_>>().join(" ");
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A parsed HTML document with the lookups the extractors need.
///
/// `scraper::Html` is not `Send`; build and drop this inside synchronous
/// code only.
pub struct PageDom {
    document: Html,
}

impl PageDom {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    fn select_first(&self, selector: &str) -> Option<ElementRef<'_>> {
        let selector = Selector::parse(selector).ok()?;
        self.document.select(&selector).next()
    }

    /// Content of a `<meta>` tag matched by `property`, `name` or `itemprop`.
    pub fn meta(&self, key: &str) -> Option<String> {
        ["property", "name", "itemprop"]
            .iter()
            .filter_map(|attr| self.select_first(&format!(r#"meta[{}="{}"]"#, attr, key)))
            .filter_map(|el| el.value().attr("content"))
            .map(|content| content.trim().to_string())
            .find(|content| !content.is_empty())
    }

    /// Trimmed text of the first element matching `selector`.
    pub fn first_text(&self, selector: &str) -> Option<String> {
        let element = self.select_first(selector)?;
        let text = element.text().collect::<String>();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Attribute value of the first element matching `selector`.
    pub fn first_attr(&self, selector: &str, attr: &str) -> Option<String> {
        self.select_first(selector)?
            .value()
            .attr(attr)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Raw image URL candidates from every `<img>`, in document order.
    ///
    /// Each image contributes its lazy-load attributes and the first
    /// `srcset` entry.
    pub fn image_candidates(&self) -> Vec<String> {
        let Ok(selector) = Selector::parse("img") else {
            return Vec::new();
        };

        let mut candidates = Vec::new();
        for img in self.document.select(&selector) {
            let element = img.value();
            for attr in IMAGE_ATTRS {
                if let Some(value) = element.attr(attr) {
                    candidates.push(value.to_string());
                }
            }
            let first_srcset = element
                .attr("srcset")
                .and_then(|srcset| srcset.split(',').next())
                .and_then(|entry| entry.split_whitespace().next());
            if let Some(url) = first_srcset {
                candidates.push(url.to_string());
            }
        }
        candidates
    }

    /// Video URLs from `<video src>`, nested `<source src>` and
    /// `data-video-url`, in document order. Values are returned as written.
    pub fn video_candidates(&self) -> Vec<String> {
        let Ok(selector) = Selector::parse("video[src], video source[src], [data-video-url]")
        else {
            return Vec::new();
        };
        self.document
            .select(&selector)
            .filter_map(|el| {
                let element = el.value();
                element.attr("src").or_else(|| element.attr("data-video-url"))
            })
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect()
    }

    /// Label/value pairs from two-cell table rows and `<dt>`/`<dd>` lists.
    pub fn specification_rows(&self) -> Vec<(String, String)> {
        let mut rows = Vec::new();

        if let Ok(selector) = Selector::parse("tr") {
            for row in self.document.select(&selector) {
                let cells: Vec<_> = row
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|cell| matches!(cell.value().name(), "th" | "td"))
                    .collect();
                if let [label, value] = cells.as_slice() {
                    rows.push((element_text(*label), element_text(*value)));
                }
            }
        }

        if let Ok(selector) = Selector::parse("dl") {
            for list in self.document.select(&selector) {
                let mut label: Option<String> = None;
                for child in list.children().filter_map(ElementRef::wrap) {
                    match child.value().name() {
                        "dt" => label = Some(element_text(child)),
                        "dd" => {
                            if let Some(label) = label.take() {
                                rows.push((label, element_text(child)));
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        rows
    }

    /// `(value, label)` of every option in product `<select>` controls,
    /// skipping placeholders and chrome such as country pickers.
    pub fn variant_options(&self) -> Vec<(String, String)> {
        let Ok(selects) = Selector::parse("select") else {
            return Vec::new();
        };
        let Ok(options) = Selector::parse("option[value]") else {
            return Vec::new();
        };

        let mut found = Vec::new();
        for select in self.document.select(&selects) {
            let element = select.value();
            let key = format!(
                "{} {}",
                element.attr("name").unwrap_or_default(),
                element.id().unwrap_or_default()
            )
            .to_lowercase();
            if NON_VARIANT_SELECTS.iter().any(|marker| key.contains(marker)) {
                continue;
            }

            for option in select.select(&options) {
                let value = option.value().attr("value").unwrap_or_default().trim();
                let label = element_text(option);
                let lower = label.to_lowercase();
                if value.is_empty()
                    || label.is_empty()
                    || PLACEHOLDER_OPTIONS.iter().any(|p| lower.contains(p))
                {
                    continue;
                }
                found.push((value.to_string(), label));
            }
        }
        found
    }

    /// Bodies of every `<script type="application/ld+json">` block.
    pub fn json_ld_blocks(&self) -> Vec<String> {
        let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
            return Vec::new();
        };
        self.document
            .select(&selector)
            .map(|el| el.text().collect::<String>())
            .filter(|body| !body.trim().is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"
        <html><head>
            <title> Desk Lamp | Lumen Store </title>
            <meta property="og:title" content="Desk Lamp Pro">
            <meta name="description" content="  A bright lamp ">
            <script type="application/ld+json">{"@type":"Product"}</script>
        </head><body>
            <h1>Desk Lamp</h1>
            <img src="https://cdn.example.com/a.jpg" data-zoom-image="https://cdn.example.com/a-zoom.jpg">
            <img srcset="https://cdn.example.com/b-400.jpg 400w, https://cdn.example.com/b-800.jpg 800w">
            <span data-sku="LMP-42"></span>
        </body></html>
    "#;

    #[test]
    fn test_meta_lookup_by_property_and_name() {
        let dom = PageDom::parse(HTML);
        assert_eq!(dom.meta("og:title").as_deref(), Some("Desk Lamp Pro"));
        assert_eq!(dom.meta("description").as_deref(), Some("A bright lamp"));
        assert_eq!(dom.meta("og:image"), None);
    }

    #[test]
    fn test_text_and_attr() {
        let dom = PageDom::parse(HTML);
        assert_eq!(dom.first_text("title").as_deref(), Some("Desk Lamp | Lumen Store"));
        assert_eq!(dom.first_text("h1").as_deref(), Some("Desk Lamp"));
        assert_eq!(dom.first_attr("[data-sku]", "data-sku").as_deref(), Some("LMP-42"));
    }

    #[test]
    fn test_image_candidates_include_lazy_and_srcset() {
        let dom = PageDom::parse(HTML);
        assert_eq!(
            dom.image_candidates(),
            vec![
                "https://cdn.example.com/a.jpg",
                "https://cdn.example.com/a-zoom.jpg",
                "https://cdn.example.com/b-400.jpg",
            ]
        );
    }

    #[test]
    fn test_video_candidates() {
        let dom = PageDom::parse(
            r#"<video src="/media/spin.mp4"></video>
            <video poster="p.jpg">
                <source src="https://cdn.example.com/demo.webm" type="video/webm">
            </video>
            <div data-video-url="//cdn.example.com/unbox.mp4"></div>"#,
        );
        assert_eq!(
            dom.video_candidates(),
            vec![
                "/media/spin.mp4",
                "https://cdn.example.com/demo.webm",
                "//cdn.example.com/unbox.mp4",
            ]
        );
    }

    #[test]
    fn test_specification_rows() {
        let dom = PageDom::parse(
            r#"<table>
                <tr><th>Material</th><td>Solid oak</td></tr>
                <tr><td>Colour</td><td>Natural</td></tr>
                <tr><td>One cell only</td></tr>
                <tr><td>a</td><td>b</td><td>c</td></tr>
            </table>
            <dl><dt>Weight</dt><dd>2.4 kg</dd><dd>stray</dd></dl>"#,
        );
        assert_eq!(
            dom.specification_rows(),
            vec![
                ("Material".to_string(), "Solid oak".to_string()),
                ("Colour".to_string(), "Natural".to_string()),
                ("Weight".to_string(), "2.4 kg".to_string()),
            ]
        );
    }

    #[test]
    fn test_variant_options_skip_placeholders_and_chrome() {
        let dom = PageDom::parse(
            r#"<select name="size">
                <option value="">Select a size</option>
                <option value="ts-s">Small</option>
                <option value="ts-m"> Medium </option>
            </select>
            <select id="country-picker"><option value="fr">France</option></select>
            <select name="color"><option value="c1">Choisir une couleur</option>
                <option value="c2">Blue</option></select>"#,
        );
        assert_eq!(
            dom.variant_options(),
            vec![
                ("ts-s".to_string(), "Small".to_string()),
                ("ts-m".to_string(), "Medium".to_string()),
                ("c2".to_string(), "Blue".to_string()),
            ]
        );
    }

    #[test]
    fn test_json_ld_blocks() {
        let dom = PageDom::parse(HTML);
        assert_eq!(dom.json_ld_blocks(), vec![r#"{"@type":"Product"}"#]);
    }
}
