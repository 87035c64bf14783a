//! Content extraction functionality for the crawler module
//!
//! Pulls the page title and main textual content out of raw HTML using a
//! fixed list of content selectors. Missing elements degrade to fallback
//! values rather than erroring.

use scraper::{Html, Selector};
use tracing::warn;

/// Fallback title for pages with neither an `<h1>` nor a `<title>`
pub const UNTITLED_PAGE: &str = "Untitled Page";

/// Title and main text extracted from a single page
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    /// Resolved page title
    pub title: String,

    /// Concatenated text of all content elements, whitespace-collapsed
    pub raw_content: String,
}

/// Extract the title and main content from raw HTML
///
/// Content is built by concatenating the text of every element matching
/// any of the given selectors, in document order, then collapsing runs of
/// whitespace to single spaces. The title resolves in order:
/// first `<h1>` text, document `<title>` text, then a fixed fallback.
pub fn extract_content(html: &str, content_selectors: &[String]) -> ExtractedPage {
    let document = Html::parse_document(html);

    // One combined selector keeps traversal in document order across the
    // whole selector set
    let mut text_parts: Vec<String> = Vec::new();
    match Selector::parse(&content_selectors.join(", ")) {
        Ok(selector) => {
            for element in document.select(&selector) {
                text_parts.push(element.text().collect::<String>());
            }
        }
        Err(_) => {
            // Re-parse one at a time so the offending selector can be named
            for selector_str in content_selectors {
                match Selector::parse(selector_str) {
                    Ok(selector) => {
                        for element in document.select(&selector) {
                            text_parts.push(element.text().collect::<String>());
                        }
                    }
                    Err(e) => {
                        warn!("Failed to parse selector '{}': {}", selector_str, e);
                    }
                }
            }
        }
    }

    let raw_content = text_parts
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    ExtractedPage {
        title: extract_title(&document),
        raw_content,
    }
}

fn extract_title(document: &Html) -> String {
    for selector_str in ["h1", "title"] {
        // Both selectors are statically valid
        let selector = match Selector::parse(selector_str) {
            Ok(s) => s,
            Err(_) => continue,
        };

        if let Some(element) = document.select(&selector).next() {
            let text = element.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return text;
            }
        }
    }

    UNTITLED_PAGE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::CrawlerConfig;

    fn selectors() -> Vec<String> {
        CrawlerConfig::default().content_selectors
    }

    #[test]
    fn test_extracts_main_content() {
        let html = r#"
            <html><head><title>Doc Title</title></head>
            <body>
              <nav>skip me</nav>
              <main>  Hello    world  </main>
              <div class="content">more   text</div>
            </body></html>
        "#;

        let page = extract_content(html, &selectors());
        assert_eq!(page.raw_content, "Hello world more text");
    }

    #[test]
    fn test_title_prefers_h1() {
        let html = "<html><head><title>Doc Title</title></head>\
                    <body><h1>Heading</h1><main>content</main></body></html>";
        let page = extract_content(html, &selectors());
        assert_eq!(page.title, "Heading");
    }

    #[test]
    fn test_title_falls_back_to_document_title() {
        let html = "<html><head><title>Doc Title</title></head>\
                    <body><main>content</main></body></html>";
        let page = extract_content(html, &selectors());
        assert_eq!(page.title, "Doc Title");
    }

    #[test]
    fn test_title_fallback_literal() {
        let html = "<html><body><main>content</main></body></html>";
        let page = extract_content(html, &selectors());
        assert_eq!(page.title, UNTITLED_PAGE);
    }

    #[test]
    fn test_no_content_elements_yields_empty_content() {
        let html = "<html><body><div>unmatched</div></body></html>";
        let page = extract_content(html, &selectors());
        assert_eq!(page.raw_content, "");
    }

    #[test]
    fn test_document_order_within_selector() {
        let html = "<html><body><article>first</article><article>second</article></body></html>";
        let page = extract_content(html, &selectors());
        assert_eq!(page.raw_content, "first second");
    }

    #[test]
    fn test_document_order_across_selectors() {
        // A later-listed selector's element appearing first in the document
        // must come first in the extracted text
        let html = r#"<html><body><div class="content">B</div><main>A</main></body></html>"#;
        let page = extract_content(html, &selectors());
        assert_eq!(page.raw_content, "B A");
    }

    #[test]
    fn test_bad_selector_is_skipped() {
        let html = "<html><body><main>content</main></body></html>";
        let bad = vec!["main".to_string(), ":::nope".to_string()];
        let page = extract_content(html, &bad);
        assert_eq!(page.raw_content, "content");
    }
}
