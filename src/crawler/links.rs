//! Link discovery for the crawler module
//!
//! Scans anchor tags and normalizes hrefs into same-site paths. Root-relative
//! hrefs are used as-is, absolute hrefs on the crawl domain are reduced to
//! their path, and everything else (external or malformed) is discarded.

use scraper::{Html, Selector};
use tracing::trace;
use url::Url;

/// Discover candidate same-site paths from a page's anchors
///
/// `domain` is the crawl root, e.g. `https://example.com`. Links pointing at
/// binary/asset files (per `skip_extensions`, matched case-insensitively)
/// are filtered out. The result preserves document order and may contain
/// the same path more than once; the coordinator's frontier dedups.
pub fn discover_links(html: &str, domain: &str, skip_extensions: &[String]) -> Vec<String> {
    let document = Html::parse_document(html);
    let anchor = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut paths = Vec::new();
    for element in document.select(&anchor) {
        let href = match element.value().attr("href") {
            Some(h) => h,
            None => continue,
        };

        let path = if href.starts_with('/') {
            href.to_string()
        } else if href.starts_with(domain) {
            match Url::parse(href) {
                Ok(url) => url.path().to_string(),
                Err(_) => continue,
            }
        } else {
            trace!("Discarding off-site link: {}", href);
            continue;
        };

        if is_asset_path(&path, skip_extensions) {
            continue;
        }

        paths.push(path);
    }

    paths
}

fn is_asset_path(path: &str, skip_extensions: &[String]) -> bool {
    let lower = path.to_lowercase();
    skip_extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
}
