//! Website crawler module
//!
//! This module provides functionality for crawling a site breadth-first,
//! extracting page content, and summarizing it through the completion API.
//! The coordinator owns the visited set and the frontier; fetching,
//! extraction, and link discovery are driven one page at a time.

mod config;
mod error;
mod extract;
mod fetch;
mod links;

pub use config::{CrawlerConfig, CrawlerConfigBuilder};
pub use error::CrawlError;
pub use extract::{extract_content, ExtractedPage, UNTITLED_PAGE};
pub use fetch::Fetcher;
pub use links::discover_links;

use crate::summarize::Summarizer;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, instrument, warn};

/// One crawled-and-summarized page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedPage {
    /// Resolved page title
    pub title: String,

    /// Model-condensed text of the page's main content
    pub content: String,

    /// Absolute URL of the page
    pub url: String,
}

/// A page that could not be fetched during a crawl run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFailure {
    /// Site-relative path of the page
    pub path: String,

    /// Human-readable failure description
    pub error: String,
}

/// Result of a crawl run: the pages that made it through the pipeline plus
/// per-page failures. A failed fetch no longer discards the rest of the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlOutcome {
    /// Successfully processed pages, in visit order
    pub pages: Vec<ProcessedPage>,

    /// Pages that failed to fetch
    pub failures: Vec<PageFailure>,
}

/// Crawl coordinator
///
/// Drives fetch, extract, summarize, and link discovery over a FIFO
/// frontier. A path is visited at most once per run; candidate links are
/// checked against both the visited set and the pending queue before being
/// enqueued, so the frontier never holds duplicates.
#[derive(Clone)]
pub struct Crawler {
    fetcher: Fetcher,
    summarizer: Summarizer,
    config: CrawlerConfig,
}

impl Crawler {
    /// Create a new crawler
    pub fn new(config: CrawlerConfig, summarizer: Summarizer) -> Result<Self, CrawlError> {
        let fetcher = Fetcher::new(&config)?;
        Ok(Self {
            fetcher,
            summarizer,
            config,
        })
    }

    /// Access the crawler configuration
    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Crawl a site starting from its root path
    ///
    /// `domain` is the scheme-plus-host root, e.g. `https://example.com`.
    /// The loop stops when the frontier drains; once the visited set exceeds
    /// `max_pages`, remaining queued paths are skipped without fetching, so
    /// a run visits at most `max_pages + 1` distinct paths.
    #[instrument(skip(self), level = "info")]
    pub async fn crawl(&self, domain: &str) -> CrawlOutcome {
        let domain = domain.trim_end_matches('/').to_string();
        info!("Starting crawl of {}", domain);

        let mut visited: HashSet<String> = HashSet::new();
        let mut pending: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();

        queue.push_back("/".to_string());
        pending.insert("/".to_string());

        let mut outcome = CrawlOutcome::default();

        while let Some(path) = queue.pop_front() {
            pending.remove(&path);

            if visited.contains(&path) || visited.len() > self.config.max_pages {
                continue;
            }
            visited.insert(path.clone());

            let url = format!("{}{}", domain, path);
            let html = match self.fetcher.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Failed to fetch {}: {}", url, e);
                    outcome.failures.push(PageFailure {
                        path,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let extracted = extract_content(&html, &self.config.content_selectors);
            let content_len = extracted.raw_content.chars().count();
            if content_len > self.config.min_content_len {
                let summary = self.summarizer.summarize(&extracted.raw_content).await;
                outcome.pages.push(ProcessedPage {
                    title: extracted.title,
                    content: summary,
                    url,
                });
            } else {
                debug!("Skipping short page {} ({} chars)", url, content_len);
            }

            // Short pages are excluded from results but still link-mined
            for link in discover_links(&html, &domain, &self.config.skip_extensions) {
                if !visited.contains(&link) && !pending.contains(&link) {
                    pending.insert(link.clone());
                    queue.push_back(link);
                }
            }
        }

        info!(
            "Crawl of {} finished: {} pages, {} failures",
            domain,
            outcome.pages.len(),
            outcome.failures.len()
        );
        outcome
    }
}
