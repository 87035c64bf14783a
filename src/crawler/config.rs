//! # Crawler Configuration Module
//!
//! This module provides configuration options for the site crawler, including
//! the visited-page cap, content selectors, and the asset-extension filter.
//! It uses a builder pattern for flexible configuration.

use std::time::Duration;

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Maximum number of visited pages before further fetches are suppressed.
    ///
    /// The check runs before a dequeued path is visited, so a run can visit
    /// up to `max_pages + 1` distinct paths. This mirrors the behavior the
    /// rest of the pipeline was built against.
    pub max_pages: usize,

    /// Minimum extracted-content length, in characters, for a page to be
    /// recorded.
    /// Shorter pages are skipped, but their links are still followed.
    pub min_content_len: usize,

    /// HTTP request timeout
    pub timeout: Duration,

    /// User agent to use for requests
    pub user_agent: String,

    /// CSS selectors for content to include, applied in document order
    pub content_selectors: Vec<String>,

    /// File extensions that are never enqueued (binary/asset links)
    pub skip_extensions: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 20,
            min_content_len: 100,
            timeout: Duration::from_secs(30),
            user_agent: format!("sitebrief-crawler/{}", env!("CARGO_PKG_VERSION")),
            content_selectors: vec![
                "main".to_string(),
                "article".to_string(),
                ".content".to_string(),
                "#content".to_string(),
                ".text-container".to_string(),
                ".page-content".to_string(),
            ],
            skip_extensions: vec![
                ".pdf".to_string(),
                ".jpg".to_string(),
                ".jpeg".to_string(),
                ".png".to_string(),
                ".gif".to_string(),
                ".css".to_string(),
                ".js".to_string(),
            ],
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the maximum number of visited pages
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the minimum content length for a page to be recorded
    pub fn min_content_len(mut self, min_content_len: usize) -> Self {
        self.config.min_content_len = min_content_len;
        self
    }

    /// Set the HTTP request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the CSS selectors for content to include
    pub fn content_selectors(mut self, content_selectors: Vec<String>) -> Self {
        self.config.content_selectors = content_selectors;
        self
    }

    /// Set the file extensions to skip when discovering links
    pub fn skip_extensions(mut self, skip_extensions: Vec<String>) -> Self {
        self.config.skip_extensions = skip_extensions;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }
}
