//! # sitebrief - Crawl, Summarize, and Chat Over Website Content
//!
//! This crate crawls a website breadth-first, extracts the main textual
//! content of each page, condenses it through an LLM completion endpoint,
//! and stores the results in a local database. A chat responder answers
//! questions grounded in the stored content, persisting conversations as
//! sessions of ordered messages.
//!
//! ## Features
//!
//! - Breadth-first site crawling with a configurable page cap and a
//!   deduplicating frontier
//! - Content extraction via CSS selectors with graceful fallbacks
//! - LLM-backed page summarization that degrades to fixed strings when no
//!   credential is configured
//! - Transactional content replacement in LibSQL storage
//! - Persisted chat sessions with full message history
//! - An axum HTTP API exposing scrape, content-update, and chat endpoints
//!
//! ## Example
//!
//! ```rust,no_run
//! use sitebrief::crawler::{Crawler, CrawlerConfig};
//! use sitebrief::summarize::Summarizer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = sitebrief::llm::Client::from_env();
//!     let summarizer = Summarizer::new(client);
//!     let crawler = Crawler::new(CrawlerConfig::default(), summarizer)?;
//!
//!     let outcome = crawler.crawl("https://example.com").await;
//!     for page in &outcome.pages {
//!         println!("{}: {}", page.url, page.title);
//!     }
//!     Ok(())
//! }
//! ```

mod error;

pub mod chat;
pub mod crawler;
pub mod llm;
pub mod server;
pub mod store;
pub mod summarize;

pub use error::Error;

/// Re-export of common types for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
