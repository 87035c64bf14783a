//! Page fetching for the crawler module
//!
//! A thin wrapper over reqwest: one GET per page, body returned as text.
//! There is no retry and no redirect policy beyond the client default;
//! a failed fetch is reported to the coordinator, which records it and
//! moves on.

use crate::crawler::error::CrawlError;
use crate::crawler::CrawlerConfig;
use reqwest::Client as ReqwestClient;
use tracing::{debug, instrument};

/// HTTP fetcher for crawled pages
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: ReqwestClient,
}

impl Fetcher {
    /// Create a new fetcher from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(CrawlError::Http)?;

        Ok(Self { client })
    }

    /// Fetch a page and return its body as text
    ///
    /// Non-2xx responses are errors; the body of an error response is
    /// discarded.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, url: &str) -> Result<String, CrawlError> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await.map_err(CrawlError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(CrawlError::Http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body>hello</body></html>")
            .expect(1)
            .create_async()
            .await;

        let fetcher = Fetcher::new(&CrawlerConfig::default()).unwrap();
        let body = fetcher.fetch(&format!("{}/page", server.url())).await.unwrap();
        assert!(body.contains("hello"));

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let fetcher = Fetcher::new(&CrawlerConfig::default()).unwrap();
        let result = fetcher.fetch(&format!("{}/missing", server.url())).await;

        match result {
            Err(CrawlError::Status { status, url }) => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/missing"));
            }
            other => panic!("Expected Status error, got {:?}", other),
        }

        mock_server.assert_async().await;
    }
}
