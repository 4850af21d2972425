//! Feed retrieval
//!
//! The feed is a JSON Feed document; only its `items` matter here. Every
//! failure (transport, status, decoding) is a [`FetchError`] and is never
//! retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use tracing::debug;

use crate::error::{FetchError, Result};
use crate::types::{Candidate, Feed};

/// Fixed request timeout for the feed fetch
pub const FEED_TIMEOUT: Duration = Duration::from_secs(3);

/// Source of announcement candidates
#[async_trait]
pub trait FeedProvider: Send + Sync {
    /// Fetch the current candidate list. One call per invocation.
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>>;
}

/// HTTP client for a JSON Feed endpoint
pub struct JsonFeedClient {
    client: Client,
    url: String,
    user_agent: String,
}

impl JsonFeedClient {
    /// Create a client for `url`, identifying as `feedcast/<version>`
    pub fn new(url: impl Into<String>, version: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(FEED_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Feed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            user_agent: format!("feedcast/{}", version),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedProvider for JsonFeedClient {
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>> {
        debug!("Requesting feed from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Feed(format!("{}: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Feed(format!("{} returned {}", self.url, status)).into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Feed(format!("Failed to read response body: {}", e)))?;

        let feed = parse_feed(&body)?;
        debug!("Feed '{}' has {} items", feed.title, feed.items.len());
        Ok(feed.items)
    }
}

/// Decode a JSON Feed document
pub fn parse_feed(body: &str) -> Result<Feed> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()).into())
}

/// A fixed candidate list
#[derive(Debug, Clone, Default)]
pub struct StaticFeed {
    candidates: Vec<Candidate>,
}

impl StaticFeed {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }
}

#[async_trait]
impl FeedProvider for StaticFeed {
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>> {
        Ok(self.candidates.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedcastError;

    const PAGE: &str = r#"{
        "version": "https://jsonfeed.org/version/1",
        "title": "Techsquad",
        "home_page_url": "https://techsquad.rocks/",
        "feed_url": "https://techsquad.rocks/index.json",
        "items": [
            {
                "id": "a",
                "url": "https://techsquad.rocks/blog/a/",
                "title": "Kubernetes from scratch",
                "content_html": "<p>...</p>",
                "tags": ["kubernetes", "linux"],
                "date_published": "2019-01-01T00:00:00Z"
            },
            {
                "id": "b",
                "url": "https://techsquad.rocks/blog/b/",
                "title": "Serverless bots",
                "content_html": "",
                "tags": [],
                "date_published": "2019-02-01T00:00:00Z"
            }
        ]
    }"#;

    #[test]
    fn test_parse_feed() {
        let feed = parse_feed(PAGE).unwrap();

        assert_eq!(feed.title, "Techsquad");
        assert_eq!(feed.feed_url, "https://techsquad.rocks/index.json");
        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[0].tags, vec!["kubernetes", "linux"]);
        assert_eq!(feed.items[1].title, "Serverless bots");
    }

    #[test]
    fn test_parse_feed_without_items() {
        let feed = parse_feed(r#"{"title": "empty"}"#).unwrap();
        assert!(feed.items.is_empty());
    }

    #[test]
    fn test_parse_feed_invalid_json() {
        let result = parse_feed("<html>not json</html>");
        assert!(matches!(
            result,
            Err(FeedcastError::Fetch(FetchError::Decode(_)))
        ));
    }

    #[test]
    fn test_parse_feed_item_missing_title() {
        let result = parse_feed(r#"{"items": [{"id": "x", "url": "http://x"}]}"#);
        assert!(matches!(
            result,
            Err(FeedcastError::Fetch(FetchError::Decode(_)))
        ));
    }

    #[test]
    fn test_json_feed_client_new() {
        let client = JsonFeedClient::new("https://techsquad.rocks/index.json", "0.1.0").unwrap();
        assert_eq!(client.url(), "https://techsquad.rocks/index.json");
        assert_eq!(client.user_agent, "feedcast/0.1.0");
    }

    #[tokio::test]
    async fn test_json_feed_client_unreachable() {
        let client = JsonFeedClient::new("http://127.0.0.1:9/index.json", "test").unwrap();
        let result = client.fetch_candidates().await;
        assert!(matches!(
            result,
            Err(FeedcastError::Fetch(FetchError::Feed(_)))
        ));
    }

    #[tokio::test]
    async fn test_static_feed() {
        let feed = StaticFeed::new(vec![Candidate::new("1", "One", "http://one", &[])]);
        let items = feed.fetch_candidates().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "One");
    }
}
