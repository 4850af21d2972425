//! Mock platform implementation for testing
//!
//! Serves a canned post history and records every publish call, so tests can
//! assert on what would have been posted and how often the platform was hit.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{FetchError, PlatformError, Result};
use crate::platforms::Platform;
use crate::types::HistoryEntry;

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub name: String,

    /// Recent posts returned by `fetch_recent_posts`, newest first
    pub history: Vec<String>,

    /// Error to return from `fetch_recent_posts`
    pub history_error: Option<String>,

    /// Error to return from `publish`
    pub publish_error: Option<String>,

    pub history_call_count: Arc<Mutex<usize>>,
    pub publish_call_count: Arc<Mutex<usize>>,

    /// Texts that have been published (for verification)
    pub published: Arc<Mutex<Vec<String>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            history: Vec::new(),
            history_error: None,
            publish_error: None,
            history_call_count: Arc::new(Mutex::new(0)),
            publish_call_count: Arc::new(Mutex::new(0)),
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform for testing
pub struct MockPlatform {
    config: MockConfig,
}

impl MockPlatform {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// A platform with no history that accepts every post
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// A platform whose recent posts are `history`
    pub fn with_history(name: &str, history: &[&str]) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            history: history.iter().map(|h| h.to_string()).collect(),
            ..Default::default()
        })
    }

    /// A platform that fails to list recent posts
    pub fn history_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            history_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// A platform that rejects every post
    pub fn publish_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            publish_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    pub fn history_call_count(&self) -> usize {
        *self.config.history_call_count.lock().unwrap()
    }

    pub fn publish_call_count(&self) -> usize {
        *self.config.publish_call_count.lock().unwrap()
    }

    /// Get all texts that were published
    pub fn published(&self) -> Vec<String> {
        self.config.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch_recent_posts(&self, _account: &str, limit: u32) -> Result<Vec<HistoryEntry>> {
        *self.config.history_call_count.lock().unwrap() += 1;

        if let Some(error) = &self.config.history_error {
            return Err(FetchError::History(PlatformError::Network(error.clone())).into());
        }

        Ok(self
            .config
            .history
            .iter()
            .take(limit as usize)
            .map(|text| HistoryEntry::new(text.as_str()))
            .collect())
    }

    async fn publish(&self, text: &str) -> Result<String> {
        *self.config.publish_call_count.lock().unwrap() += 1;

        if let Some(error) = &self.config.publish_error {
            return Err(PlatformError::Posting(error.clone()).into());
        }

        self.config.published.lock().unwrap().push(text.to_string());

        Ok(format!("{}:mock-{}", self.config.name, uuid::Uuid::new_v4()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedcastError;

    #[tokio::test]
    async fn test_mock_success() {
        let platform = MockPlatform::success("test");

        assert_eq!(platform.name(), "test");
        assert!(platform.fetch_recent_posts("me", 10).await.unwrap().is_empty());

        let post_id = platform.publish("Test content").await.unwrap();
        assert!(post_id.starts_with("test:mock-"));
        assert_eq!(platform.publish_call_count(), 1);
        assert_eq!(platform.published(), vec!["Test content"]);
    }

    #[tokio::test]
    async fn test_mock_history_respects_limit() {
        let platform = MockPlatform::with_history("test", &["newest", "older", "oldest"]);

        let history = platform.fetch_recent_posts("me", 2).await.unwrap();
        assert_eq!(history, vec![HistoryEntry::new("newest"), HistoryEntry::new("older")]);

        let history = platform.fetch_recent_posts("me", 0).await.unwrap();
        assert!(history.is_empty());
        assert_eq!(platform.history_call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_history_failure() {
        let platform = MockPlatform::history_failure("test", "Connection refused");

        let result = platform.fetch_recent_posts("me", 5).await;
        assert!(matches!(
            result,
            Err(FeedcastError::Fetch(FetchError::History(_)))
        ));
    }

    #[tokio::test]
    async fn test_mock_publish_failure() {
        let platform = MockPlatform::publish_failure("test", "Service unavailable");

        let err = platform.publish("Test").await.unwrap_err();
        assert!(matches!(err, FeedcastError::Publish(PlatformError::Posting(_))));
        assert!(err.to_string().contains("Service unavailable"));
        assert_eq!(platform.publish_call_count(), 1);
        assert!(platform.published().is_empty());
    }
}
