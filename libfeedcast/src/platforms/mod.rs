//! Platform abstraction and implementations
//!
//! A platform is the social network posts are announced on. Feedcast needs
//! exactly two things from it: the account's recent posts (for duplicate
//! detection) and a way to publish a new one.
//!
//! # Examples
//!
//! ```no_run
//! use libfeedcast::platforms::{Platform, mastodon::MastodonClient};
//!
//! # async fn example() -> libfeedcast::error::Result<()> {
//! let platform = MastodonClient::new(
//!     "https://mastodon.social".to_string(),
//!     "access-token".to_string(),
//! )?;
//!
//! let recent = platform.fetch_recent_posts("kainlite", 20).await?;
//! println!("{} recent posts on {}", recent.len(), platform.name());
//!
//! let post_id = platform.publish("Hello: #rust  https://example.com - TBO").await?;
//! println!("Posted: {}", post_id);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::HistoryEntry;

pub mod mastodon;

// Mock platform is available for all builds (not just tests) to support integration tests
pub mod mock;

/// Platform trait for the two operations the announcer needs
///
/// Implementations are constructed explicitly and passed in per invocation;
/// there is no shared client instance.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Get the platform name
    ///
    /// Returns a lowercase identifier for the platform (e.g., "mastodon")
    fn name(&self) -> &str;

    /// Fetch the most recent posts of `account`, newest first
    ///
    /// At most `limit` entries are returned. `limit == 0` yields an empty
    /// history.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::History` if the account cannot be resolved or its
    /// posts cannot be listed.
    async fn fetch_recent_posts(&self, account: &str, limit: u32) -> Result<Vec<HistoryEntry>>;

    /// Publish `text` as a new post
    ///
    /// Returns the platform-specific post ID. Called at most once per
    /// invocation and never retried.
    ///
    /// # Errors
    ///
    /// Returns `FeedcastError::Publish` if the platform rejects the post or
    /// cannot be reached.
    async fn publish(&self, text: &str) -> Result<String>;
}
