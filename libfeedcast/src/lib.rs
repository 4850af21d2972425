//! Feedcast - announce a random, not-recently-posted article from a feed
//!
//! This library fetches candidates from a JSON feed, picks one that the
//! account has not posted about recently, and publishes (or, in dry-run mode,
//! only logs) a short post linking to it.

pub mod config;
pub mod error;
pub mod feed;
pub mod logging;
pub mod platforms;
pub mod publisher;
pub mod runner;
pub mod selector;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{FeedcastError, Result};
pub use runner::{run_once, RunReport, RunSettings};
pub use types::{Candidate, HistoryEntry, PublishMode, SelectionResult};
