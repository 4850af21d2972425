//! Error types for Feedcast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FeedcastError>;

#[derive(Error, Debug)]
pub enum FeedcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Selection exhausted: every draw was a recent duplicate after {attempts} retries")]
    SelectionExhausted { attempts: u32 },

    #[error("Publish error: {0}")]
    Publish(#[from] PlatformError),
}

impl FeedcastError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            FeedcastError::Config(_) => 2,
            FeedcastError::Fetch(_) => 1,
            FeedcastError::SelectionExhausted { .. } => 1,
            FeedcastError::Publish(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Failed to load env file: {0}")]
    EnvFile(String),

    #[error("Feed contained no candidates")]
    EmptyFeed,

    #[error("Invalid platform settings: {0}")]
    Platform(String),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Feed request failed: {0}")]
    Feed(String),

    #[error("Failed to decode feed: {0}")]
    Decode(String),

    #[error("Failed to fetch recent posts: {0}")]
    History(PlatformError),
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
}
