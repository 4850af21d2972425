//! Core types for Feedcast

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A JSON Feed page as served by the blog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "home_page_url", default)]
    pub home_page_url: String,
    #[serde(rename = "feed_url", default)]
    pub feed_url: String,
    #[serde(rename = "items", default)]
    pub items: Vec<Candidate>,
}

/// An article from the feed that may be announced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(rename = "content_html", default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "date_published", default)]
    pub published_at: String,
}

impl Candidate {
    pub fn new(id: &str, title: &str, url: &str, tags: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            title: title.to_string(),
            content: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            published_at: String::new(),
        }
    }

    /// Parse `published_at` as RFC 3339, if it is one
    pub fn published(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.published_at).ok()
    }
}

/// Full text of a previously published post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub text: String,
}

impl HistoryEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Outcome of a successful pick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    pub candidate: Candidate,
    /// Duplicate draws rejected before the chosen one
    pub attempts_used: u32,
}

/// Whether the publish side effect actually happens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
    DryRun,
    Live,
}

impl PublishMode {
    /// `production` is live, anything else (including unset) is a dry run
    pub fn from_run_mode(value: Option<&str>) -> Self {
        match value {
            Some("production") => PublishMode::Live,
            _ => PublishMode::DryRun,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, PublishMode::Live)
    }
}

impl std::fmt::Display for PublishMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishMode::DryRun => write!(f, "dry-run"),
            PublishMode::Live => write!(f, "live"),
        }
    }
}
