//! Post rendering and the mode-gated publish step

use tracing::{debug, info};

use crate::error::Result;
use crate::platforms::Platform;
use crate::types::{Candidate, PublishMode};

/// Brand marker appended to every post
pub const BRAND_SUFFIX: &str = "TBO";

/// `#tag ` for every tag, in order; note the trailing space after the last one
pub fn hashtags(tags: &[String]) -> String {
    tags.iter().map(|tag| format!("#{} ", tag)).collect()
}

/// Render `"{title}: {hashtags} {url} - {suffix}"`
pub fn render_post(candidate: &Candidate) -> String {
    format!(
        "{}: {} {} - {}",
        candidate.title,
        hashtags(&candidate.tags),
        candidate.url,
        BRAND_SUFFIX
    )
}

/// What `emit` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    /// Nothing was sent; `text` is what would have been
    DryRun { text: String },
    /// One post was created
    Published { text: String, post_id: String },
}

impl EmitOutcome {
    pub fn text(&self) -> &str {
        match self {
            EmitOutcome::DryRun { text } | EmitOutcome::Published { text, .. } => text,
        }
    }
}

pub struct Publisher<'a, P: Platform + ?Sized> {
    platform: &'a P,
    mode: PublishMode,
}

impl<'a, P: Platform + ?Sized> Publisher<'a, P> {
    pub fn new(platform: &'a P, mode: PublishMode) -> Self {
        Self { platform, mode }
    }

    pub fn mode(&self) -> PublishMode {
        self.mode
    }

    /// Render `candidate` and, in live mode, publish it
    ///
    /// Dry runs only log and cannot fail. A live publish is attempted exactly
    /// once; any platform error is returned as-is.
    pub async fn emit(&self, candidate: &Candidate) -> Result<EmitOutcome> {
        let text = render_post(candidate);

        match self.mode {
            PublishMode::DryRun => {
                info!("Dry run, would have posted: {}", text);
                Ok(EmitOutcome::DryRun { text })
            }
            PublishMode::Live => {
                info!("Posting to {}: {}", self.platform.name(), text);
                let post_id = self.platform.publish(&text).await?;
                debug!("Published post {}", post_id);
                Ok(EmitOutcome::Published { text, post_id })
            }
        }
    }
}
