//! One invocation: fetch, select, emit
//!
//! Every step runs at most once and in order. The only retry anywhere is the
//! in-memory re-draw inside [`pick`]; any other failure ends the invocation.

use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::feed::FeedProvider;
use crate::platforms::Platform;
use crate::publisher::{EmitOutcome, Publisher};
use crate::selector::{ensure_candidates, pick, DuplicateCheck, RandomSource};
use crate::types::{PublishMode, SelectionResult};

/// The settings one invocation needs
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub account: String,
    pub history_lookback: u32,
    pub max_retries: u32,
    pub mode: PublishMode,
}

impl From<&Config> for RunSettings {
    fn from(config: &Config) -> Self {
        Self {
            account: config.account.clone(),
            history_lookback: config.history_lookback,
            max_retries: config.max_retries,
            mode: config.mode,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub selection: SelectionResult,
    pub outcome: EmitOutcome,
}

pub async fn run_once<F, P, R>(
    settings: &RunSettings,
    feed: &F,
    platform: &P,
    rng: &mut R,
) -> Result<RunReport>
where
    F: FeedProvider + ?Sized,
    P: Platform + ?Sized,
    R: RandomSource + ?Sized,
{
    let candidates = feed.fetch_candidates().await?;
    ensure_candidates(&candidates)?;
    debug!("Feed returned {} candidates", candidates.len());

    let history = platform
        .fetch_recent_posts(&settings.account, settings.history_lookback)
        .await?;
    let check = DuplicateCheck::new(history);
    debug!(
        "Checking against the last {} posts of {}",
        check.len(),
        settings.account
    );

    let selection = pick(
        &candidates,
        |candidate| check.is_duplicate(candidate),
        settings.max_retries,
        rng,
    )?;
    info!(
        "Selected '{}' after {} retries",
        selection.candidate.title, selection.attempts_used
    );

    let outcome = Publisher::new(platform, settings.mode)
        .emit(&selection.candidate)
        .await?;

    Ok(RunReport { selection, outcome })
}
