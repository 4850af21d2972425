//! Article selection with duplicate avoidance
//!
//! A pick draws candidates uniformly at random, with replacement, until one
//! is not a duplicate of a recent post. Each rejected draw costs one retry;
//! once `max_attempts` retries have been spent the next duplicate ends the
//! pick with [`FeedcastError::SelectionExhausted`]. A non-duplicate draw always
//! succeeds, whatever the counter says.

use rand::Rng;
use tracing::{debug, warn};

use crate::error::{ConfigError, FeedcastError, Result};
use crate::types::{Candidate, HistoryEntry, SelectionResult};

/// Source of uniformly distributed indices
///
/// Implemented for every [`rand::Rng`]; tests can supply a scripted source.
pub trait RandomSource {
    /// Return an index in `0..len`. `len` is never zero.
    fn next_index(&mut self, len: usize) -> usize;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn next_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Replays a fixed sequence of indices, cycling when exhausted
///
/// Indices are reduced modulo the candidate count.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    indices: Vec<usize>,
    position: usize,
}

impl SequenceSource {
    pub fn new(indices: Vec<usize>) -> Self {
        Self {
            indices,
            position: 0,
        }
    }

    /// Number of indices handed out so far
    pub fn draws(&self) -> usize {
        self.position
    }
}

impl RandomSource for SequenceSource {
    fn next_index(&mut self, len: usize) -> usize {
        let index = if self.indices.is_empty() {
            0
        } else {
            self.indices[self.position % self.indices.len()]
        };
        self.position += 1;
        index % len
    }
}

/// Duplicate check against a cached list of recent posts
///
/// A candidate is a duplicate when its title appears verbatim (case-sensitive)
/// inside any recent post's text.
#[derive(Debug, Clone, Default)]
pub struct DuplicateCheck {
    history: Vec<HistoryEntry>,
}

impl DuplicateCheck {
    pub fn new(history: Vec<HistoryEntry>) -> Self {
        Self { history }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn is_duplicate(&self, candidate: &Candidate) -> bool {
        is_duplicate(&self.history, candidate)
    }
}

pub fn is_duplicate(history: &[HistoryEntry], candidate: &Candidate) -> bool {
    history.iter().any(|entry| {
        debug!("Comparing post '{}' with '{}'", entry.text, candidate.title);
        entry.text.contains(&candidate.title)
    })
}

/// Fail with a configuration error on an empty candidate set
pub fn ensure_candidates(candidates: &[Candidate]) -> Result<()> {
    if candidates.is_empty() {
        return Err(ConfigError::EmptyFeed.into());
    }
    Ok(())
}

/// Pick one non-duplicate candidate
///
/// # Errors
///
/// - `ConfigError::EmptyFeed` if `candidates` is empty (nothing is drawn)
/// - `FeedcastError::SelectionExhausted` if the draw after `max_attempts`
///   rejected ones is still a duplicate
pub fn pick<R, F>(
    candidates: &[Candidate],
    mut is_duplicate: F,
    max_attempts: u32,
    rng: &mut R,
) -> Result<SelectionResult>
where
    R: RandomSource + ?Sized,
    F: FnMut(&Candidate) -> bool,
{
    ensure_candidates(candidates)?;

    let mut attempts = 0u32;
    loop {
        let index = rng.next_index(candidates.len());
        let candidate = &candidates[index];
        debug!(index, title = %candidate.title, attempts, "Drew candidate");

        if !is_duplicate(candidate) {
            return Ok(SelectionResult {
                candidate: candidate.clone(),
                attempts_used: attempts,
            });
        }

        if attempts >= max_attempts {
            warn!(attempts, "Giving up: every draw was a recent duplicate");
            return Err(FeedcastError::SelectionExhausted { attempts });
        }

        warn!(title = %candidate.title, "Candidate was announced recently, drawing again");
        attempts += 1;
    }
}
