//! Feed loading
//!
//! One load is a single logical unit: fetch both ranked candidate lists,
//! build the display sequence, then resolve the records the sequence points
//! at. Any failure aborts the whole load so the caller can keep showing
//! whatever it had before.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use crate::clients::{CandidateSource, RecordResolver};
use crate::config::FeedLimits;
use crate::error::Result;
use crate::models::{AttemptRef, ChallengeRef, FeedMode, ProfileRef, ViewerId};
use crate::sequence::{BlockLayout, FeedSequence};

/// Everything needed to render one feed
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub mode: FeedMode,
    pub sequence: FeedSequence,
    pub attempts: HashMap<String, AttemptRef>,
    pub challenges: HashMap<String, ChallengeRef>,
    /// Author profiles keyed by user id
    pub profiles: HashMap<String, ProfileRef>,
}

impl FeedSnapshot {
    pub fn username(&self, user_id: &str) -> Option<&str> {
        self.profiles
            .get(user_id)
            .and_then(|p| p.username.as_deref())
    }
}

/// First `cap` distinct ids, in order of first appearance
pub(crate) fn unique_ids<'a, I>(ids: I, cap: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .take(cap)
        .map(str::to_string)
        .collect()
}

pub struct FeedLoader {
    candidates: Arc<dyn CandidateSource>,
    records: Arc<dyn RecordResolver>,
    limits: FeedLimits,
}

impl FeedLoader {
    pub fn new(
        candidates: Arc<dyn CandidateSource>,
        records: Arc<dyn RecordResolver>,
        limits: FeedLimits,
    ) -> Self {
        Self {
            candidates,
            records,
            limits,
        }
    }

    pub fn limits(&self) -> &FeedLimits {
        &self.limits
    }

    pub async fn load(&self, viewer: &ViewerId, mode: FeedMode) -> Result<FeedSnapshot> {
        debug!(viewer_id = %viewer, mode = %mode, "Loading feed");

        let attempt_ids = self
            .candidates
            .ranked_attempt_ids(viewer, mode, self.limits.attempt_limit)
            .await?;
        let challenge_ids = self
            .candidates
            .ranked_challenge_ids(viewer, mode, self.limits.challenge_limit)
            .await?;

        let sequence = FeedSequence::build(
            &attempt_ids,
            &challenge_ids,
            BlockLayout::from(&self.limits),
        );

        let cap = self.limits.resolve_cap;

        let wanted_attempts = unique_ids(attempt_ids.iter().map(String::as_str), cap);
        let attempts = if wanted_attempts.is_empty() {
            Vec::new()
        } else {
            self.records.attempts(&wanted_attempts).await?
        };

        let author_ids = unique_ids(attempts.iter().map(|a| a.user_id.as_str()), usize::MAX);
        let profiles = if author_ids.is_empty() {
            Vec::new()
        } else {
            self.records.profiles(&author_ids).await?
        };

        let wanted_challenges = unique_ids(challenge_ids.iter().map(String::as_str), cap);
        let challenges = if wanted_challenges.is_empty() {
            Vec::new()
        } else {
            self.records.challenges(&wanted_challenges).await?
        };

        info!(
            viewer_id = %viewer,
            mode = %mode,
            units = sequence.len(),
            videos = attempt_ids.len(),
            blocks = sequence.block_count(),
            resolved_attempts = attempts.len(),
            resolved_challenges = challenges.len(),
            "Feed loaded"
        );

        Ok(FeedSnapshot {
            mode,
            sequence,
            attempts: attempts.into_iter().map(|a| (a.id.clone(), a)).collect(),
            challenges: challenges.into_iter().map(|c| (c.id.clone(), c)).collect(),
            profiles: profiles.into_iter().map(|p| (p.id.clone(), p)).collect(),
        })
    }
}
