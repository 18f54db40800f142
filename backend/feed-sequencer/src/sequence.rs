//! Feed sequence construction
//!
//! Interleaves ranked video attempts with blocks of public challenge cards:
//!
//! ```text
//! v1 v2 v3 v4 [c1 c2 c3] v5 v6 v7 v8 [c4 c5 c6] v9
//! ```
//!
//! A block is only ever emitted right after a video count threshold is
//! crossed, so feeds with fewer videos than `videos_per_block` carry no
//! challenge blocks at all.

use serde::{Deserialize, Serialize};

use crate::config::FeedLimits;

/// One addressable item in the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayUnit {
    Video { attempt_id: String },
    ChallengeBlock { challenge_ids: Vec<String> },
}

impl DisplayUnit {
    pub fn is_video(&self) -> bool {
        matches!(self, DisplayUnit::Video { .. })
    }

    pub fn attempt_id(&self) -> Option<&str> {
        match self {
            DisplayUnit::Video { attempt_id } => Some(attempt_id),
            DisplayUnit::ChallengeBlock { .. } => None,
        }
    }
}

/// How challenge blocks are interleaved with videos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    pub videos_per_block: usize,
    pub block_size: usize,
}

impl Default for BlockLayout {
    fn default() -> Self {
        Self {
            videos_per_block: 4,
            block_size: 3,
        }
    }
}

impl From<&FeedLimits> for BlockLayout {
    fn from(limits: &FeedLimits) -> Self {
        Self {
            videos_per_block: limits.videos_per_block,
            block_size: limits.block_size,
        }
    }
}

/// Ordered display units plus a clamped cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSequence {
    units: Vec<DisplayUnit>,
    cursor: usize,
}

/// Build a sequence with the default 4-videos / 3-challenges layout
pub fn build_sequence<V, C>(video_ids: &[V], challenge_ids: &[C]) -> FeedSequence
where
    V: AsRef<str>,
    C: AsRef<str>,
{
    FeedSequence::build(video_ids, challenge_ids, BlockLayout::default())
}

impl FeedSequence {
    pub fn build<V, C>(video_ids: &[V], challenge_ids: &[C], layout: BlockLayout) -> Self
    where
        V: AsRef<str>,
        C: AsRef<str>,
    {
        let interleave = layout.videos_per_block > 0 && layout.block_size > 0;
        let mut units = Vec::with_capacity(video_ids.len() + challenge_ids.len());
        let mut ch_idx = 0usize;

        for (i, video_id) in video_ids.iter().enumerate() {
            units.push(DisplayUnit::Video {
                attempt_id: video_id.as_ref().to_string(),
            });

            if interleave && (i + 1) % layout.videos_per_block == 0 && ch_idx < challenge_ids.len()
            {
                let end = ch_idx.saturating_add(layout.block_size).min(challenge_ids.len());
                let block: Vec<String> = challenge_ids[ch_idx..end]
                    .iter()
                    .map(|id| id.as_ref().to_string())
                    .collect();
                if !block.is_empty() {
                    units.push(DisplayUnit::ChallengeBlock {
                        challenge_ids: block,
                    });
                }
                // advance by a full block even when the tail was short
                ch_idx = ch_idx.saturating_add(layout.block_size);
            }
        }

        Self { units, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn units(&self) -> &[DisplayUnit] {
        &self.units
    }

    pub fn current(&self) -> Option<&DisplayUnit> {
        self.units.get(self.cursor)
    }

    /// Index the cursor would land on after moving by `delta`
    pub fn clamped_target(&self, delta: i64) -> Option<usize> {
        if self.units.is_empty() {
            return None;
        }
        let last = (self.units.len() - 1) as i64;
        let target = (self.cursor as i64).saturating_add(delta).clamp(0, last);
        Some(target as usize)
    }

    /// Move the cursor by `delta`, clamped to the sequence bounds.
    ///
    /// Returns the new cursor, or `None` for an empty sequence.
    pub(crate) fn move_by(&mut self, delta: i64) -> Option<usize> {
        let target = self.clamped_target(delta)?;
        self.cursor = target;
        Some(target)
    }

    /// Units strictly after the cursor, with their indices
    pub fn ahead(&self) -> impl Iterator<Item = (usize, &DisplayUnit)> + '_ {
        self.units
            .iter()
            .enumerate()
            .skip(self.cursor.saturating_add(1))
    }

    pub fn video_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_video()).count()
    }

    pub fn block_count(&self) -> usize {
        self.units.len() - self.video_count()
    }
}
