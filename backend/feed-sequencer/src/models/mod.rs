use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod challenge;

pub use challenge::{
    ChallengeDetail, ChallengeKind, ChallengeRow, CompletionTally, Finalization, RewardDecision,
};

/// Title shown when an attempt's parent challenge could not be looked up
pub const FALLBACK_CHALLENGE_TITLE: &str = "Challenge";

/// Number of author-id characters used as a handle when no username is known
const HANDLE_FALLBACK_LEN: usize = 6;

/// Opaque identity of the signed-in viewer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewerId(String);

impl ViewerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Feed tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedMode {
    #[default]
    ForYou,
    Following,
}

impl FeedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedMode::ForYou => "for_you",
            FeedMode::Following => "following",
        }
    }

    /// Remote procedure returning ranked attempt ids for this tab
    pub fn attempt_procedure(&self) -> &'static str {
        match self {
            FeedMode::ForYou => "get_video_feed_for_you",
            FeedMode::Following => "get_video_feed_following",
        }
    }

    /// Remote procedure returning ranked public challenge ids for this tab
    pub fn challenge_procedure(&self) -> &'static str {
        match self {
            FeedMode::ForYou => "get_public_challenges_for_you",
            FeedMode::Following => "get_public_challenges_following",
        }
    }
}

impl fmt::Display for FeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a video attempt as resolved by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRef {
    pub id: String,
    pub challenge_id: String,
    pub user_id: String,
    #[serde(default)]
    pub caption: Option<String>,
    /// Storage path of the uploaded video
    pub video_path: String,
    #[serde(default)]
    pub like_count: u64,
    pub created_at: DateTime<Utc>,
    /// Title of the parent challenge, looked up separately
    #[serde(default)]
    pub challenge_title: Option<String>,
}

impl AttemptRef {
    pub fn display_title(&self) -> &str {
        self.challenge_title
            .as_deref()
            .unwrap_or(FALLBACK_CHALLENGE_TITLE)
    }

    /// Trimmed caption, `None` when blank
    pub fn display_caption(&self) -> Option<&str> {
        self.caption
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Author handle without a leading `@`
    pub fn display_handle(&self, username: Option<&str>) -> String {
        let raw = match username {
            Some(name) => name.to_string(),
            None => self.user_id.chars().take(HANDLE_FALLBACK_LEN).collect(),
        };
        match raw.strip_prefix('@') {
            Some(stripped) => stripped.to_string(),
            None => raw,
        }
    }
}

/// Snapshot of a public challenge shown in a discovery block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeRef {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hype_count: u64,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRef {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
}
