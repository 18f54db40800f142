//! Challenge variants and the display rules that depend on them
//!
//! A challenge is either *direct* (a dare aimed at one target user, settled
//! by completion votes) or *public* (open to everyone, time-boxed and settled
//! by finalization). Every rule that differs between the two matches on
//! [`ChallengeKind`] exhaustively.
//!
//! Rows come from `RestBackendClient::challenge_detail`. Vote counts are not
//! part of the row; hosts attach them with [`ChallengeDetail::with_completion`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use crate::models::ViewerId;

/// Yes/no completion votes cast on a direct challenge attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionTally {
    pub yes: u64,
    pub no: u64,
}

/// Outcome of the completion vote for the attempt's author
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardDecision {
    /// Strictly more than half of the votes are yes
    Grant,
    /// Half or fewer of the votes are yes (including no votes at all)
    Revoke,
}

impl CompletionTally {
    pub fn new(yes: u64, no: u64) -> Self {
        Self { yes, no }
    }

    pub fn total(&self) -> u64 {
        self.yes.saturating_add(self.no)
    }

    /// Rounded share of yes votes, `None` before the first vote
    pub fn yes_percent(&self) -> Option<u8> {
        let yes = u128::from(self.yes);
        let total = yes + u128::from(self.no);
        if total == 0 {
            return None;
        }
        // round half up, integer only
        let pct = (yes * 200 + total) / (2 * total);
        Some(pct as u8)
    }

    pub fn reward_decision(&self) -> RewardDecision {
        if u128::from(self.yes) * 2 > u128::from(self.yes) + u128::from(self.no) {
            RewardDecision::Grant
        } else {
            RewardDecision::Revoke
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Finalization {
    Open,
    Finalized {
        finalized_at: Option<DateTime<Utc>>,
        winner_attempt_id: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeKind {
    Direct {
        target_user_id: String,
        completion: CompletionTally,
    },
    Public {
        ends_at: Option<DateTime<Utc>>,
        finalization: Finalization,
    },
}

/// Raw `challenges` row as returned by the backend
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeRow {
    pub id: String,
    pub creator_id: String,
    #[serde(rename = "type")]
    pub challenge_type: String,
    #[serde(default)]
    pub target_user_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hype_count: u64,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_finalized: bool,
    #[serde(default)]
    pub finalized_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub winner_attempt_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeDetail {
    pub id: String,
    pub creator_id: String,
    pub title: String,
    pub description: String,
    pub hype_count: u64,
    pub created_at: DateTime<Utc>,
    pub kind: ChallengeKind,
}

impl TryFrom<ChallengeRow> for ChallengeDetail {
    type Error = FeedError;

    fn try_from(row: ChallengeRow) -> Result<Self, Self::Error> {
        let kind = match row.challenge_type.as_str() {
            "direct" => {
                let target_user_id = row.target_user_id.ok_or_else(|| {
                    FeedError::InvalidRecord(format!(
                        "direct challenge {} has no target user",
                        row.id
                    ))
                })?;
                ChallengeKind::Direct {
                    target_user_id,
                    completion: CompletionTally::default(),
                }
            }
            "public" => ChallengeKind::Public {
                ends_at: row.ends_at,
                finalization: if row.is_finalized {
                    Finalization::Finalized {
                        finalized_at: row.finalized_at,
                        winner_attempt_id: row.winner_attempt_id,
                    }
                } else {
                    Finalization::Open
                },
            },
            other => {
                return Err(FeedError::InvalidRecord(format!(
                    "challenge {} has unknown type {:?}",
                    row.id, other
                )))
            }
        };

        Ok(ChallengeDetail {
            id: row.id,
            creator_id: row.creator_id,
            title: row.title,
            description: row.description,
            hype_count: row.hype_count,
            created_at: row.created_at,
            kind,
        })
    }
}

impl ChallengeDetail {
    /// Attach a completion tally; ignored for public challenges
    pub fn with_completion(mut self, tally: CompletionTally) -> Self {
        if let ChallengeKind::Direct { completion, .. } = &mut self.kind {
            *completion = tally;
        }
        self
    }

    pub fn is_ended(&self, now: DateTime<Utc>) -> bool {
        match &self.kind {
            ChallengeKind::Direct { .. } => false,
            ChallengeKind::Public { ends_at, .. } => ends_at.map_or(false, |end| end <= now),
        }
    }

    pub fn is_finalized(&self) -> bool {
        match &self.kind {
            ChallengeKind::Direct { .. } => false,
            ChallengeKind::Public { finalization, .. } => {
                matches!(finalization, Finalization::Finalized { .. })
            }
        }
    }

    pub fn can_upload(&self, viewer: Option<&ViewerId>) -> bool {
        let Some(viewer) = viewer else {
            return false;
        };
        match &self.kind {
            ChallengeKind::Direct { target_user_id, .. } => target_user_id == viewer.as_str(),
            ChallengeKind::Public { .. } => true,
        }
    }

    pub fn can_finalize(&self, viewer: Option<&ViewerId>, now: DateTime<Utc>) -> bool {
        let Some(viewer) = viewer else {
            return false;
        };
        match &self.kind {
            ChallengeKind::Direct { .. } => false,
            ChallengeKind::Public {
                ends_at,
                finalization,
            } => {
                self.creator_id == viewer.as_str()
                    && ends_at.is_some()
                    && self.is_ended(now)
                    && *finalization == Finalization::Open
            }
        }
    }

    pub fn is_winner(&self, attempt_id: &str) -> bool {
        match &self.kind {
            ChallengeKind::Public {
                finalization:
                    Finalization::Finalized {
                        winner_attempt_id: Some(winner),
                        ..
                    },
                ..
            } => winner == attempt_id,
            _ => false,
        }
    }
}
