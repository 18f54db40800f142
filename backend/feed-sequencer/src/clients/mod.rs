/// Backend collaborators used by the feed
///
/// The feed never owns data: ranked candidates, records and media URLs all
/// come from the managed backend through these traits.
use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AttemptRef, ChallengeRef, FeedMode, ProfileRef, ViewerId};

pub mod rest;
pub mod storage;

pub use rest::RestBackendClient;
pub use storage::PublicStorageLocator;

/// Ranked candidate ids for a viewer and feed tab
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn ranked_attempt_ids(
        &self,
        viewer: &ViewerId,
        mode: FeedMode,
        limit: usize,
    ) -> Result<Vec<String>>;

    async fn ranked_challenge_ids(
        &self,
        viewer: &ViewerId,
        mode: FeedMode,
        limit: usize,
    ) -> Result<Vec<String>>;
}

/// Batch record lookup. Unknown ids are simply absent from the result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordResolver: Send + Sync {
    /// Attempts with their parent challenge titles filled in
    async fn attempts(&self, ids: &[String]) -> Result<Vec<AttemptRef>>;

    async fn challenges(&self, ids: &[String]) -> Result<Vec<ChallengeRef>>;

    async fn profiles(&self, user_ids: &[String]) -> Result<Vec<ProfileRef>>;
}

/// Maps a stored media path to a fetchable URL
#[cfg_attr(test, mockall::automock)]
pub trait MediaLocator: Send + Sync {
    fn public_url(&self, media_path: &str) -> Option<String>;
}
