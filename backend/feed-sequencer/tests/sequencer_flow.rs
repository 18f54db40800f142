use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use feed_sequencer::clients::{CandidateSource, PublicStorageLocator, RecordResolver};
use feed_sequencer::config::{FeedLimits, NavigationConfig};
use feed_sequencer::sequencer::{BlockView, VideoView};
use feed_sequencer::{
    AttemptRef, ChallengeRef, DisplayUnit, FeedError, FeedLoader, FeedMode, FeedSequencer,
    LoadStatus, NavInput, NavKey, ProfileRef, Result, UnitView, ViewerContext, ViewerId,
};

/// In-memory backend with per-mode candidate lists and optional latency
#[derive(Default)]
struct FakeBackend {
    attempts_by_mode: HashMap<FeedMode, Vec<String>>,
    challenges_by_mode: HashMap<FeedMode, Vec<String>>,
    latency_by_mode: HashMap<FeedMode, Duration>,
    attempts: HashMap<String, AttemptRef>,
    challenges: HashMap<String, ChallengeRef>,
    profiles: HashMap<String, ProfileRef>,
    fail_records: bool,
    record_calls: AtomicUsize,
}

impl FakeBackend {
    fn with_feed(mut self, mode: FeedMode, videos: usize, challenges: usize) -> Self {
        let prefix = match mode {
            FeedMode::ForYou => "fy",
            FeedMode::Following => "fl",
        };
        let video_ids: Vec<String> = (1..=videos).map(|i| format!("{}-v{}", prefix, i)).collect();
        let challenge_ids: Vec<String> = (1..=challenges)
            .map(|i| format!("{}-c{}", prefix, i))
            .collect();

        for (i, id) in video_ids.iter().enumerate() {
            let user_id = format!("author-{}", i % 2);
            self.attempts.insert(
                id.clone(),
                AttemptRef {
                    id: id.clone(),
                    challenge_id: "parent".to_string(),
                    user_id: user_id.clone(),
                    caption: Some(format!(" take {} ", i + 1)),
                    video_path: format!("{}/{}.mp4", user_id, id),
                    like_count: i as u64,
                    created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                    challenge_title: Some("Wall sit".to_string()),
                },
            );
        }
        for id in &challenge_ids {
            self.challenges.insert(
                id.clone(),
                ChallengeRef {
                    id: id.clone(),
                    title: format!("Title {}", id),
                    description: "Do it".to_string(),
                    hype_count: 12,
                    ends_at: None,
                    created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                },
            );
        }
        self.profiles.insert(
            "author-0".to_string(),
            ProfileRef {
                id: "author-0".to_string(),
                username: Some("@zero".to_string()),
            },
        );

        self.attempts_by_mode.insert(mode, video_ids);
        self.challenges_by_mode.insert(mode, challenge_ids);
        self
    }

    fn with_latency(mut self, mode: FeedMode, latency: Duration) -> Self {
        self.latency_by_mode.insert(mode, latency);
        self
    }
}

#[async_trait]
impl CandidateSource for FakeBackend {
    async fn ranked_attempt_ids(
        &self,
        _viewer: &ViewerId,
        mode: FeedMode,
        limit: usize,
    ) -> Result<Vec<String>> {
        if let Some(latency) = self.latency_by_mode.get(&mode) {
            tokio::time::sleep(*latency).await;
        }
        Ok(self
            .attempts_by_mode
            .get(&mode)
            .map(|ids| ids.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn ranked_challenge_ids(
        &self,
        _viewer: &ViewerId,
        mode: FeedMode,
        limit: usize,
    ) -> Result<Vec<String>> {
        Ok(self
            .challenges_by_mode
            .get(&mode)
            .map(|ids| ids.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl RecordResolver for FakeBackend {
    async fn attempts(&self, ids: &[String]) -> Result<Vec<AttemptRef>> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_records {
            return Err(FeedError::Backend {
                status: 500,
                message: "attempts unavailable".to_string(),
            });
        }
        Ok(ids.iter().filter_map(|id| self.attempts.get(id)).cloned().collect())
    }

    async fn challenges(&self, ids: &[String]) -> Result<Vec<ChallengeRef>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.challenges.get(id))
            .cloned()
            .collect())
    }

    async fn profiles(&self, user_ids: &[String]) -> Result<Vec<ProfileRef>> {
        Ok(user_ids
            .iter()
            .filter_map(|id| self.profiles.get(id))
            .cloned()
            .collect())
    }
}

fn loader(backend: Arc<FakeBackend>) -> FeedLoader {
    FeedLoader::new(backend.clone(), backend, FeedLimits::default())
}

fn sequencer() -> FeedSequencer {
    FeedSequencer::new(
        &NavigationConfig::default(),
        Arc::new(PublicStorageLocator::new("https://media.test", "videos")),
    )
}

fn signed_in() -> ViewerContext {
    ViewerContext::signed_in(ViewerId::new("viewer-1"), Some("jwt".to_string()))
}

#[tokio::test(start_paused = true)]
async fn test_full_feed_walkthrough() {
    let backend = Arc::new(FakeBackend::default().with_feed(FeedMode::ForYou, 9, 6));
    let loader = loader(backend);
    let session = signed_in();
    let mut seq = sequencer();

    assert!(seq.reload(&loader, &session, FeedMode::ForYou).await);
    assert_eq!(seq.status(), &LoadStatus::Ready);
    assert_eq!(seq.sequence().len(), 11);

    match seq.current_view() {
        UnitView::Video(VideoView {
            attempt_id,
            card: Some(card),
        }) => {
            assert_eq!(attempt_id, "fy-v1");
            assert_eq!(card.handle, "zero");
            assert_eq!(card.attempt.display_caption(), Some("take 1"));
            assert_eq!(
                card.media_url.as_deref(),
                Some("https://media.test/storage/v1/object/public/videos/author-0/fy-v1.mp4")
            );
        }
        other => panic!("unexpected first unit {:?}", other),
    }
    assert_eq!(
        seq.preload_url().as_deref(),
        Some("https://media.test/storage/v1/object/public/videos/author-1/fy-v2.mp4")
    );

    // walk to the first challenge block, one accepted step per cooldown window
    for _ in 0..4 {
        assert!(seq.handle_input(NavInput::Key(NavKey::ArrowDown)).moved());
        tokio::time::advance(Duration::from_millis(250)).await;
    }
    match seq.current_view() {
        UnitView::ChallengeBlock(BlockView { challenges, .. }) => {
            let ids: Vec<&str> = challenges.iter().map(|c| c.id.as_str()).collect();
            assert_eq!(ids, vec!["fy-c1", "fy-c2", "fy-c3"]);
        }
        other => panic!("expected challenge block, got {:?}", other),
    }
    // the block is skipped when looking for the next video to preload
    assert_eq!(
        seq.preload_target().map(|a| a.id.as_str()),
        Some("fy-v5")
    );

    // run to the end and push against the boundary
    for _ in 0..20 {
        seq.handle_input(NavInput::Wheel { delta_y: 60.0 });
        tokio::time::advance(Duration::from_millis(250)).await;
    }
    assert_eq!(seq.cursor(), 10);
    assert_eq!(
        seq.current_unit(),
        Some(&DisplayUnit::Video {
            attempt_id: "fy-v9".to_string()
        })
    );
    assert!(seq.preload_url().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_slow_earlier_load_cannot_overwrite_newer_tab() {
    let backend = Arc::new(
        FakeBackend::default()
            .with_feed(FeedMode::ForYou, 8, 3)
            .with_feed(FeedMode::Following, 2, 3)
            .with_latency(FeedMode::ForYou, Duration::from_secs(2)),
    );
    let loader = loader(backend);
    let viewer = ViewerId::new("viewer-1");
    let mut seq = sequencer();

    let for_you = seq.begin_load(FeedMode::ForYou);
    let following = seq.begin_load(FeedMode::Following);

    let slow = loader.load(&viewer, FeedMode::ForYou);
    let fast = loader.load(&viewer, FeedMode::Following);
    tokio::pin!(slow);

    // the newer load completes first
    let fast_result = tokio::select! {
        biased;
        r = fast => r,
        _ = &mut slow => panic!("slow load finished first"),
    };
    assert!(seq.apply_load(following, fast_result));
    assert_eq!(seq.sequence().len(), 2);

    let slow_result = slow.await;
    assert!(slow_result.is_ok());
    assert!(!seq.apply_load(for_you, slow_result));

    assert_eq!(seq.mode(), FeedMode::Following);
    assert_eq!(seq.snapshot().mode, FeedMode::Following);
    assert_eq!(seq.sequence().len(), 2);
}

#[tokio::test]
async fn test_record_failure_keeps_previous_feed() {
    let healthy = Arc::new(FakeBackend::default().with_feed(FeedMode::ForYou, 5, 3));
    let mut seq = sequencer();
    let session = signed_in();
    assert!(seq.reload(&loader(healthy), &session, FeedMode::ForYou).await);
    assert!(seq.step(1).moved());

    let mut broken = FakeBackend::default().with_feed(FeedMode::ForYou, 7, 3);
    broken.fail_records = true;
    let broken = Arc::new(broken);
    assert!(seq.reload(&loader(broken.clone()), &session, FeedMode::ForYou).await);

    assert_eq!(broken.record_calls.load(Ordering::SeqCst), 1);
    assert!(matches!(seq.status(), LoadStatus::Failed { .. }));
    assert_eq!(seq.sequence().len(), 6);
    assert_eq!(seq.cursor(), 1);
    assert_eq!(
        seq.current_unit().and_then(DisplayUnit::attempt_id),
        Some("fy-v2")
    );
}

#[tokio::test]
async fn test_signed_out_viewer_gets_empty_state() {
    let backend = Arc::new(FakeBackend::default().with_feed(FeedMode::ForYou, 5, 3));
    let session = ViewerContext::new();
    let mut seq = sequencer();

    assert!(seq.reload(&loader(backend.clone()), &session, FeedMode::ForYou).await);
    assert_eq!(seq.status(), &LoadStatus::SignedOut);
    assert_eq!(seq.current_view(), UnitView::Empty);
    assert_eq!(backend.record_calls.load(Ordering::SeqCst), 0);

    session.sign_in(ViewerId::new("viewer-1"), None);
    assert!(seq.reload(&loader(backend), &session, FeedMode::ForYou).await);
    assert_eq!(seq.status(), &LoadStatus::Ready);
}

#[tokio::test]
async fn test_short_feed_has_no_challenge_block() {
    let backend = Arc::new(FakeBackend::default().with_feed(FeedMode::Following, 2, 3));
    let mut seq = sequencer();
    seq.reload(&loader(backend), &signed_in(), FeedMode::Following)
        .await;

    assert_eq!(seq.sequence().len(), 2);
    assert_eq!(seq.sequence().block_count(), 0);
}
