//! Host-facing feed state machine
//!
//! [`FeedSequencer`] owns the current [`FeedSnapshot`] and its cursor. The
//! host UI feeds it navigation input and load results and reads back a
//! [`UnitView`] and a preload URL; it never mutates the sequence directly.
//!
//! Loads are tagged with a [`LoadTicket`]. Only the result for the most
//! recently issued ticket is applied, so a slow load for a tab the viewer has
//! already left cannot overwrite the newer feed.

use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::clients::MediaLocator;
use crate::config::NavigationConfig;
use crate::error::{FeedError, Result};
use crate::loader::{FeedLoader, FeedSnapshot};
use crate::models::{AttemptRef, ChallengeRef, FeedMode};
use crate::navigation::{NavInput, NavigationLock};
use crate::sequence::{DisplayUnit, FeedSequence};
use crate::session::ViewerContext;

/// Generation token for one load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    mode: FeedMode,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mode(&self) -> FeedMode {
        self.mode
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading { generation: u64 },
    Ready,
    /// No viewer is signed in
    SignedOut,
    Failed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved { from: usize, to: usize },
    /// Accepted but already at the edge; the cooldown is still armed
    AtBoundary,
    /// Dropped because the cooldown is armed
    Throttled,
    /// Nothing to navigate
    Empty,
    /// Input that does not map to a step
    Ignored,
}

impl StepOutcome {
    pub fn moved(&self) -> bool {
        matches!(self, StepOutcome::Moved { .. })
    }
}

/// What the host should render for the focused unit
#[derive(Debug, Clone, PartialEq)]
pub enum UnitView<'a> {
    Empty,
    Video(VideoView<'a>),
    ChallengeBlock(BlockView<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoView<'a> {
    pub attempt_id: &'a str,
    /// `None` while the attempt record is unresolved (render a placeholder)
    pub card: Option<VideoCard<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoCard<'a> {
    pub attempt: &'a AttemptRef,
    pub handle: String,
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockView<'a> {
    pub challenge_ids: &'a [String],
    /// Resolved challenges in block order; empty means still loading
    pub challenges: Vec<&'a ChallengeRef>,
}

impl BlockView<'_> {
    pub fn is_loading(&self) -> bool {
        self.challenges.is_empty()
    }
}

pub struct FeedSequencer {
    snapshot: FeedSnapshot,
    status: LoadStatus,
    mode: FeedMode,
    latest_generation: u64,
    lock: NavigationLock,
    wheel_threshold: f64,
    media: Arc<dyn MediaLocator>,
}

impl FeedSequencer {
    pub fn new(navigation: &NavigationConfig, media: Arc<dyn MediaLocator>) -> Self {
        Self {
            snapshot: FeedSnapshot::default(),
            status: LoadStatus::Idle,
            mode: FeedMode::default(),
            latest_generation: 0,
            lock: NavigationLock::new(navigation.cooldown()),
            wheel_threshold: navigation.wheel_threshold,
            media,
        }
    }

    /// Tab most recently requested through [`begin_load`](Self::begin_load).
    ///
    /// Switches as soon as a load starts and stays put if that load fails;
    /// the tab the displayed units belong to is `snapshot().mode`.
    pub fn mode(&self) -> FeedMode {
        self.mode
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn snapshot(&self) -> &FeedSnapshot {
        &self.snapshot
    }

    pub fn sequence(&self) -> &FeedSequence {
        &self.snapshot.sequence
    }

    pub fn cursor(&self) -> usize {
        self.snapshot.sequence.cursor()
    }

    // ============= Loading =============

    /// Issue a ticket for a new load of `mode`; supersedes every earlier ticket
    pub fn begin_load(&mut self, mode: FeedMode) -> LoadTicket {
        self.latest_generation += 1;
        self.mode = mode;
        self.status = LoadStatus::Loading {
            generation: self.latest_generation,
        };
        debug!(generation = self.latest_generation, mode = %mode, "Feed load started");
        LoadTicket {
            generation: self.latest_generation,
            mode,
        }
    }

    pub fn is_latest(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.latest_generation
    }

    /// Apply a load result. Returns `false` when the ticket was superseded.
    ///
    /// A failed load leaves the previous feed and cursor untouched.
    pub fn apply_load(&mut self, ticket: LoadTicket, result: Result<FeedSnapshot>) -> bool {
        if !self.is_latest(&ticket) {
            debug!(
                generation = ticket.generation,
                latest = self.latest_generation,
                "Dropping stale feed load"
            );
            return false;
        }

        match result {
            Ok(snapshot) => {
                info!(
                    generation = ticket.generation,
                    mode = %ticket.mode,
                    units = snapshot.sequence.len(),
                    "Feed applied"
                );
                self.snapshot = snapshot;
                self.status = LoadStatus::Ready;
            }
            Err(FeedError::Unauthenticated) => {
                info!(generation = ticket.generation, "Feed load skipped: no viewer");
                self.status = LoadStatus::SignedOut;
            }
            Err(e) => {
                warn!(generation = ticket.generation, error = %e, "Feed load failed");
                self.status = LoadStatus::Failed {
                    message: e.to_string(),
                };
            }
        }
        true
    }

    /// Load `mode` for the current viewer and apply it
    pub async fn reload(
        &mut self,
        loader: &FeedLoader,
        session: &ViewerContext,
        mode: FeedMode,
    ) -> bool {
        let ticket = self.begin_load(mode);
        let result = match session.require() {
            Ok(viewer) => loader.load(&viewer, mode).await,
            Err(e) => Err(e),
        };
        self.apply_load(ticket, result)
    }

    // ============= Rendering =============

    pub fn current_unit(&self) -> Option<&DisplayUnit> {
        self.snapshot.sequence.current()
    }

    pub fn current_view(&self) -> UnitView<'_> {
        match self.current_unit() {
            None => UnitView::Empty,
            Some(DisplayUnit::Video { attempt_id }) => UnitView::Video(VideoView {
                attempt_id,
                card: self.snapshot.attempts.get(attempt_id).map(|attempt| VideoCard {
                    attempt,
                    handle: attempt.display_handle(self.snapshot.username(&attempt.user_id)),
                    media_url: self.media.public_url(&attempt.video_path),
                }),
            }),
            Some(DisplayUnit::ChallengeBlock { challenge_ids }) => {
                UnitView::ChallengeBlock(BlockView {
                    challenge_ids,
                    challenges: challenge_ids
                        .iter()
                        .filter_map(|id| self.snapshot.challenges.get(id))
                        .collect(),
                })
            }
        }
    }

    /// First resolved video strictly after the cursor
    pub fn preload_target(&self) -> Option<&AttemptRef> {
        self.snapshot
            .sequence
            .ahead()
            .filter_map(|(_, unit)| unit.attempt_id())
            .find_map(|id| self.snapshot.attempts.get(id))
    }

    pub fn preload_url(&self) -> Option<String> {
        self.preload_target()
            .and_then(|attempt| self.media.public_url(&attempt.video_path))
    }

    // ============= Navigation =============

    pub fn step(&mut self, delta: i64) -> StepOutcome {
        self.step_at(delta, Instant::now())
    }

    pub fn step_at(&mut self, delta: i64, now: Instant) -> StepOutcome {
        let Some(target) = self.snapshot.sequence.clamped_target(delta) else {
            return StepOutcome::Empty;
        };
        if !self.lock.try_arm_at(now) {
            return StepOutcome::Throttled;
        }

        let from = self.snapshot.sequence.cursor();
        if target == from {
            return StepOutcome::AtBoundary;
        }
        self.snapshot.sequence.move_by(delta);
        debug!(from, to = target, "Feed cursor moved");
        StepOutcome::Moved { from, to: target }
    }

    pub fn handle_input(&mut self, input: NavInput) -> StepOutcome {
        self.handle_input_at(input, Instant::now())
    }

    pub fn handle_input_at(&mut self, input: NavInput, now: Instant) -> StepOutcome {
        if input == NavInput::VideoEnded
            && !self.current_unit().map_or(false, DisplayUnit::is_video)
        {
            return StepOutcome::Ignored;
        }
        match input.direction(self.wheel_threshold) {
            Some(delta) => self.step_at(delta, now),
            None => StepOutcome::Ignored,
        }
    }
}
