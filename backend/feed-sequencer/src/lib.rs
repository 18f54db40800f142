//! Thriver feed sequencer
//!
//! Composes the vertical video feed from two independently ranked candidate
//! lists (video attempts and public challenges) and drives single-item
//! navigation over it with a cooldown lock and next-video preloading.
//! Data, ranking and business rules stay in the managed backend.

pub mod clients;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod navigation;
pub mod sequence;
pub mod sequencer;
pub mod session;
pub mod telemetry;

pub use config::FeedConfig;
pub use error::{FeedError, Result};
pub use loader::{FeedLoader, FeedSnapshot};
pub use models::{AttemptRef, ChallengeRef, FeedMode, ProfileRef, ViewerId};
pub use navigation::{NavInput, NavKey, NavigationLock};
pub use sequence::{build_sequence, BlockLayout, DisplayUnit, FeedSequence};
pub use sequencer::{FeedSequencer, LoadStatus, LoadTicket, StepOutcome, UnitView};
pub use session::ViewerContext;
