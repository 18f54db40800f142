//! Discrete feed navigation
//!
//! Raw input (keys, wheel deltas, end-of-video) is reduced to a single step
//! direction, and a cooldown lock makes one physical gesture move the feed by
//! at most one unit. Input arriving while the lock is armed is dropped, never
//! queued.

use std::time::Duration;
use tokio::time::Instant;

use crate::config::NavigationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowDown,
    ArrowUp,
    PageDown,
    PageUp,
    Space,
    Other,
}

impl NavKey {
    /// Map a DOM-style key name (`KeyboardEvent.key`)
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "ArrowDown" => NavKey::ArrowDown,
            "ArrowUp" => NavKey::ArrowUp,
            "PageDown" => NavKey::PageDown,
            "PageUp" => NavKey::PageUp,
            " " | "Space" | "Spacebar" => NavKey::Space,
            _ => NavKey::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavInput {
    Key(NavKey),
    Wheel { delta_y: f64 },
    /// The focused video finished playing
    VideoEnded,
}

impl NavInput {
    /// Step direction for this input, `None` when it should be ignored
    pub fn direction(&self, wheel_threshold: f64) -> Option<i64> {
        match self {
            NavInput::Key(NavKey::ArrowDown | NavKey::PageDown | NavKey::Space) => Some(1),
            NavInput::Key(NavKey::ArrowUp | NavKey::PageUp) => Some(-1),
            NavInput::Key(NavKey::Other) => None,
            NavInput::Wheel { delta_y } => {
                if !delta_y.is_finite() || delta_y.abs() < wheel_threshold {
                    None
                } else if *delta_y > 0.0 {
                    Some(1)
                } else {
                    Some(-1)
                }
            }
            NavInput::VideoEnded => Some(1),
        }
    }
}

/// Cooldown lock armed by each accepted step
#[derive(Debug, Clone)]
pub struct NavigationLock {
    cooldown: Duration,
    armed_until: Option<Instant>,
}

impl NavigationLock {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            armed_until: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn is_armed_at(&self, now: Instant) -> bool {
        matches!(self.armed_until, Some(until) if now < until)
    }

    pub fn is_armed(&self) -> bool {
        self.is_armed_at(Instant::now())
    }

    /// Arm the lock unless it is already armed. Returns whether it was acquired.
    pub fn try_arm_at(&mut self, now: Instant) -> bool {
        if self.is_armed_at(now) {
            return false;
        }
        self.armed_until = Some(now + self.cooldown);
        true
    }

    pub fn try_arm(&mut self) -> bool {
        self.try_arm_at(Instant::now())
    }

    pub fn release(&mut self) {
        self.armed_until = None;
    }
}

impl Default for NavigationLock {
    fn default() -> Self {
        Self::new(NavigationConfig::default().cooldown())
    }
}
