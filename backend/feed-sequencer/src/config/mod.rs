use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{FeedError, Result};

/// Environment variable prefix for all settings
pub const ENV_PREFIX: &str = "THRIVER_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub app: AppConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub feed: FeedLimits,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub log_level: String,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the managed backend, e.g. `https://xyz.example.co`
    pub url: String,
    /// Public (anon) API key sent with every request
    pub anon_key: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Candidate and resolution limits for one feed load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedLimits {
    #[serde(default = "default_attempt_limit")]
    pub attempt_limit: usize,
    #[serde(default = "default_challenge_limit")]
    pub challenge_limit: usize,
    /// Maximum number of unique ids resolved per record batch
    #[serde(default = "default_resolve_cap")]
    pub resolve_cap: usize,
    #[serde(default = "default_videos_per_block")]
    pub videos_per_block: usize,
    #[serde(default = "default_block_size")]
    pub block_size: usize,
}

impl Default for FeedLimits {
    fn default() -> Self {
        Self {
            attempt_limit: default_attempt_limit(),
            challenge_limit: default_challenge_limit(),
            resolve_cap: default_resolve_cap(),
            videos_per_block: default_videos_per_block(),
            block_size: default_block_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Minimum absolute wheel delta that counts as one step
    #[serde(default = "default_wheel_threshold")]
    pub wheel_threshold: f64,
}

impl NavigationConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
            wheel_threshold: default_wheel_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_media_bucket")]
    pub bucket: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            bucket: default_media_bucket(),
        }
    }
}

/// Flat view of the `THRIVER_*` environment, decoded by envy
#[derive(Debug, Deserialize)]
struct EnvSettings {
    backend_url: String,
    anon_key: String,
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
    #[serde(default = "default_attempt_limit")]
    attempt_limit: usize,
    #[serde(default = "default_challenge_limit")]
    challenge_limit: usize,
    #[serde(default = "default_resolve_cap")]
    resolve_cap: usize,
    #[serde(default = "default_videos_per_block")]
    videos_per_block: usize,
    #[serde(default = "default_block_size")]
    block_size: usize,
    #[serde(default = "default_cooldown_ms")]
    nav_cooldown_ms: u64,
    #[serde(default = "default_wheel_threshold")]
    wheel_threshold: f64,
    #[serde(default = "default_media_bucket")]
    media_bucket: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_log_json")]
    log_json: bool,
}

impl FeedConfig {
    /// Load configuration from `.env` (if present) and the process environment
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let settings: EnvSettings = envy::prefixed(ENV_PREFIX).from_env()?;
        Self::from_settings(settings)
    }

    /// Load configuration from explicit key/value pairs (keys carry the prefix)
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let settings: EnvSettings = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        Self::from_settings(settings)
    }

    fn from_settings(settings: EnvSettings) -> Result<Self> {
        let url = settings.backend_url.trim().trim_end_matches('/').to_string();
        if url.is_empty() {
            return Err(FeedError::Config(format!(
                "{}BACKEND_URL must not be empty",
                ENV_PREFIX
            )));
        }
        if settings.anon_key.trim().is_empty() {
            return Err(FeedError::Config(format!(
                "{}ANON_KEY must not be empty",
                ENV_PREFIX
            )));
        }

        Ok(FeedConfig {
            app: AppConfig {
                log_level: settings.log_level,
                log_json: settings.log_json,
            },
            backend: BackendConfig {
                url,
                anon_key: settings.anon_key,
                request_timeout_secs: settings.request_timeout_secs,
            },
            feed: FeedLimits {
                attempt_limit: settings.attempt_limit,
                challenge_limit: settings.challenge_limit,
                resolve_cap: settings.resolve_cap,
                videos_per_block: settings.videos_per_block,
                block_size: settings.block_size,
            },
            navigation: NavigationConfig {
                cooldown_ms: settings.nav_cooldown_ms,
                wheel_threshold: settings.wheel_threshold,
            },
            media: MediaConfig {
                bucket: settings.media_bucket,
            },
        })
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_json() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_attempt_limit() -> usize {
    70
}

fn default_challenge_limit() -> usize {
    60
}

fn default_resolve_cap() -> usize {
    70
}

fn default_videos_per_block() -> usize {
    4
}

fn default_block_size() -> usize {
    3
}

fn default_cooldown_ms() -> u64 {
    220
}

fn default_wheel_threshold() -> f64 {
    18.0
}

fn default_media_bucket() -> String {
    "videos".to_string()
}
