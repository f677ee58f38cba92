use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TourLoadError;

pub const DEFAULT_INTERPOLATION_STEPS: u32 = 300;
pub const DEFAULT_STEP_DELAY_MS: u64 = 60;

/// What happens to a move request that arrives while an animation runs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusyPolicy {
    /// Discard the request.
    #[default]
    Drop,
    /// Keep the most recent request and start it once the controller is idle.
    Coalesce,
}

/// Tour configuration document. Immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourConfig {
    /// `-1` means nothing visited yet. Missing or below `-1` is treated the same.
    #[serde(default)]
    pub last_visited_index: Option<i64>,
    pub dwell_duration_ms: u64,
    #[serde(default)]
    pub celebration_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_stream_url: Option<String>,
    #[serde(default = "default_interpolation_steps")]
    pub interpolation_steps: u32,
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
    #[serde(default)]
    pub busy_policy: BusyPolicy,
}

fn default_interpolation_steps() -> u32 {
    DEFAULT_INTERPOLATION_STEPS
}

fn default_step_delay_ms() -> u64 {
    DEFAULT_STEP_DELAY_MS
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            last_visited_index: None,
            dwell_duration_ms: 0,
            celebration_enabled: false,
            live_stream_url: None,
            interpolation_steps: DEFAULT_INTERPOLATION_STEPS,
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
            busy_policy: BusyPolicy::Drop,
        }
    }
}

impl TourConfig {
    pub fn from_json_str(json: &str) -> Result<Self, TourLoadError> {
        serde_json::from_str(json).map_err(|source| TourLoadError::Parse {
            document: "configuration",
            source,
        })
    }

    /// Last visited stop, or `None` if nothing has been visited.
    pub fn last_visited(&self) -> Option<usize> {
        self.last_visited_index
            .and_then(|i| usize::try_from(i).ok())
    }

    /// Starting stop for a tour of `len` stops: the last visited one,
    /// clamped to the tour, or the first stop.
    pub fn initial_index(&self, len: usize) -> usize {
        self.last_visited()
            .map_or(0, |i| i.min(len.saturating_sub(1)))
    }

    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_duration_ms)
    }
}

/// Timing knobs the controller runs with, resolved from [`TourConfig`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AnimationSettings {
    /// Number of equal interpolation steps per leg. Always at least 1.
    pub steps: u32,
    pub step_delay: Duration,
    pub dwell: Duration,
    pub celebration_enabled: bool,
    pub busy_policy: BusyPolicy,
}

impl AnimationSettings {
    pub fn from_config(config: &TourConfig) -> Self {
        Self {
            steps: config.interpolation_steps.max(1),
            step_delay: Duration::from_millis(config.step_delay_ms),
            dwell: config.dwell(),
            celebration_enabled: config.celebration_enabled,
            busy_policy: config.busy_policy,
        }
    }
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self::from_config(&TourConfig::default())
    }
}
