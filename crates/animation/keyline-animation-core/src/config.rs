//! Engine and animator configuration.

use serde::{Deserialize, Serialize};

use crate::ids::Millis;

/// Smallest frame rate an animator accepts; lower requests are clamped.
pub const MIN_FRAME_RATE: f64 = 0.01;

/// Smallest animation length in milliseconds; lower requests are clamped.
pub const MIN_MAX_TIME_MS: Millis = 1;

/// Playback settings applied to a newly created animator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    /// Frames per second; affects stepping granularity only.
    pub frame_rate: f64,
    /// Authoritative animation length.
    pub max_time_ms: Millis,
    pub loops: bool,
    pub reset_time_on_stop: bool,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30.0,
            max_time_ms: 5_000,
            loops: false,
            reset_time_on_stop: false,
        }
    }
}

impl AnimatorConfig {
    /// Copy with out-of-range values clamped to their minimums.
    pub fn sanitized(&self) -> Self {
        Self {
            frame_rate: clamp_frame_rate(self.frame_rate),
            max_time_ms: self.max_time_ms.max(MIN_MAX_TIME_MS),
            ..self.clone()
        }
    }
}

/// Configuration for the animator arena.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings for animators created lazily by the engine.
    pub animator: AnimatorConfig,
    /// Drop animators with nothing left to animate whenever a shape is removed.
    pub prune_idle_on_remove: bool,
}

pub(crate) fn clamp_frame_rate(fps: f64) -> f64 {
    if fps.is_finite() && fps >= MIN_FRAME_RATE {
        fps
    } else {
        MIN_FRAME_RATE
    }
}
