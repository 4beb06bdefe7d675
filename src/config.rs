//! Screen configuration.
//!
//! Every field has a default, so a partial JSON document is enough to
//! override a single setting:
//!
//! ```
//! use canvas_turtle::ScreenConfig;
//!
//! let config = ScreenConfig::from_json(r#"{ "width": 400, "mode": "instant" }"#).unwrap();
//! assert_eq!(config.width, 400);
//! assert_eq!(config.height, 500);
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How pacer threads treat the per-action delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacingMode {
    /// Sleep proportionally to distance and speed to animate motion.
    #[default]
    Animated,
    /// Forward every action immediately. Useful for headless runs and tests.
    Instant,
}

/// Configuration for a [`Screen`](crate::Screen) and the pacers feeding it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Initial background color (any color the codec accepts).
    pub background: String,
    /// Render ticks per second for the batch flush loop.
    pub frame_rate: u32,
    /// Global multiplier applied to every paced motion.
    pub delay_factor: f64,
    /// Seconds of wall time per animation step.
    pub step_secs: f64,
    /// Fixed delay used at the "fastest" speed levels (0 and 10).
    pub fastest_delay_ms: u64,
    /// Whether pacers sleep at all.
    pub mode: PacingMode,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 500,
            background: "white".to_string(),
            frame_rate: 12,
            delay_factor: 2.0,
            step_secs: 0.05,
            fastest_delay_ms: 0,
            mode: PacingMode::Animated,
        }
    }
}

impl ScreenConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON document, filling missing fields with defaults.
    pub fn from_json(doc: &str) -> Result<Self> {
        Ok(serde_json::from_str(doc)?)
    }

    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    #[must_use]
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    #[must_use]
    pub fn with_delay_factor(mut self, delay_factor: f64) -> Self {
        self.delay_factor = delay_factor;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: PacingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Configuration for headless use: nothing sleeps.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            mode: PacingMode::Instant,
            ..Self::default()
        }
    }

    /// Interval between two render ticks. A zero frame rate is treated as 1 Hz.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate.max(1) as f64)
    }

    pub fn fastest_delay(&self) -> Duration {
        Duration::from_millis(self.fastest_delay_ms)
    }
}
