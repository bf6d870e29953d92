//! Interaction tunables.
//!
//! Values are plain data so hosts can load them from any serde format; every
//! field falls back to its default when absent.

use crate::interaction::gesture::{
    CornerCoverage, GestureStrategy, SwipeCount, TimedHold,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_HOLD_DURATION_MS: u64 = 2000;
pub const DEFAULT_MOVE_TOLERANCE_PX: f32 = 10.0;
pub const DEFAULT_SWIPE_DISTANCE_PX: f32 = 40.0;
pub const DEFAULT_SWIPES_REQUIRED: u32 = 3;

/// Which completion gesture a deployment uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    /// Press and hold without moving.
    #[default]
    TimedHold,
    /// Tap each of the four quadrants once.
    CornerCoverage,
    /// Several dominant-horizontal swipes.
    SwipeCount,
}

impl GestureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TimedHold => "timed_hold",
            Self::CornerCoverage => "corner_coverage",
            Self::SwipeCount => "swipe_count",
        }
    }
}

/// Gesture recognizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub strategy: GestureKind,
    pub hold_duration_ms: u64,
    /// Max travel from the press origin on either axis before a hold cancels.
    pub move_tolerance_px: f32,
    /// Min horizontal travel for one swipe to count.
    pub swipe_distance_px: f32,
    pub swipes_required: u32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            strategy: GestureKind::default(),
            hold_duration_ms: DEFAULT_HOLD_DURATION_MS,
            move_tolerance_px: DEFAULT_MOVE_TOLERANCE_PX,
            swipe_distance_px: DEFAULT_SWIPE_DISTANCE_PX,
            swipes_required: DEFAULT_SWIPES_REQUIRED,
        }
    }
}

impl InteractionConfig {
    pub fn hold_duration(&self) -> Duration {
        Duration::from_millis(self.hold_duration_ms)
    }

    /// Builds the configured strategy.
    pub fn build_strategy(&self) -> Box<dyn GestureStrategy> {
        match self.strategy {
            GestureKind::TimedHold => {
                Box::new(TimedHold::new(self.hold_duration(), self.move_tolerance_px))
            }
            GestureKind::CornerCoverage => Box::new(CornerCoverage::new()),
            GestureKind::SwipeCount => Box::new(SwipeCount::new(
                self.swipe_distance_px,
                self.swipes_required.max(1),
            )),
        }
    }
}
