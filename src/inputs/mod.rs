//! Pointer input: motion events and the two gesture recognizers

pub mod gesture_detector;
pub mod motion;
pub mod scale_detector;
pub mod velocity;

use serde::{Deserialize, Serialize};

pub use gesture_detector::{GestureDetector, OnGestureListener};
pub use motion::{MotionAction, MotionEvent, Pointer};
pub use scale_detector::{OnScaleGestureListener, ScaleGestureDetector, ScaleState};
pub use velocity::VelocityTracker;

/// Thresholds shared by the recognizers, in pixels and milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Distance a pointer may wander before a press turns into a scroll
    pub touch_slop: f32,
    /// Delay before a held press is reported as shown
    pub tap_timeout_ms: u64,
    /// Delay before a held press becomes a long press
    pub long_press_timeout_ms: u64,
    /// Release velocity (px/s) below which no fling is reported
    pub min_fling_velocity: f32,
    /// Release velocities are clamped to this (px/s)
    pub max_fling_velocity: f32,
    /// Smallest finger span that can start a pinch
    pub min_scaling_span: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            touch_slop: 8.0,
            tap_timeout_ms: 100,
            long_press_timeout_ms: 500,
            min_fling_velocity: 50.0,
            max_fling_velocity: 8000.0,
            min_scaling_span: 27.0,
        }
    }
}
