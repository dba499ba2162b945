//! Pointer velocity estimation for fling detection

use std::collections::{HashMap, VecDeque};

use super::motion::MotionEvent;

/// Samples older than this (relative to the newest) are ignored
const HORIZON_MS: u64 = 100;
/// Upper bound on retained samples per pointer
const MAX_SAMPLES: usize = 20;

#[derive(Clone, Copy, Debug)]
struct Sample {
    time_ms: u64,
    x: f32,
    y: f32,
}

/// Tracks recent positions of every pointer and derives velocities in px/s
#[derive(Debug, Default)]
pub struct VelocityTracker {
    samples: HashMap<u32, VecDeque<Sample>>,
}

impl VelocityTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn add_movement(&mut self, event: &MotionEvent) {
        for p in &event.pointers {
            let history = self.samples.entry(p.id).or_default();
            history.push_back(Sample {
                time_ms: event.time_ms,
                x: p.x,
                y: p.y,
            });
            while history.len() > MAX_SAMPLES {
                history.pop_front();
            }
        }
    }

    /// Velocity of pointer `id` over the recent window, clamped to
    /// `±max_velocity` on each axis. `(0, 0)` when there is not enough data.
    #[must_use]
    pub fn velocity(&self, id: u32, max_velocity: f32) -> (f32, f32) {
        let Some(history) = self.samples.get(&id) else {
            return (0.0, 0.0);
        };
        let Some(newest) = history.back() else {
            return (0.0, 0.0);
        };
        let Some(oldest) = history
            .iter()
            .find(|s| newest.time_ms.saturating_sub(s.time_ms) <= HORIZON_MS)
        else {
            return (0.0, 0.0);
        };

        let dt_ms = newest.time_ms.saturating_sub(oldest.time_ms);
        if dt_ms == 0 {
            return (0.0, 0.0);
        }
        let dt = dt_ms as f32 / 1000.0;
        let max = max_velocity.abs();
        let vx = ((newest.x - oldest.x) / dt).clamp(-max, max);
        let vy = ((newest.y - oldest.y) / dt).clamp(-max, max);
        (vx, vy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::motion::MotionAction;

    fn mv(t: u64, x: f32, y: f32) -> MotionEvent {
        MotionEvent::single(MotionAction::Move, t, x, y)
    }

    #[test]
    fn steady_motion_yields_constant_velocity() {
        let mut tracker = VelocityTracker::new();
        for i in 0..6 {
            tracker.add_movement(&mv(i * 10, i as f32 * 5.0, 100.0 - i as f32 * 2.0));
        }
        let (vx, vy) = tracker.velocity(0, 10_000.0);
        assert!((vx - 500.0).abs() < 0.01);
        assert!((vy + 200.0).abs() < 0.01);
    }

    #[test]
    fn old_samples_fall_out_of_window() {
        let mut tracker = VelocityTracker::new();
        tracker.add_movement(&mv(0, 0.0, 0.0));
        tracker.add_movement(&mv(500, 1000.0, 0.0));
        tracker.add_movement(&mv(550, 1000.0, 0.0));
        assert_eq!(tracker.velocity(0, 10_000.0), (0.0, 0.0));
    }

    #[test]
    fn velocity_is_clamped() {
        let mut tracker = VelocityTracker::new();
        tracker.add_movement(&mv(0, 0.0, 0.0));
        tracker.add_movement(&mv(10, 1000.0, 0.0));
        assert_eq!(tracker.velocity(0, 8000.0), (8000.0, 0.0));
    }

    #[test]
    fn unknown_pointer_has_no_velocity() {
        let tracker = VelocityTracker::new();
        assert_eq!(tracker.velocity(7, 8000.0), (0.0, 0.0));
    }
}
