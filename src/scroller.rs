//! Inertial scroll animator
//!
//! Two kinds of animation: a timed scroll by a fixed distance (used for
//! page-turn steps) and a fling that decelerates from an initial velocity
//! until it stops or reaches its bounds. The animator never drives itself;
//! the owner calls [`Scroller::compute_scroll_offset`] once per frame and
//! keeps requesting frames while it returns `true`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use log::trace;

/// Source of animation time in milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall clock, milliseconds since the clock was created
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Clock that only moves when told to. Used by tests and by script replay.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    #[must_use]
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::Relaxed);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}

/// Default scroll friction, matching common touch toolkits
pub const DEFAULT_FRICTION: f32 = 0.015;

/// Standard gravity in m/s^2
const GRAVITY_EARTH: f32 = 9.806_65;
const INCHES_PER_METER: f32 = 39.37;
/// Baseline density the deceleration is expressed in
const PIXELS_PER_INCH: f32 = 160.0;

const VISCOUS_FLUID_SCALE: f32 = 8.0;

fn viscous_fluid_raw(x: f32) -> f32 {
    let x = x * VISCOUS_FLUID_SCALE;
    if x < 1.0 {
        x - (1.0 - (-x).exp())
    } else {
        let start = 0.367_879_44; // 1/e == viscous_fluid(1)
        let x = 1.0 - (1.0 - x).exp();
        start + x * (1.0 - start)
    }
}

/// Ease-in, ease-out curve mapping `[0, 1]` onto `[0, 1]`
pub(crate) fn viscous_fluid(x: f32) -> f32 {
    let normalize = 1.0 / viscous_fluid_raw(1.0);
    let interpolated = normalize * viscous_fluid_raw(x);
    if interpolated > 0.0 {
        interpolated + (1.0 - normalize * viscous_fluid_raw(1.0))
    } else {
        interpolated
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Scroll,
    Fling,
}

/// Fling and timed scroll animator
pub struct Scroller {
    clock: Arc<dyn Clock>,
    mode: Mode,
    finished: bool,

    start_x: i32,
    start_y: i32,
    final_x: i32,
    final_y: i32,
    curr_x: i32,
    curr_y: i32,

    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,

    start_time_ms: u64,
    duration_ms: u64,
    delta_x: f32,
    delta_y: f32,

    velocity: f32,
    coeff_x: f32,
    coeff_y: f32,
    /// Deceleration in px/s^2
    deceleration: f32,
}

impl Scroller {
    pub fn new(clock: Arc<dyn Clock>, friction: f32) -> Self {
        Self {
            clock,
            mode: Mode::Scroll,
            finished: true,
            start_x: 0,
            start_y: 0,
            final_x: 0,
            final_y: 0,
            curr_x: 0,
            curr_y: 0,
            min_x: 0,
            max_x: 0,
            min_y: 0,
            max_y: 0,
            start_time_ms: 0,
            duration_ms: 0,
            delta_x: 0.0,
            delta_y: 0.0,
            velocity: 0.0,
            coeff_x: 0.0,
            coeff_y: 0.0,
            deceleration: Self::deceleration_for(friction),
        }
    }

    fn deceleration_for(friction: f32) -> f32 {
        GRAVITY_EARTH * INCHES_PER_METER * PIXELS_PER_INCH * friction.max(f32::EPSILON)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Stop the animation. With `finished == true` the current position
    /// stays where the last frame left it.
    pub fn force_finished(&mut self, finished: bool) {
        self.finished = finished;
    }

    #[must_use]
    pub fn curr_x(&self) -> i32 {
        self.curr_x
    }

    #[must_use]
    pub fn curr_y(&self) -> i32 {
        self.curr_y
    }

    #[must_use]
    pub fn final_x(&self) -> i32 {
        self.final_x
    }

    #[must_use]
    pub fn final_y(&self) -> i32 {
        self.final_y
    }

    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    fn elapsed_ms(&self) -> u64 {
        self.clock.now_ms().saturating_sub(self.start_time_ms)
    }

    /// Scroll by `(dx, dy)` starting at `(start_x, start_y)` over `duration_ms`
    pub fn start_scroll(&mut self, start_x: i32, start_y: i32, dx: i32, dy: i32, duration_ms: u64) {
        self.mode = Mode::Scroll;
        self.finished = false;
        self.duration_ms = duration_ms;
        self.start_time_ms = self.clock.now_ms();
        self.start_x = start_x;
        self.start_y = start_y;
        self.curr_x = start_x;
        self.curr_y = start_y;
        self.final_x = start_x.saturating_add(dx);
        self.final_y = start_y.saturating_add(dy);
        self.delta_x = dx as f32;
        self.delta_y = dy as f32;
        trace!(
            "start_scroll ({start_x},{start_y}) by ({dx},{dy}) over {duration_ms}ms"
        );
    }

    /// Decelerate from `(velocity_x, velocity_y)` px/s, never leaving the
    /// given bounds
    #[allow(clippy::too_many_arguments)]
    pub fn fling(
        &mut self,
        start_x: i32,
        start_y: i32,
        velocity_x: i32,
        velocity_y: i32,
        min_x: i32,
        max_x: i32,
        min_y: i32,
        max_y: i32,
    ) {
        self.mode = Mode::Fling;
        self.finished = false;

        let vx = velocity_x as f32;
        let vy = velocity_y as f32;
        let velocity = vx.hypot(vy);
        self.velocity = velocity;
        self.duration_ms = (1000.0 * velocity / self.deceleration) as u64;
        self.start_time_ms = self.clock.now_ms();
        self.start_x = start_x;
        self.start_y = start_y;
        self.curr_x = start_x;
        self.curr_y = start_y;

        if velocity == 0.0 {
            self.coeff_x = 1.0;
            self.coeff_y = 1.0;
        } else {
            self.coeff_x = vx / velocity;
            self.coeff_y = vy / velocity;
        }

        let total_distance = (velocity * velocity) / (2.0 * self.deceleration);

        self.min_x = min_x;
        self.max_x = max_x;
        self.min_y = min_y;
        self.max_y = max_y;

        self.final_x = start_x
            .saturating_add((total_distance * self.coeff_x).round() as i32)
            .min(max_x)
            .max(min_x);
        self.final_y = start_y
            .saturating_add((total_distance * self.coeff_y).round() as i32)
            .min(max_y)
            .max(min_y);
        trace!(
            "fling from ({start_x},{start_y}) v=({velocity_x},{velocity_y}) -> ({},{}) in {}ms",
            self.final_x, self.final_y, self.duration_ms
        );
    }

    /// Advance to the current time. Returns `false` once the animation has
    /// already finished; the frame that reaches the end still returns `true`.
    pub fn compute_scroll_offset(&mut self) -> bool {
        if self.finished {
            return false;
        }

        let elapsed = self.elapsed_ms();
        if elapsed >= self.duration_ms {
            self.curr_x = self.final_x;
            self.curr_y = self.final_y;
            self.finished = true;
            return true;
        }

        match self.mode {
            Mode::Scroll => {
                let t = viscous_fluid(elapsed as f32 / self.duration_ms as f32);
                self.curr_x = self.start_x.saturating_add((t * self.delta_x).round() as i32);
                self.curr_y = self.start_y.saturating_add((t * self.delta_y).round() as i32);
            }
            Mode::Fling => {
                let secs = elapsed as f32 / 1000.0;
                let distance = self.velocity * secs - self.deceleration * secs * secs / 2.0;

                self.curr_x = self
                    .start_x
                    .saturating_add((distance * self.coeff_x).round() as i32)
                    .min(self.max_x)
                    .max(self.min_x);
                self.curr_y = self
                    .start_y
                    .saturating_add((distance * self.coeff_y).round() as i32)
                    .min(self.max_y)
                    .max(self.min_y);

                if self.curr_x == self.final_x && self.curr_y == self.final_y {
                    self.finished = true;
                }
            }
        }
        true
    }
}

impl std::fmt::Debug for Scroller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scroller")
            .field("mode", &self.mode)
            .field("finished", &self.finished)
            .field("curr", &(self.curr_x, self.curr_y))
            .field("final", &(self.final_x, self.final_y))
            .field("duration_ms", &self.duration_ms)
            .finish_non_exhaustive()
    }
}
