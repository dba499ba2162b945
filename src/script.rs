//! Scripted gesture replay
//!
//! A script is a YAML list of high-level steps (tap, drag, pinch, ...).
//! Each step is expanded into the raw [`MotionEvent`]s a touch screen would
//! deliver and fed through the view's real recognizers on a manual clock,
//! so timeouts, fling physics and animations behave exactly as they would
//! live, only deterministically.
//!
//! ```yaml
//! frame_ms: 16
//! steps:
//!   - op: long_press
//!     x: 200
//!     y: 150
//!   - op: tap
//!     x: 120
//!     y: 96
//!   - op: drag
//!     from: [300, 400]
//!     to: [300, 100]
//!   - op: wait
//!     ms: 500
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, trace, warn};
use serde::Deserialize;

use crate::geometry::PointF;
use crate::inputs::{MotionAction, MotionEvent, Pointer};
use crate::scroller::{Clock, ManualClock};
use crate::widget::page_view::PageView;

/// Upper bound on frames drawn to settle one step
const MAX_SETTLE_FRAMES: usize = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("step {index} ({op}): {reason}")]
    InvalidStep {
        index: usize,
        op: &'static str,
        reason: String,
    },
}

fn default_frame_ms() -> u64 {
    16
}

fn default_tap_ms() -> u64 {
    40
}

fn default_hold_ms() -> u64 {
    600
}

fn default_drag_ms() -> u64 {
    300
}

fn default_fling_ms() -> u64 {
    60
}

fn default_pinch_ms() -> u64 {
    300
}

fn default_steps() -> u32 {
    10
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Tap {
        x: f32,
        y: f32,
        #[serde(default = "default_tap_ms")]
        duration_ms: u64,
    },
    LongPress {
        x: f32,
        y: f32,
        #[serde(default = "default_hold_ms")]
        hold_ms: u64,
    },
    /// Slow straight-line drag, released without a fling
    Drag {
        from: PointF,
        to: PointF,
        #[serde(default = "default_drag_ms")]
        duration_ms: u64,
        #[serde(default = "default_steps")]
        steps: u32,
    },
    /// Quick swipe released while still moving
    Fling {
        from: PointF,
        to: PointF,
        #[serde(default = "default_fling_ms")]
        duration_ms: u64,
        #[serde(default = "default_steps")]
        steps: u32,
    },
    /// Two fingers on a horizontal line through `center`, moving from
    /// `from_span` to `to_span` apart
    Pinch {
        center: PointF,
        from_span: f32,
        to_span: f32,
        #[serde(default = "default_pinch_ms")]
        duration_ms: u64,
        #[serde(default = "default_steps")]
        steps: u32,
    },
    Wait {
        ms: u64,
    },
    Resize {
        width: i32,
        height: i32,
    },
    GoForward,
    GoBackward,
    ResetHits,
    SetError,
    DarkMode {
        enabled: bool,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Tap { .. } => "tap",
            Step::LongPress { .. } => "long_press",
            Step::Drag { .. } => "drag",
            Step::Fling { .. } => "fling",
            Step::Pinch { .. } => "pinch",
            Step::Wait { .. } => "wait",
            Step::Resize { .. } => "resize",
            Step::GoForward => "go_forward",
            Step::GoBackward => "go_backward",
            Step::ResetHits => "reset_hits",
            Step::SetError => "set_error",
            Step::DarkMode { .. } => "dark_mode",
        }
    }

    fn validate(&self, index: usize) -> Result<(), ScriptError> {
        let invalid = |reason: &str| ScriptError::InvalidStep {
            index,
            op: self.name(),
            reason: reason.to_string(),
        };
        match self {
            Step::Drag { steps, .. } | Step::Fling { steps, .. } if *steps == 0 => {
                Err(invalid("steps must be at least 1"))
            }
            Step::Pinch {
                from_span,
                to_span,
                steps,
                ..
            } => {
                if *steps == 0 {
                    Err(invalid("steps must be at least 1"))
                } else if *from_span <= 0.0 || *to_span <= 0.0 {
                    Err(invalid("spans must be positive"))
                } else {
                    Ok(())
                }
            }
            Step::Resize { width, height } if *width <= 0 || *height <= 0 => {
                Err(invalid("size must be positive"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Script {
    /// Interval between animation frames
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_yaml(content: &str) -> Result<Self, ScriptError> {
        let script: Script = serde_yaml::from_str(content).map_err(|source| ScriptError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let script: Script = serde_yaml::from_str(&content).map_err(|source| ScriptError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        script.validate()?;
        debug!("Loaded script {path:?} with {} steps", script.steps.len());
        Ok(script)
    }

    fn validate(&self) -> Result<(), ScriptError> {
        if self.frame_ms == 0 {
            return Err(ScriptError::InvalidStep {
                index: 0,
                op: "frame_ms",
                reason: "frame interval must be positive".to_string(),
            });
        }
        for (index, step) in self.steps.iter().enumerate() {
            step.validate(index)?;
        }
        Ok(())
    }
}

/// Plays steps against a view, drawing frames until each step settles
pub struct ScriptRunner<'v, 'l> {
    view: &'v PageView<'l>,
    clock: Arc<ManualClock>,
    frame_ms: u64,
    frames: usize,
}

impl<'v, 'l> ScriptRunner<'v, 'l> {
    /// `clock` must be the one the view was built with
    pub fn new(view: &'v PageView<'l>, clock: Arc<ManualClock>) -> Self {
        Self {
            view,
            clock,
            frame_ms: default_frame_ms(),
            frames: 0,
        }
    }

    /// Frames drawn so far
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Run every step. `frame` draws one frame and returns whether an
    /// animation is still running.
    pub fn run<F>(&mut self, script: &Script, mut frame: F)
    where
        F: FnMut(&PageView<'l>) -> bool,
    {
        self.frame_ms = script.frame_ms;
        for (index, step) in script.steps.iter().enumerate() {
            debug!("Step {index}: {step:?}");
            self.step(step, &mut frame);
            self.settle(&mut frame);
        }
    }

    fn step<F>(&mut self, step: &Step, frame: &mut F)
    where
        F: FnMut(&PageView<'l>) -> bool,
    {
        let view = self.view;
        match *step {
            Step::Tap { x, y, duration_ms } => {
                let t = self.clock.now_ms();
                self.feed(&MotionEvent::single(MotionAction::Down, t, x, y));
                self.feed(&MotionEvent::single(MotionAction::Up, t + duration_ms, x, y));
            }
            Step::LongPress { x, y, hold_ms } => {
                let t = self.clock.now_ms();
                self.feed(&MotionEvent::single(MotionAction::Down, t, x, y));
                self.wait(hold_ms, frame);
                let up = self.clock.now_ms();
                self.feed(&MotionEvent::single(MotionAction::Up, up, x, y));
            }
            Step::Drag {
                from,
                to,
                duration_ms,
                steps,
            } => self.swipe(from, to, duration_ms, steps, true),
            Step::Fling {
                from,
                to,
                duration_ms,
                steps,
            } => self.swipe(from, to, duration_ms, steps, false),
            Step::Pinch {
                center,
                from_span,
                to_span,
                duration_ms,
                steps,
            } => self.pinch(center, from_span, to_span, duration_ms, steps),
            Step::Wait { ms } => self.wait(ms, frame),
            Step::Resize { width, height } => view.on_size_changed(width, height),
            Step::GoForward => view.go_forward(),
            Step::GoBackward => view.go_backward(),
            Step::ResetHits => view.reset_hits(),
            Step::SetError => view.set_error(),
            Step::DarkMode { enabled } => view.set_dark_mode(enabled),
        }
    }

    fn feed(&mut self, event: &MotionEvent) {
        self.clock.set(event.time_ms.max(self.clock.now_ms()));
        trace!("{:?} at {}ms", event.action, event.time_ms);
        self.view.on_touch_event(event);
    }

    /// Straight-line single finger movement. With `hold` the finger rests
    /// at the end long enough for its velocity to decay before lifting.
    fn swipe(&mut self, from: PointF, to: PointF, duration_ms: u64, steps: u32, hold: bool) {
        let start = self.clock.now_ms();
        self.feed(&MotionEvent::single(MotionAction::Down, start, from.x, from.y));
        let mut last = start;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            last = start + duration_ms * u64::from(i) / u64::from(steps);
            self.feed(&MotionEvent::single(
                MotionAction::Move,
                last,
                from.x + (to.x - from.x) * t,
                from.y + (to.y - from.y) * t,
            ));
        }
        if hold {
            // Outside the velocity window, so the release carries no speed.
            last += 150;
            self.feed(&MotionEvent::single(MotionAction::Move, last, to.x, to.y));
        }
        self.feed(&MotionEvent::single(MotionAction::Up, last, to.x, to.y));
    }

    fn pinch(&mut self, center: PointF, from_span: f32, to_span: f32, duration_ms: u64, steps: u32) {
        let pair = |action, t, span: f32| {
            MotionEvent::new(
                action,
                t,
                vec![
                    Pointer::new(0, center.x - span / 2.0, center.y),
                    Pointer::new(1, center.x + span / 2.0, center.y),
                ],
            )
        };

        let start = self.clock.now_ms();
        self.feed(&MotionEvent::single(
            MotionAction::Down,
            start,
            center.x - from_span / 2.0,
            center.y,
        ));
        self.feed(&pair(MotionAction::PointerDown(1), start, from_span));

        let mut last = start;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            last = start + duration_ms * u64::from(i) / u64::from(steps);
            self.feed(&pair(MotionAction::Move, last, from_span + (to_span - from_span) * t));
        }

        // Let the fingers rest so lifting them does not fling the page.
        last += 150;
        self.feed(&pair(MotionAction::Move, last, to_span));
        self.feed(&pair(MotionAction::PointerUp(1), last, to_span));
        self.feed(&MotionEvent::single(
            MotionAction::Up,
            last,
            center.x - to_span / 2.0,
            center.y,
        ));
    }

    /// Let time pass one frame at a time, delivering due gesture timers
    fn wait<F>(&mut self, ms: u64, frame: &mut F)
    where
        F: FnMut(&PageView<'l>) -> bool,
    {
        let end = self.clock.now_ms() + ms;
        while self.clock.now_ms() < end {
            let step = self.frame_ms.min(end - self.clock.now_ms());
            self.clock.advance(step);
            self.view.poll_gestures(self.clock.now_ms());
            if self.view.take_redraw_request() {
                frame(self.view);
                self.frames += 1;
            }
        }
    }

    /// Draw until nothing animates any more
    fn settle<F>(&mut self, frame: &mut F)
    where
        F: FnMut(&PageView<'l>) -> bool,
    {
        if !self.view.take_redraw_request() {
            return;
        }
        for _ in 0..MAX_SETTLE_FRAMES {
            self.frames += 1;
            if !frame(self.view) && !self.view.take_redraw_request() {
                return;
            }
            self.clock.advance(self.frame_ms);
        }
        warn!("Animation did not settle within {MAX_SETTLE_FRAMES} frames");
    }
}
