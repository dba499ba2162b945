//! Two-finger pinch recognition

use log::trace;

use super::GestureConfig;
use super::motion::{MotionAction, MotionEvent};

/// Receiver of pinch gestures
pub trait OnScaleGestureListener {
    /// Return `false` to ignore this pinch entirely
    fn on_scale_begin(&mut self, detector: &ScaleState) -> bool;
    /// Return `true` once the factor has been applied, so the next factor is
    /// relative to the current span
    fn on_scale(&mut self, detector: &ScaleState) -> bool;
    fn on_scale_end(&mut self, detector: &ScaleState);
}

/// Geometry of the pinch in progress
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScaleState {
    pub focus_x: f32,
    pub focus_y: f32,
    pub current_span: f32,
    pub previous_span: f32,
    pub time_ms: u64,
}

impl ScaleState {
    /// Ratio of the current span to the span at the last applied update
    #[must_use]
    pub fn scale_factor(&self) -> f32 {
        if self.previous_span > 0.0 {
            self.current_span / self.previous_span
        } else {
            1.0
        }
    }
}

#[derive(Debug)]
pub struct ScaleGestureDetector {
    config: GestureConfig,
    state: ScaleState,
    initial_span: f32,
    in_progress: bool,
}

impl ScaleGestureDetector {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: ScaleState::default(),
            initial_span: 0.0,
            in_progress: false,
        }
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    #[must_use]
    pub fn state(&self) -> &ScaleState {
        &self.state
    }

    fn span_slop(&self) -> f32 {
        self.config.touch_slop * 2.0
    }

    pub fn on_touch_event<L: OnScaleGestureListener + ?Sized>(
        &mut self,
        ev: &MotionEvent,
        listener: &mut L,
    ) -> bool {
        self.state.time_ms = ev.time_ms;
        let stream_complete = matches!(ev.action, MotionAction::Up | MotionAction::Cancel);

        if ev.action == MotionAction::Down || stream_complete {
            if self.in_progress {
                listener.on_scale_end(&self.state);
                self.in_progress = false;
                self.initial_span = 0.0;
            }
            if stream_complete {
                return true;
            }
        }

        let config_changed = matches!(
            ev.action,
            MotionAction::Down | MotionAction::PointerDown(_) | MotionAction::PointerUp(_)
        );

        let skip = match ev.action {
            MotionAction::PointerUp(idx) => Some(idx),
            _ => None,
        };
        let (focus_x, focus_y) = ev.focus(skip);
        let span = Self::span(ev, skip, focus_x, focus_y);

        let was_in_progress = self.in_progress;
        self.state.focus_x = focus_x;
        self.state.focus_y = focus_y;

        if self.in_progress && (span < self.config.min_scaling_span || config_changed) {
            listener.on_scale_end(&self.state);
            self.in_progress = false;
            self.initial_span = span;
        }

        if config_changed {
            self.state.previous_span = span;
            self.state.current_span = span;
            self.initial_span = span;
        }

        let pointers = ev
            .pointer_count()
            .saturating_sub(usize::from(skip.is_some()));
        if !self.in_progress
            && pointers >= 2
            && span >= self.config.min_scaling_span
            && (was_in_progress || (span - self.initial_span).abs() > self.span_slop())
        {
            self.state.previous_span = span;
            self.state.current_span = span;
            self.in_progress = listener.on_scale_begin(&self.state);
            trace!("pinch begin span={span:.1} accepted={}", self.in_progress);
        }

        if ev.action == MotionAction::Move {
            self.state.current_span = span;
            if self.in_progress && listener.on_scale(&self.state) {
                self.state.previous_span = self.state.current_span;
            }
        }

        true
    }

    /// Twice the mean absolute deviation from the focus, combined over both
    /// axes
    fn span(ev: &MotionEvent, skip: Option<usize>, focus_x: f32, focus_y: f32) -> f32 {
        let mut dev_x = 0.0;
        let mut dev_y = 0.0;
        let mut count = 0usize;
        for (idx, p) in ev.pointers.iter().enumerate() {
            if Some(idx) == skip {
                continue;
            }
            dev_x += (p.x - focus_x).abs();
            dev_y += (p.y - focus_y).abs();
            count += 1;
        }
        if count == 0 {
            return 0.0;
        }
        let span_x = dev_x / count as f32 * 2.0;
        let span_y = dev_y / count as f32 * 2.0;
        span_x.hypot(span_y)
    }
}
