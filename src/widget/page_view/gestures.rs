//! Bridges the recognizers' callbacks onto the view

use crate::inputs::{MotionEvent, OnGestureListener, OnScaleGestureListener, ScaleState};

use super::PageView;

/// Recognizer listener borrowing the view for one event
pub(super) struct GestureSink<'a, 'l>(pub(super) &'a PageView<'l>);

impl OnGestureListener for GestureSink<'_, '_> {
    fn on_down(&mut self, _e: &MotionEvent) -> bool {
        self.0.on_down()
    }

    fn on_show_press(&mut self, _e: &MotionEvent) {
        self.0.on_show_press();
    }

    fn on_single_tap_up(&mut self, e: &MotionEvent) -> bool {
        self.0.on_single_tap_up(e.x(), e.y())
    }

    fn on_scroll(
        &mut self,
        _down: &MotionEvent,
        _current: &MotionEvent,
        distance_x: f32,
        distance_y: f32,
    ) -> bool {
        self.0.on_scroll(distance_x, distance_y)
    }

    fn on_long_press(&mut self, _e: &MotionEvent) {
        self.0.on_long_press();
    }

    fn on_fling(
        &mut self,
        _down: &MotionEvent,
        _up: &MotionEvent,
        velocity_x: f32,
        velocity_y: f32,
    ) -> bool {
        self.0.on_fling(velocity_x, velocity_y)
    }
}

impl OnScaleGestureListener for GestureSink<'_, '_> {
    fn on_scale_begin(&mut self, _detector: &ScaleState) -> bool {
        self.0.on_scale_begin()
    }

    fn on_scale(&mut self, detector: &ScaleState) -> bool {
        self.0.on_scale(detector.focus_x, detector.focus_y, detector.scale_factor())
    }

    fn on_scale_end(&mut self, _detector: &ScaleState) {
        self.0.on_scale_end();
    }
}
