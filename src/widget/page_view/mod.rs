//! Zoomable, pannable view of one rendered document page
//!
//! [`PageView`] owns the page bitmap and its transform, turns pointer input
//! into pan, fling, pinch-zoom, tap and long-press semantics, and draws the
//! page with link and search-hit overlays onto a [`Canvas`].
//!
//! All entry points take `&self`. State changes are serialized by one lock;
//! listener callbacks run after that lock is released, so a listener may
//! call back into the view (typically `set_bitmap` or `set_error` after a
//! page turn). Listeners must not feed touch events back in from a
//! callback.

mod gestures;
mod navigation;
mod rendering;
mod state;
mod types;

pub use types::{ContentState, ERROR_MARK_EXTENT, ERROR_STROKE_WIDTH, ViewConfig, ViewSnapshot};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::bitmap::PageBitmap;
use crate::canvas::Canvas;
use crate::geometry::{Quad, Rect};
use crate::inputs::{GestureDetector, MotionEvent, ScaleGestureDetector};
use crate::link::{SchemeClassifier, UriClassifier};
use crate::listener::{Action, ActionListener};
use crate::scroller::{Clock, MonotonicClock};

use gestures::GestureSink;
use state::ViewState;

struct Recognizers {
    gestures: GestureDetector,
    scale: ScaleGestureDetector,
}

pub struct PageView<'l> {
    state: Mutex<ViewState>,
    recognizers: Mutex<Recognizers>,
    listener: Option<&'l dyn ActionListener>,
    classifier: Box<dyn UriClassifier>,
}

impl<'l> PageView<'l> {
    pub fn new(config: ViewConfig) -> Self {
        Self::with_clock(config, Arc::new(MonotonicClock::new()))
    }

    /// View whose animations follow `clock`
    pub fn with_clock(config: ViewConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            recognizers: Mutex::new(Recognizers {
                gestures: GestureDetector::new(config.gestures),
                scale: ScaleGestureDetector::new(config.gestures),
            }),
            state: Mutex::new(ViewState::new(config, clock)),
            listener: None,
            classifier: Box::new(SchemeClassifier),
        }
    }

    #[must_use]
    pub fn with_listener(mut self, listener: &'l dyn ActionListener) -> Self {
        self.listener = Some(listener);
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Box<dyn UriClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn set_action_listener(&mut self, listener: &'l dyn ActionListener) {
        self.listener = Some(listener);
    }

    fn lock_state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` under the state lock, then deliver whatever it queued
    fn update<R>(&self, f: impl FnOnce(&mut ViewState, &mut Vec<Action>) -> R) -> R {
        let mut actions = Vec::new();
        let result = {
            let mut state = self.lock_state();
            f(&mut state, &mut actions)
        };
        if let Some(listener) = self.listener {
            for action in &actions {
                action.dispatch(listener);
            }
        }
        result
    }

    pub fn set_error(&self) {
        self.update(|s, _| s.set_error());
    }

    /// Replace the page. `links` and `link_uris` are paired by index and,
    /// like `hits`, given in unscaled page coordinates.
    pub fn set_bitmap(
        &self,
        bitmap: PageBitmap,
        zoom: f32,
        went_back: bool,
        links: Vec<Rect>,
        link_uris: Vec<String>,
        hits: Option<Vec<Vec<Quad>>>,
    ) {
        self.update(|s, _| s.set_bitmap(bitmap, zoom, went_back, links, link_uris, hits));
    }

    pub fn reset_hits(&self) {
        self.update(|s, _| s.reset_hits());
    }

    pub fn on_size_changed(&self, width: i32, height: i32) {
        self.update(|s, actions| s.resize(width, height, actions));
    }

    pub fn set_dark_mode(&self, dark: bool) {
        self.update(|s, _| s.set_dark_mode(dark));
    }

    /// Feed one pointer event to both recognizers
    pub fn on_touch_event(&self, event: &MotionEvent) -> bool {
        let mut recognizers = self.recognizers.lock().unwrap_or_else(PoisonError::into_inner);
        let mut sink = GestureSink(self);
        recognizers.gestures.on_touch_event(event, &mut sink);
        recognizers.scale.on_touch_event(event, &mut sink);
        true
    }

    /// Deliver show-press and long-press callbacks that came due without a
    /// new input event
    pub fn poll_gestures(&self, now_ms: u64) {
        let mut recognizers = self.recognizers.lock().unwrap_or_else(PoisonError::into_inner);
        recognizers.gestures.poll(now_ms, &mut GestureSink(self));
    }

    pub fn on_down(&self) -> bool {
        self.update(|s, _| s.stop_animation());
        true
    }

    /// Pressed state feedback is left to the host
    pub fn on_show_press(&self) {}

    pub fn on_long_press(&self) {
        self.update(|s, _| s.toggle_links());
    }

    pub fn on_single_tap_up(&self, x: f32, y: f32) -> bool {
        let classifier = self.classifier.as_ref();
        self.update(|s, actions| s.tap(x, y, classifier, actions));
        true
    }

    pub fn on_scroll(&self, distance_x: f32, distance_y: f32) -> bool {
        self.update(|s, _| s.scroll_by(distance_x, distance_y));
        true
    }

    pub fn on_fling(&self, velocity_x: f32, velocity_y: f32) -> bool {
        self.update(|s, _| s.fling(velocity_x, velocity_y));
        true
    }

    pub fn on_scale(&self, focus_x: f32, focus_y: f32, factor: f32) -> bool {
        self.update(|s, _| s.scale(focus_x, focus_y, factor));
        true
    }

    pub fn on_scale_begin(&self) -> bool {
        true
    }

    pub fn on_scale_end(&self) {
        self.update(|s, actions| s.zoom_finished(actions));
    }

    /// Step back one viewport, one column, or to the previous page
    pub fn go_backward(&self) {
        self.update(|s, actions| s.go_backward(actions));
    }

    /// Step forward one viewport, one column, or to the next page
    pub fn go_forward(&self) {
        self.update(|s, actions| s.go_forward(actions));
    }

    /// Draw a frame. Returns `true` while a scroll animation is running;
    /// the host should draw again on its next frame.
    pub fn on_draw<C: Canvas + ?Sized>(&self, canvas: &mut C) -> bool {
        self.lock_state().draw(canvas)
    }

    /// Whether anything changed since the last call that needs a redraw
    pub fn take_redraw_request(&self) -> bool {
        self.lock_state().take_redraw()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.lock_state().snapshot()
    }

    pub fn view_scale(&self) -> f32 {
        self.lock_state().view_scale
    }

    pub fn page_scale(&self) -> f32 {
        self.lock_state().page_scale
    }

    pub fn scroll(&self) -> (i32, i32) {
        let s = self.lock_state();
        (s.scroll_x, s.scroll_y)
    }

    pub fn bitmap_size(&self) -> (i32, i32) {
        let s = self.lock_state();
        (s.bitmap_w, s.bitmap_h)
    }

    pub fn canvas_size(&self) -> (i32, i32) {
        let s = self.lock_state();
        (s.canvas_w, s.canvas_h)
    }

    pub fn has_error(&self) -> bool {
        self.lock_state().error
    }

    pub fn has_bitmap(&self) -> bool {
        self.lock_state().bitmap.is_some()
    }

    pub fn links_visible(&self) -> bool {
        self.lock_state().show_links
    }
}

impl std::fmt::Debug for PageView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageView")
            .field("state", &self.snapshot())
            .field("has_listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}
