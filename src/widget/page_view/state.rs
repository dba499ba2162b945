//! Page view state
//!
//! Everything the view knows lives in [`ViewState`]: the owned page bitmap,
//! its display transform, the overlays and the inertial scroller. The
//! operations here are plain field arithmetic; listener calls are pushed as
//! [`Action`]s into a caller-provided queue so the owner can dispatch them
//! after releasing its lock.

use std::sync::Arc;

use log::debug;

use crate::bitmap::PageBitmap;
use crate::canvas::{ColorMatrix, Path};
use crate::geometry::{Quad, Rect};
use crate::listener::Action;
use crate::scroller::{Clock, Scroller};

use super::types::{ContentState, ERROR_MARK_EXTENT, ViewConfig, ViewSnapshot};

pub struct ViewState {
    pub(super) config: ViewConfig,

    pub(super) canvas_w: i32,
    pub(super) canvas_h: i32,

    pub(super) bitmap: Option<PageBitmap>,
    pub(super) bitmap_w: i32,
    pub(super) bitmap_h: i32,
    pub(super) error: bool,

    pub(super) page_scale: f32,
    pub(super) view_scale: f32,
    pub(super) scroll_x: i32,
    pub(super) scroll_y: i32,

    pub(super) links: Vec<Rect>,
    pub(super) link_uris: Vec<String>,
    pub(super) hits: Option<Vec<Vec<Quad>>>,
    pub(super) show_links: bool,

    pub(super) scroller: Scroller,
    /// Inversion filter, present only in dark mode
    pub(super) dark_filter: Option<ColorMatrix>,
    pub(super) error_path: Path,

    redraw: bool,
}

impl ViewState {
    pub fn new(config: ViewConfig, clock: Arc<dyn Clock>) -> Self {
        let mut error_path = Path::new();
        let e = ERROR_MARK_EXTENT;
        error_path.move_to(-e, -e);
        error_path.line_to(e, e);
        error_path.move_to(e, -e);
        error_path.line_to(-e, e);

        Self {
            scroller: Scroller::new(clock, config.scroll_friction),
            dark_filter: config.dark_mode.then(ColorMatrix::invert),
            config,
            canvas_w: 0,
            canvas_h: 0,
            bitmap: None,
            bitmap_w: 0,
            bitmap_h: 0,
            error: false,
            page_scale: 1.0,
            view_scale: 1.0,
            scroll_x: 0,
            scroll_y: 0,
            links: Vec::new(),
            link_uris: Vec::new(),
            hits: None,
            show_links: false,
            error_path,
            redraw: false,
        }
    }

    pub fn invalidate(&mut self) {
        self.redraw = true;
    }

    /// Returns whether a redraw was requested since the last call
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    pub fn content(&self) -> ContentState {
        match (&self.bitmap, self.error) {
            (Some(_), _) => ContentState::Page,
            (None, true) => ContentState::Error,
            (None, false) => ContentState::Idle,
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            content: self.content(),
            error: self.error,
            canvas_w: self.canvas_w,
            canvas_h: self.canvas_h,
            bitmap_w: self.bitmap_w,
            bitmap_h: self.bitmap_h,
            scroll_x: self.scroll_x,
            scroll_y: self.scroll_y,
            page_scale: self.page_scale,
            view_scale: self.view_scale,
            show_links: self.show_links,
        }
    }

    pub fn set_error(&mut self) {
        debug!("Page view entering error state");
        self.bitmap = None;
        self.links.clear();
        self.link_uris.clear();
        self.hits = None;
        self.error = true;
        self.scroller.force_finished(true);
        self.invalidate();
    }

    /// Install a freshly rendered page. `zoom` is the scale the renderer
    /// used; when it matches the previous page's, the scroll position is
    /// reset to the start of the page (or its end when going back).
    pub fn set_bitmap(
        &mut self,
        bitmap: PageBitmap,
        zoom: f32,
        went_back: bool,
        links: Vec<Rect>,
        link_uris: Vec<String>,
        hits: Option<Vec<Vec<Quad>>>,
    ) {
        debug!(
            "Installing page bitmap {}x{} at zoom {zoom} ({} links, went_back={went_back})",
            bitmap.width(),
            bitmap.height(),
            links.len()
        );
        // Release the old page before taking the new one.
        self.bitmap = None;
        self.error = false;

        let (native_w, native_h) = (bitmap.width() as f32, bitmap.height() as f32);
        self.bitmap = Some(bitmap);
        self.links = links;
        self.link_uris = link_uris;
        self.hits = hits;
        self.bitmap_w = (native_w * self.view_scale / zoom) as i32;
        self.bitmap_h = (native_h * self.view_scale / zoom) as i32;
        self.scroller.force_finished(true);

        if self.page_scale == zoom {
            if went_back {
                self.scroll_x = self.bitmap_w - self.canvas_w;
                self.scroll_y = self.bitmap_h - self.canvas_h;
            } else {
                self.scroll_x = 0;
                self.scroll_y = 0;
            }
        }
        self.page_scale = zoom;
        self.invalidate();
    }

    pub fn reset_hits(&mut self) {
        self.hits = None;
        self.invalidate();
    }

    pub fn resize(&mut self, width: i32, height: i32, actions: &mut Vec<Action>) {
        debug!("Page view resized to {width}x{height}");
        self.canvas_w = width;
        self.canvas_h = height;
        actions.push(Action::SizeChanged { width, height });
    }

    pub fn set_dark_mode(&mut self, dark: bool) {
        if self.dark_filter.is_some() != dark {
            self.config.dark_mode = dark;
            self.dark_filter = dark.then(ColorMatrix::invert);
            self.invalidate();
        }
    }

    pub fn stop_animation(&mut self) {
        self.scroller.force_finished(true);
    }

    pub fn toggle_links(&mut self) {
        self.show_links = !self.show_links;
        self.invalidate();
    }

    /// Pan by a finger movement; positive distances scroll right/down
    pub fn scroll_by(&mut self, distance_x: f32, distance_y: f32) {
        if self.bitmap.is_none() {
            return;
        }
        // Clamped on the next draw; deltas may pile up until then.
        self.scroll_x = self.scroll_x.saturating_add(distance_x as i32);
        self.scroll_y = self.scroll_y.saturating_add(distance_y as i32);
        self.scroller.force_finished(true);
        self.invalidate();
    }

    /// Start an inertial scroll from a release velocity in px/s. The
    /// content moves with the finger, so the scroll runs against it.
    pub fn fling(&mut self, velocity_x: f32, velocity_y: f32) {
        if self.bitmap.is_none() {
            return;
        }
        let max_x = (self.bitmap_w - self.canvas_w).max(0);
        let max_y = (self.bitmap_h - self.canvas_h).max(0);
        self.scroller.force_finished(true);
        self.scroller.fling(
            self.scroll_x,
            self.scroll_y,
            -velocity_x as i32,
            -velocity_y as i32,
            0,
            max_x,
            0,
            max_y,
        );
        self.invalidate();
    }

    /// Zoom by `factor` keeping the page point under the focus fixed
    pub fn scale(&mut self, focus_x: f32, focus_y: f32, factor: f32) {
        let Some(bitmap) = &self.bitmap else {
            return;
        };
        let (native_w, native_h) = (bitmap.width() as f32, bitmap.height() as f32);

        let page_focus_x = (focus_x + self.scroll_x as f32) / self.view_scale;
        let page_focus_y = (focus_y + self.scroll_y as f32) / self.view_scale;

        self.view_scale = (self.view_scale * factor).clamp(self.config.min_scale, self.config.max_scale);
        self.bitmap_w = (native_w * self.view_scale / self.page_scale) as i32;
        self.bitmap_h = (native_h * self.view_scale / self.page_scale) as i32;
        self.scroll_x = (page_focus_x * self.view_scale - focus_x) as i32;
        self.scroll_y = (page_focus_y * self.view_scale - focus_y) as i32;
        self.scroller.force_finished(true);
        self.invalidate();
    }

    pub fn zoom_finished(&self, actions: &mut Vec<Action>) {
        actions.push(Action::ZoomChanged {
            scale: self.view_scale,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroller::ManualClock;

    fn state() -> ViewState {
        let mut s = ViewState::new(ViewConfig::default(), Arc::new(ManualClock::new(0)));
        s.resize(400, 300, &mut Vec::new());
        s
    }

    fn page(w: u32, h: u32) -> PageBitmap {
        PageBitmap::filled(w, h, [255, 255, 255, 255])
    }

    #[test]
    fn same_zoom_resets_scroll_to_start() {
        let mut s = state();
        s.set_bitmap(page(800, 1000), 1.0, false, vec![], vec![], None);
        s.scroll_x = 123;
        s.scroll_y = 456;
        s.set_bitmap(page(800, 1000), 1.0, false, vec![], vec![], None);
        assert_eq!((s.scroll_x, s.scroll_y), (0, 0));
    }

    #[test]
    fn same_zoom_going_back_lands_on_trailing_edge() {
        let mut s = state();
        s.set_bitmap(page(800, 1000), 1.0, true, vec![], vec![], None);
        assert_eq!((s.scroll_x, s.scroll_y), (400, 700));
    }

    #[test]
    fn new_zoom_keeps_scroll_and_records_page_scale() {
        let mut s = state();
        s.scroll_x = 40;
        s.scroll_y = 50;
        s.set_bitmap(page(1600, 2000), 2.0, true, vec![], vec![], None);
        assert_eq!((s.scroll_x, s.scroll_y), (40, 50));
        assert_eq!(s.page_scale, 2.0);
        assert_eq!((s.bitmap_w, s.bitmap_h), (800, 1000));
    }

    #[test]
    fn logical_size_follows_view_scale() {
        let mut s = state();
        s.view_scale = 1.5;
        s.set_bitmap(page(301, 100), 1.0, false, vec![], vec![], None);
        assert_eq!((s.bitmap_w, s.bitmap_h), (451, 150));
    }

    #[test]
    fn error_and_bitmap_are_exclusive() {
        let mut s = state();
        s.set_bitmap(
            page(10, 10),
            1.0,
            false,
            vec![Rect::new(0.0, 0.0, 1.0, 1.0)],
            vec!["#page=2".into()],
            Some(vec![vec![Quad::default()]]),
        );
        s.set_error();
        assert!(s.bitmap.is_none());
        assert!(s.error);
        assert!(s.links.is_empty() && s.link_uris.is_empty());
        assert!(s.hits.is_none());
        assert_eq!(s.content(), ContentState::Error);

        s.set_bitmap(page(10, 10), 1.0, false, vec![], vec![], None);
        assert!(!s.error);
        assert_eq!(s.content(), ContentState::Page);
    }

    #[test]
    fn scroll_and_fling_need_a_page() {
        let mut s = state();
        s.scroll_by(30.0, 40.0);
        s.fling(1000.0, 1000.0);
        assert_eq!((s.scroll_x, s.scroll_y), (0, 0));
        assert!(s.scroller.is_finished());
        assert!(!s.take_redraw());
    }

    #[test]
    fn scroll_truncates_distances() {
        let mut s = state();
        s.set_bitmap(page(800, 1000), 1.0, false, vec![], vec![], None);
        s.scroll_by(10.9, -3.7);
        assert_eq!((s.scroll_x, s.scroll_y), (10, -3));
    }

    #[test]
    fn piled_up_scrolls_saturate() {
        let mut s = state();
        s.set_bitmap(page(200, 200), 1.0, false, vec![], vec![], None);
        s.scroll_by(2.0e9, -2.0e9);
        s.scroll_by(2.0e9, -2.0e9);
        assert_eq!((s.scroll_x, s.scroll_y), (i32::MAX, i32::MIN));
    }

    #[test]
    fn fling_stays_within_pannable_range() {
        let clock = Arc::new(ManualClock::new(0));
        let mut s = ViewState::new(ViewConfig::default(), clock.clone());
        s.resize(400, 300, &mut Vec::new());
        s.set_bitmap(page(800, 1000), 1.0, false, vec![], vec![], None);
        s.fling(-6000.0, -6000.0);
        assert!(!s.scroller.is_finished());
        assert_eq!(s.scroller.final_x(), 400);
        assert_eq!(s.scroller.final_y(), 700);

        clock.advance(60_000);
        assert!(s.scroller.compute_scroll_offset());
        assert_eq!((s.scroller.curr_x(), s.scroller.curr_y()), (400, 700));
    }

    #[test]
    fn scale_keeps_focus_anchored() {
        let mut s = state();
        s.set_bitmap(page(800, 1000), 1.0, false, vec![], vec![], None);
        s.scroll_x = 100;
        s.scroll_y = 200;

        let (fx, fy) = (150.0, 120.0);
        let page_x = (fx + s.scroll_x as f32) / s.view_scale;
        let page_y = (fy + s.scroll_y as f32) / s.view_scale;

        s.scale(fx, fy, 2.0);
        assert_eq!(s.view_scale, 2.0);
        assert_eq!((s.bitmap_w, s.bitmap_h), (1600, 2000));

        let screen_x = page_x * s.view_scale - s.scroll_x as f32;
        let screen_y = page_y * s.view_scale - s.scroll_y as f32;
        assert!((screen_x - fx).abs() <= 1.0);
        assert!((screen_y - fy).abs() <= 1.0);
    }

    #[test]
    fn scale_is_clamped() {
        let mut s = state();
        s.set_bitmap(page(100, 100), 1.0, false, vec![], vec![], None);
        s.scale(0.0, 0.0, 100.0);
        assert_eq!(s.view_scale, 8.0);
        s.scale(0.0, 0.0, 0.001);
        assert_eq!(s.view_scale, 1.0);
    }

    #[test]
    fn dark_mode_filter_is_cached() {
        let mut s = state();
        assert!(s.dark_filter.is_none());
        s.set_dark_mode(true);
        assert_eq!(s.dark_filter, Some(ColorMatrix::invert()));
        assert!(s.take_redraw());
        s.set_dark_mode(true);
        assert!(!s.take_redraw());
        s.set_dark_mode(false);
        assert!(s.dark_filter.is_none());
    }

    #[test]
    fn resize_reports_new_size() {
        let mut s = state();
        let mut actions = Vec::new();
        s.resize(640, 480, &mut actions);
        assert_eq!(
            actions,
            vec![Action::SizeChanged {
                width: 640,
                height: 480
            }]
        );
        assert_eq!((s.canvas_w, s.canvas_h), (640, 480));
    }
}
