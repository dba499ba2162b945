//! Page-turn navigation and tap routing
//!
//! A page larger than the viewport is read in columns: forward steps go down
//! the current column, then jump to the top of the next column to the
//! right. Only when the bottom-right corner is already visible does a
//! forward step leave the page. Backward steps mirror this.

use log::debug;

use crate::link::UriClassifier;
use crate::listener::Action;

use super::state::ViewState;

impl ViewState {
    fn step(&self, extent: i32) -> i32 {
        extent * self.config.page_step_percent / 100
    }

    pub fn go_backward(&mut self, actions: &mut Vec<Action>) {
        self.scroller.force_finished(true);
        if self.scroll_y <= 0 {
            if self.scroll_x <= 0 {
                debug!("At start of page, going to previous page");
                actions.push(Action::GoBackward);
                return;
            }
            let dx = -self.step(self.canvas_w);
            let dy = (self.bitmap_h - self.canvas_h).saturating_sub(self.scroll_y);
            self.scroller.start_scroll(
                self.scroll_x,
                self.scroll_y,
                dx,
                dy,
                self.config.column_change_ms,
            );
        } else {
            let dy = -self.step(self.canvas_h);
            self.scroller.start_scroll(
                self.scroll_x,
                self.scroll_y,
                0,
                dy,
                self.config.column_scroll_ms,
            );
        }
        self.invalidate();
    }

    pub fn go_forward(&mut self, actions: &mut Vec<Action>) {
        self.scroller.force_finished(true);
        if self.scroll_y.saturating_add(self.canvas_h) >= self.bitmap_h {
            if self.scroll_x.saturating_add(self.canvas_w) >= self.bitmap_w {
                debug!("At end of page, going to next page");
                actions.push(Action::GoForward);
                return;
            }
            let dx = self.step(self.canvas_w);
            self.scroller.start_scroll(
                self.scroll_x,
                self.scroll_y,
                dx,
                self.scroll_y.saturating_neg(),
                self.config.column_change_ms,
            );
        } else {
            let dy = self.step(self.canvas_h);
            self.scroller.start_scroll(
                self.scroll_x,
                self.scroll_y,
                0,
                dy,
                self.config.column_scroll_ms,
            );
        }
        self.invalidate();
    }

    /// Index of the first link under the screen point, if links are shown
    pub fn link_at(&self, x: f32, y: f32) -> Option<usize> {
        if !self.show_links {
            return None;
        }
        let dx = if self.bitmap_w <= self.canvas_w {
            (self.bitmap_w - self.canvas_w) / 2
        } else {
            self.scroll_x
        };
        let dy = if self.bitmap_h <= self.canvas_h {
            (self.bitmap_h - self.canvas_h) / 2
        } else {
            self.scroll_y
        };
        let page_x = (x + dx as f32) / self.view_scale;
        let page_y = (y + dy as f32) / self.view_scale;
        self.links.iter().position(|r| r.contains(page_x, page_y))
    }

    /// Follow a link under the tap, otherwise turn or toggle by viewport
    /// third
    pub fn tap(&mut self, x: f32, y: f32, classifier: &dyn UriClassifier, actions: &mut Vec<Action>) {
        let link = self
            .link_at(x, y)
            .and_then(|i| self.link_uris.get(i))
            .cloned();

        match link {
            Some(uri) if classifier.is_external(&uri) => {
                debug!("Tap on external link {uri}");
                actions.push(Action::GotoUri { uri });
            }
            Some(uri) => {
                debug!("Tap on internal link {uri}");
                actions.push(Action::GotoPage { uri });
            }
            None => {
                let a = (self.canvas_w / 3) as f32;
                let b = a * 2.0;
                if x <= a {
                    self.go_backward(actions);
                } else if x >= b {
                    self.go_forward(actions);
                } else {
                    actions.push(Action::ToggleUi);
                }
            }
        }
        self.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bitmap::PageBitmap;
    use crate::geometry::Rect;
    use crate::link::SchemeClassifier;
    use crate::scroller::ManualClock;
    use crate::widget::page_view::ViewConfig;

    fn view(canvas: (i32, i32), page: (u32, u32)) -> (ViewState, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let mut s = ViewState::new(ViewConfig::default(), clock.clone());
        s.resize(canvas.0, canvas.1, &mut Vec::new());
        s.set_bitmap(
            PageBitmap::filled(page.0, page.1, [255; 4]),
            1.0,
            false,
            vec![Rect::new(10.0, 10.0, 50.0, 30.0), Rect::new(100.0, 100.0, 140.0, 120.0)],
            vec!["https://example.com".into(), "#page=7".into()],
            None,
        );
        (s, clock)
    }

    #[test]
    fn tap_thirds_without_links() {
        let (mut s, _) = view((300, 300), (300, 300));
        let mut actions = Vec::new();
        s.tap(10.0, 150.0, &SchemeClassifier, &mut actions);
        s.tap(150.0, 150.0, &SchemeClassifier, &mut actions);
        s.tap(290.0, 150.0, &SchemeClassifier, &mut actions);
        assert_eq!(
            actions,
            vec![Action::GoBackward, Action::ToggleUi, Action::GoForward]
        );
    }

    #[test]
    fn third_boundaries_are_inclusive() {
        let (mut s, _) = view((300, 300), (300, 300));
        let mut actions = Vec::new();
        s.tap(100.0, 0.0, &SchemeClassifier, &mut actions);
        s.tap(100.5, 0.0, &SchemeClassifier, &mut actions);
        s.tap(200.0, 0.0, &SchemeClassifier, &mut actions);
        assert_eq!(
            actions,
            vec![Action::GoBackward, Action::ToggleUi, Action::GoForward]
        );
    }

    #[test]
    fn hidden_links_are_not_hit() {
        let (mut s, _) = view((300, 300), (300, 300));
        let mut actions = Vec::new();
        s.tap(20.0, 20.0, &SchemeClassifier, &mut actions);
        assert_eq!(actions, vec![Action::GoBackward]);
    }

    #[test]
    fn shown_links_dispatch_by_classification() {
        let (mut s, _) = view((300, 300), (300, 300));
        s.toggle_links();
        let mut actions = Vec::new();
        s.tap(20.0, 20.0, &SchemeClassifier, &mut actions);
        s.tap(120.0, 110.0, &SchemeClassifier, &mut actions);
        assert_eq!(
            actions,
            vec![
                Action::GotoUri {
                    uri: "https://example.com".into()
                },
                Action::GotoPage {
                    uri: "#page=7".into()
                },
            ]
        );
    }

    #[test]
    fn link_hit_accounts_for_centering_and_zoom() {
        // 200x200 page centered in a 400x400 viewport sits at (100, 100).
        let (mut s, _) = view((400, 400), (200, 200));
        s.toggle_links();
        assert_eq!(s.link_at(115.0, 115.0), Some(0));
        assert_eq!(s.link_at(15.0, 15.0), None);

        let (mut s, _) = view((100, 100), (400, 400));
        s.toggle_links();
        s.view_scale = 2.0;
        s.bitmap_w = 800;
        s.bitmap_h = 800;
        s.scroll_x = 150;
        s.scroll_y = 150;
        // page (120, 110) -> scaled (240, 220) -> screen (90, 70)
        assert_eq!(s.link_at(90.0, 70.0), Some(1));
    }

    #[test]
    fn forward_walks_column_then_next_column_then_page() {
        let (mut s, clock) = view((100, 100), (200, 150));
        let mut actions = Vec::new();

        s.go_forward(&mut actions);
        assert_eq!((s.scroller.final_x(), s.scroller.final_y()), (0, 90));
        assert_eq!(s.scroller.duration_ms(), 250);
        clock.advance(250);
        s.scroller.compute_scroll_offset();
        s.scroll_x = s.scroller.curr_x();
        s.scroll_y = 50;

        s.go_forward(&mut actions);
        assert_eq!((s.scroller.final_x(), s.scroller.final_y()), (90, 0));
        assert_eq!(s.scroller.duration_ms(), 500);

        s.scroll_x = 100;
        s.scroll_y = 50;
        s.go_forward(&mut actions);
        assert_eq!(actions, vec![Action::GoForward]);
        assert!(s.scroller.is_finished());
    }

    #[test]
    fn backward_mirrors_forward() {
        let (mut s, _) = view((100, 100), (200, 150));
        let mut actions = Vec::new();

        s.scroll_x = 100;
        s.scroll_y = 50;
        s.go_backward(&mut actions);
        assert_eq!((s.scroller.final_x(), s.scroller.final_y()), (100, -40));
        assert_eq!(s.scroller.duration_ms(), 250);

        s.scroll_y = 0;
        s.go_backward(&mut actions);
        assert_eq!((s.scroller.final_x(), s.scroller.final_y()), (10, 50));
        assert_eq!(s.scroller.duration_ms(), 500);

        s.scroll_x = 0;
        s.go_backward(&mut actions);
        assert_eq!(actions, vec![Action::GoBackward]);
    }

    #[test]
    fn tiny_canvas_tap_sends_one_intent() {
        let (mut s, _) = view((2, 2), (2, 2));
        let mut actions = Vec::new();
        s.tap(0.0, 0.0, &SchemeClassifier, &mut actions);
        s.tap(1.0, 0.0, &SchemeClassifier, &mut actions);
        assert_eq!(actions, vec![Action::GoBackward, Action::GoForward]);
    }

    #[test]
    fn turns_survive_unclamped_scroll_extremes() {
        let (mut s, _) = view((100, 100), (300, 300));
        let mut actions = Vec::new();
        s.scroll_x = i32::MAX;
        s.scroll_y = i32::MAX;
        s.go_forward(&mut actions);
        assert_eq!(actions, vec![Action::GoForward]);

        s.scroll_x = 50;
        s.scroll_y = i32::MIN;
        s.go_backward(&mut actions);
        // The backward distance saturates at i32::MAX.
        assert_eq!(s.scroller.final_y(), -1);
        assert!(!s.scroller.is_finished());
    }
}
