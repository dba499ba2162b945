//! Frame composition
//!
//! One pass advances the scroller, re-clamps the scroll position and issues
//! the drawing commands for the page and its overlays.

use log::trace;

use crate::canvas::{Canvas, Paint, Path};
use crate::geometry::IntRect;

use super::state::ViewState;
use super::types::ERROR_STROKE_WIDTH;

/// Clamp one axis. Content that fits is centered and unscrolled. Returns
/// the new scroll offset and the content origin on screen.
fn settle_axis(scroll: i32, content: i32, viewport: i32) -> (i32, i32) {
    if content <= viewport {
        (0, (viewport - content) / 2)
    } else {
        let scroll = scroll.clamp(0, content - viewport);
        (scroll, -scroll)
    }
}

impl ViewState {
    /// Advance any running animation and clamp the scroll position.
    /// Returns the content origin and whether the animation continues.
    pub(super) fn settle(&mut self) -> (i32, i32, bool) {
        let animating = self.scroller.compute_scroll_offset();
        if animating {
            self.scroll_x = self.scroller.curr_x();
            self.scroll_y = self.scroller.curr_y();
            trace!("Animating scroll to ({}, {})", self.scroll_x, self.scroll_y);
        }

        let (scroll_x, x) = settle_axis(self.scroll_x, self.bitmap_w, self.canvas_w);
        let (scroll_y, y) = settle_axis(self.scroll_y, self.bitmap_h, self.canvas_h);
        self.scroll_x = scroll_x;
        self.scroll_y = scroll_y;
        (x, y, animating)
    }

    /// Draw one frame. Returns `true` while an animation is running, in
    /// which case another redraw has been requested.
    pub fn draw<C: Canvas + ?Sized>(&mut self, canvas: &mut C) -> bool {
        self.take_redraw();

        if self.bitmap.is_none() {
            if self.error {
                canvas.translate((self.canvas_w / 2) as f32, (self.canvas_h / 2) as f32);
                let paint = Paint::stroke(self.config.error_color, ERROR_STROKE_WIDTH);
                canvas.draw_path(&self.error_path, &paint);
            }
            return false;
        }

        let (x, y, animating) = self.settle();
        if animating {
            self.invalidate();
        }

        let dst = IntRect::new(x, y, x + self.bitmap_w, y + self.bitmap_h);
        if let Some(bitmap) = &self.bitmap {
            canvas.draw_bitmap(bitmap, dst, self.dark_filter.as_ref());
        }

        let (ox, oy) = (x as f32, y as f32);
        if self.show_links {
            let paint = Paint::fill(self.config.link_color);
            for rect in &self.links {
                canvas.draw_rect(rect.transform(self.view_scale, ox, oy), &paint);
            }
        }

        if let Some(hits) = &self.hits {
            let paint = Paint::fill(self.config.hit_color);
            let mut path = Path::new();
            for quad in hits.iter().flatten() {
                let [first, rest @ ..] = quad.outline().map(|p| p.transform(self.view_scale, ox, oy));
                path.rewind();
                path.move_to(first.x, first.y);
                for p in rest {
                    path.line_to(p.x, p.y);
                }
                path.close();
                canvas.draw_path(&path, &paint);
            }
        }

        animating
    }
}
