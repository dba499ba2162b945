//! Recording doubles for the listener and canvas seams

use std::sync::{Mutex, PoisonError};

use crate::bitmap::PageBitmap;
use crate::canvas::{Canvas, ColorMatrix, Paint, Path};
use crate::geometry::{IntRect, Rect};
use crate::inputs::{MotionAction, MotionEvent};
use crate::listener::{Action, ActionListener};

/// Listener that remembers every call as an [`Action`]
#[derive(Debug, Default)]
pub struct RecordingListener {
    actions: Mutex<Vec<Action>>,
}

impl RecordingListener {
    pub fn actions(&self) -> Vec<Action> {
        self.lock().clone()
    }

    pub fn take(&self) -> Vec<Action> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Action>> {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, action: Action) {
        self.lock().push(action);
    }
}

impl ActionListener for RecordingListener {
    fn goto_uri(&self, uri: &str) {
        self.push(Action::GotoUri { uri: uri.to_string() });
    }

    fn goto_page(&self, uri: &str) {
        self.push(Action::GotoPage { uri: uri.to_string() });
    }

    fn go_backward(&self) {
        self.push(Action::GoBackward);
    }

    fn go_forward(&self) {
        self.push(Action::GoForward);
    }

    fn toggle_ui(&self) {
        self.push(Action::ToggleUi);
    }

    fn on_page_view_size_changed(&self, width: i32, height: i32) {
        self.push(Action::SizeChanged { width, height });
    }

    fn on_page_view_zoom_changed(&self, scale: f32) {
        self.push(Action::ZoomChanged { scale });
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Translate { dx: f32, dy: f32 },
    Bitmap { dst: IntRect, inverted: bool },
    Rect { rect: Rect, paint: Paint },
    Path { path: Path, paint: Paint },
}

/// Canvas that keeps the command stream instead of pixels
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn bitmaps(&self) -> Vec<IntRect> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Bitmap { dst, .. } => Some(*dst),
                _ => None,
            })
            .collect()
    }

    pub fn rects(&self) -> Vec<Rect> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn paths(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Path { .. }))
            .count()
    }
}

impl Canvas for RecordingCanvas {
    fn translate(&mut self, dx: f32, dy: f32) {
        self.commands.push(DrawCommand::Translate { dx, dy });
    }

    fn draw_bitmap(&mut self, _bitmap: &PageBitmap, dst: IntRect, filter: Option<&ColorMatrix>) {
        self.commands.push(DrawCommand::Bitmap {
            dst,
            inverted: filter.is_some_and(|f| *f == ColorMatrix::invert()),
        });
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        self.commands.push(DrawCommand::Rect { rect, paint: *paint });
    }

    fn draw_path(&mut self, path: &Path, paint: &Paint) {
        self.commands.push(DrawCommand::Path {
            path: path.clone(),
            paint: *paint,
        });
    }
}

/// Uniform opaque page of the given size
pub fn blank_page(width: u32, height: u32) -> PageBitmap {
    PageBitmap::filled(width, height, [255, 255, 255, 255])
}

/// Down, moves along a straight line, up; one event every `step_ms`
pub fn drag_events(from: (f32, f32), to: (f32, f32), steps: u32, start_ms: u64, step_ms: u64) -> Vec<MotionEvent> {
    let steps = steps.max(1);
    let mut events = vec![MotionEvent::single(MotionAction::Down, start_ms, from.0, from.1)];
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        events.push(MotionEvent::single(
            MotionAction::Move,
            start_ms + u64::from(i) * step_ms,
            from.0 + (to.0 - from.0) * t,
            from.1 + (to.1 - from.1) * t,
        ));
    }
    events.push(MotionEvent::single(
        MotionAction::Up,
        start_ms + u64::from(steps) * step_ms,
        to.0,
        to.1,
    ));
    events
}
