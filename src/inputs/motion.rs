//! Raw pointer events fed to the gesture recognizers

use serde::{Deserialize, Serialize};

/// What happened in a motion event.
///
/// `PointerDown`/`PointerUp` carry the index (into `pointers`) of the
/// pointer that went down or up while other pointers stayed on the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionAction {
    Down,
    Move,
    Up,
    Cancel,
    PointerDown(usize),
    PointerUp(usize),
}

/// One contact point
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

impl Pointer {
    #[must_use]
    pub const fn new(id: u32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

/// Snapshot of every pointer at one instant
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionEvent {
    pub action: MotionAction,
    pub time_ms: u64,
    pub pointers: Vec<Pointer>,
}

impl MotionEvent {
    pub fn new(action: MotionAction, time_ms: u64, pointers: Vec<Pointer>) -> Self {
        Self {
            action,
            time_ms,
            pointers,
        }
    }

    /// Single-pointer event with pointer id 0
    #[must_use]
    pub fn single(action: MotionAction, time_ms: u64, x: f32, y: f32) -> Self {
        Self::new(action, time_ms, vec![Pointer::new(0, x, y)])
    }

    #[must_use]
    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// X of the first pointer
    #[must_use]
    pub fn x(&self) -> f32 {
        self.pointers.first().map_or(0.0, |p| p.x)
    }

    /// Y of the first pointer
    #[must_use]
    pub fn y(&self) -> f32 {
        self.pointers.first().map_or(0.0, |p| p.y)
    }

    /// Index of the pointer leaving the surface, if this event lifts one
    #[must_use]
    pub fn lifting_index(&self) -> Option<usize> {
        match self.action {
            MotionAction::PointerUp(idx) => Some(idx),
            MotionAction::Up => Some(0),
            _ => None,
        }
    }

    /// Mean position of the pointers, skipping `skip` when given
    #[must_use]
    pub fn focus(&self, skip: Option<usize>) -> (f32, f32) {
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut count = 0usize;
        for (idx, p) in self.pointers.iter().enumerate() {
            if Some(idx) == skip {
                continue;
            }
            sum_x += p.x;
            sum_y += p.y;
            count += 1;
        }
        if count == 0 {
            return (self.x(), self.y());
        }
        (sum_x / count as f32, sum_y / count as f32)
    }
}
