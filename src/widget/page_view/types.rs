//! Configuration and snapshot types for the page view

use crate::canvas::Argb;
use crate::inputs::GestureConfig;
use crate::scroller::DEFAULT_FRICTION;

/// Per-view tunables, usually derived from [`crate::settings::Settings`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    /// Page-turn step in percent of the viewport
    pub page_step_percent: i32,
    pub column_scroll_ms: u64,
    pub column_change_ms: u64,
    pub scroll_friction: f32,
    pub dark_mode: bool,
    pub link_color: Argb,
    pub hit_color: Argb,
    pub error_color: Argb,
    pub gestures: GestureConfig,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_scale: 1.0,
            max_scale: 8.0,
            page_step_percent: 90,
            column_scroll_ms: 250,
            column_change_ms: 500,
            scroll_friction: DEFAULT_FRICTION,
            dark_mode: false,
            link_color: Argb::new(32, 0, 0, 255),
            hit_color: Argb::new(32, 255, 0, 0),
            error_color: Argb::new(255, 255, 80, 80),
            gestures: GestureConfig::default(),
        }
    }
}

/// Stroke width of the diagnostic mark
pub const ERROR_STROKE_WIDTH: f32 = 5.0;
/// Half extent of the diagnostic mark around the viewport center
pub const ERROR_MARK_EXTENT: f32 = 100.0;

/// What the view currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentState {
    /// Nothing loaded yet
    Idle,
    /// A page bitmap is installed
    Page,
    /// The last page failed to load
    Error,
}

/// Read-only copy of the transform, for hosts that persist or display it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSnapshot {
    pub content: ContentState,
    pub error: bool,
    pub canvas_w: i32,
    pub canvas_h: i32,
    pub bitmap_w: i32,
    pub bitmap_h: i32,
    pub scroll_x: i32,
    pub scroll_y: i32,
    pub page_scale: f32,
    pub view_scale: f32,
    pub show_links: bool,
}
