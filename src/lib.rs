pub mod bitmap;
pub mod canvas;
pub mod geometry;
pub mod inputs;
pub mod link;
pub mod listener;
pub mod overlay;
pub mod panic_handler;
pub mod script;
pub mod scroller;
pub mod settings;
pub mod widget;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use bitmap::{BitmapError, PageBitmap};
pub use canvas::{Canvas, RasterCanvas};
pub use listener::{Action, ActionListener};
pub use widget::page_view::{PageView, ViewConfig};
