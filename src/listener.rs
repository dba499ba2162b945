//! Navigation intents emitted by the page view
//!
//! The view never navigates by itself. Everything that leaves the current
//! page (links, page turns at the document edge, UI toggles) or that the
//! host may want to persist (viewport size, zoom) goes through an
//! [`ActionListener`].

use serde::Serialize;

/// Sink for navigation intents. Implementations may call back into the
/// view, e.g. render the next page and hand it over with `set_bitmap`.
pub trait ActionListener: Sync {
    /// Open a link that points outside the document
    fn goto_uri(&self, uri: &str);
    /// Follow a link inside the document
    fn goto_page(&self, uri: &str);
    /// Backward page turn past the top-left of the current page
    fn go_backward(&self);
    /// Forward page turn past the bottom-right of the current page
    fn go_forward(&self);
    fn toggle_ui(&self);
    fn on_page_view_size_changed(&self, width: i32, height: i32);
    /// Pinch finished at this view scale
    fn on_page_view_zoom_changed(&self, scale: f32);
}

/// One listener call, captured while the view state is locked and replayed
/// after the lock is released
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    GotoUri { uri: String },
    GotoPage { uri: String },
    GoBackward,
    GoForward,
    ToggleUi,
    SizeChanged { width: i32, height: i32 },
    ZoomChanged { scale: f32 },
}

impl Action {
    pub fn dispatch(&self, listener: &dyn ActionListener) {
        match self {
            Action::GotoUri { uri } => listener.goto_uri(uri),
            Action::GotoPage { uri } => listener.goto_page(uri),
            Action::GoBackward => listener.go_backward(),
            Action::GoForward => listener.go_forward(),
            Action::ToggleUi => listener.toggle_ui(),
            Action::SizeChanged { width, height } => {
                listener.on_page_view_size_changed(*width, *height)
            }
            Action::ZoomChanged { scale } => listener.on_page_view_zoom_changed(*scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Calls(Mutex<Vec<String>>);

    impl ActionListener for Calls {
        fn goto_uri(&self, uri: &str) {
            self.0.lock().unwrap().push(format!("uri:{uri}"));
        }
        fn goto_page(&self, uri: &str) {
            self.0.lock().unwrap().push(format!("page:{uri}"));
        }
        fn go_backward(&self) {
            self.0.lock().unwrap().push("back".into());
        }
        fn go_forward(&self) {
            self.0.lock().unwrap().push("forward".into());
        }
        fn toggle_ui(&self) {
            self.0.lock().unwrap().push("toggle".into());
        }
        fn on_page_view_size_changed(&self, width: i32, height: i32) {
            self.0.lock().unwrap().push(format!("size:{width}x{height}"));
        }
        fn on_page_view_zoom_changed(&self, scale: f32) {
            self.0.lock().unwrap().push(format!("zoom:{scale}"));
        }
    }

    #[test]
    fn dispatch_routes_each_action() {
        let calls = Calls::default();
        for action in [
            Action::GotoUri {
                uri: "https://example.com".into(),
            },
            Action::GotoPage { uri: "#page=4".into() },
            Action::GoBackward,
            Action::GoForward,
            Action::ToggleUi,
            Action::SizeChanged {
                width: 640,
                height: 480,
            },
            Action::ZoomChanged { scale: 2.5 },
        ] {
            action.dispatch(&calls);
        }
        assert_eq!(
            *calls.0.lock().unwrap(),
            vec![
                "uri:https://example.com",
                "page:#page=4",
                "back",
                "forward",
                "toggle",
                "size:640x480",
                "zoom:2.5",
            ]
        );
    }

    #[test]
    fn actions_serialize_with_tag() {
        let json = serde_json::to_string(&Action::SizeChanged {
            width: 10,
            height: 20,
        })
        .unwrap();
        assert_eq!(json, r#"{"action":"size_changed","width":10,"height":20}"#);
        let json = serde_json::to_string(&Action::GoForward).unwrap();
        assert_eq!(json, r#"{"action":"go_forward"}"#);
    }
}
