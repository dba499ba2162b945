use std::fs;
use std::sync::Arc;

use pageview::canvas::{Argb, RasterCanvas};
use pageview::geometry::Rect;
use pageview::listener::Action;
use pageview::overlay::Overlay;
use pageview::script::{Script, ScriptRunner};
use pageview::scroller::ManualClock;
use pageview::test_utils::{RecordingCanvas, RecordingListener, blank_page};
use pageview::widget::page_view::{PageView, ViewConfig};

const BACKGROUND: Argb = Argb::new(255, 128, 128, 128);

#[test]
fn long_press_drag_and_dark_mode_render_expected_pixels() {
    let clock = Arc::new(ManualClock::new(0));
    let view = PageView::with_clock(ViewConfig::default(), clock.clone());
    view.on_size_changed(200, 200);
    view.set_bitmap(
        blank_page(400, 400),
        1.0,
        false,
        vec![Rect::new(100.0, 100.0, 200.0, 150.0)],
        vec!["https://mupdf.com".into()],
        None,
    );

    let script = Script::from_yaml(
        r#"
steps:
  - { op: long_press, x: 100, y: 100 }
  - { op: drag, from: [150, 150], to: [50, 50] }
"#,
    )
    .unwrap();

    let mut canvas = RasterCanvas::new(200, 200, BACKGROUND);
    let mut runner = ScriptRunner::new(&view, clock.clone());
    runner.run(&script, |v| {
        canvas.clear(BACKGROUND);
        v.on_draw(&mut canvas)
    });

    assert!(view.links_visible());
    assert_eq!(view.scroll(), (100, 100));
    // Link now sits at (0, 0)..(100, 50) on screen, tinted blue.
    assert_eq!(canvas.image().get_pixel(10, 10).0, [223, 223, 255, 255]);
    assert_eq!(canvas.image().get_pixel(150, 150).0, [255, 255, 255, 255]);

    let dark = Script::from_yaml("steps:\n  - { op: dark_mode, enabled: true }\n").unwrap();
    runner.run(&dark, |v| {
        canvas.clear(BACKGROUND);
        v.on_draw(&mut canvas)
    });
    assert_eq!(canvas.image().get_pixel(150, 150).0, [0, 0, 0, 255]);
    assert_eq!(canvas.image().get_pixel(10, 10).0, [0, 0, 32, 255]);
}

#[test]
fn scripted_taps_reach_the_listener() {
    let listener = RecordingListener::default();
    let clock = Arc::new(ManualClock::new(0));
    let view = PageView::with_clock(ViewConfig::default(), clock.clone()).with_listener(&listener);
    view.on_size_changed(300, 300);
    view.set_bitmap(blank_page(300, 300), 1.0, false, vec![], vec![], None);

    let script = Script::from_yaml(
        r#"
steps:
  - { op: tap, x: 20, y: 150 }
  - { op: tap, x: 150, y: 150 }
  - { op: tap, x: 280, y: 150 }
  - { op: resize, width: 600, height: 300 }
  - op: set_error
  - { op: tap, x: 20, y: 150 }
"#,
    )
    .unwrap();
    ScriptRunner::new(&view, clock).run(&script, |v| v.on_draw(&mut RecordingCanvas::default()));

    assert_eq!(
        listener.actions(),
        vec![
            Action::SizeChanged {
                width: 300,
                height: 300
            },
            Action::GoBackward,
            Action::ToggleUi,
            Action::GoForward,
            Action::SizeChanged {
                width: 600,
                height: 300
            },
            Action::GoBackward,
        ]
    );
    assert!(view.has_error());
}

#[test]
fn overlay_file_drives_link_hits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page1.yaml");
    fs::write(
        &path,
        r##"
links:
  - rect: [0, 0, 50, 50]
    uri: "#page=2"
hits:
  - - { ul: [60, 60], ur: [90, 60], ll: [60, 70], lr: [90, 70] }
"##,
    )
    .unwrap();

    let (links, uris, hits) = Overlay::load(&path).unwrap().into_parts();
    let listener = RecordingListener::default();
    let view = PageView::new(ViewConfig::default()).with_listener(&listener);
    view.on_size_changed(100, 100);
    view.set_bitmap(blank_page(100, 100), 1.0, false, links, uris, hits);
    view.on_long_press();
    view.on_single_tap_up(25.0, 25.0);

    let mut canvas = RecordingCanvas::default();
    view.on_draw(&mut canvas);
    assert_eq!(canvas.rects(), vec![Rect::new(0.0, 0.0, 50.0, 50.0)]);
    assert_eq!(canvas.paths(), 1);

    view.reset_hits();
    let mut canvas = RecordingCanvas::default();
    view.on_draw(&mut canvas);
    assert_eq!(canvas.paths(), 0);

    assert_eq!(
        listener.actions().last(),
        Some(&Action::GotoPage {
            uri: "#page=2".into()
        })
    );
}
