use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{debug, error, info, warn};
use simplelog::{Config, LevelFilter, WriteLogger};

use pageview::canvas::{Argb, RasterCanvas};
use pageview::listener::{Action, ActionListener};
use pageview::overlay::Overlay;
use pageview::panic_handler;
use pageview::script::{Script, ScriptRunner};
use pageview::scroller::ManualClock;
use pageview::settings;
use pageview::{PageBitmap, PageView};

/// Replay touch gestures against rendered document pages
#[derive(Debug, Parser)]
#[command(name = "pageview", version, about)]
struct Cli {
    /// Page images (PNG or JPEG), in reading order
    #[arg(required = true)]
    pages: Vec<PathBuf>,

    /// Link/hit overlay per page, matched to pages by position
    #[arg(long = "overlay")]
    overlays: Vec<PathBuf>,

    /// Gesture script to replay
    #[arg(long)]
    script: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Zoom the page images were rendered at
    #[arg(long, default_value_t = 1.0)]
    zoom: f32,

    /// Start on this page (1-based)
    #[arg(long, default_value_t = 1)]
    start_page: usize,

    /// Invert page colors
    #[arg(long)]
    dark: bool,

    /// Settings file instead of the one in the user config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the last frame
    #[arg(long, short, default_value = "frame.png")]
    output: PathBuf,

    #[arg(long, default_value = "pageview.log")]
    log_file: PathBuf,

    /// Log at trace level instead of debug
    #[arg(long, short)]
    verbose: bool,
}

struct PageSource {
    image: PathBuf,
    overlay: Option<PathBuf>,
}

/// Stands in for the document side: logs every intent and turns pages
struct DocumentHost {
    pages: Vec<PageSource>,
    zoom: f32,
    current: Mutex<usize>,
    pending: Mutex<Vec<Action>>,
}

impl DocumentHost {
    fn record(&self, action: Action) {
        match serde_json::to_string(&action) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("Failed to serialize {action:?}: {e}"),
        }
        info!("Action: {action:?}");
        if matches!(
            action,
            Action::GoForward | Action::GoBackward | Action::GotoPage { .. }
        ) {
            self.pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(action);
        }
    }

    /// Carry out page turns requested since the last call
    fn apply(&self, view: &PageView<'_>) {
        let actions = std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));
        for action in actions {
            let current = *self.current.lock().unwrap_or_else(PoisonError::into_inner);
            let (target, went_back) = match &action {
                Action::GoForward => (current + 1, false),
                Action::GoBackward if current > 0 => (current - 1, true),
                Action::GotoPage { uri } => match page_number(uri) {
                    Some(n) => (n - 1, false),
                    None => {
                        warn!("Unsupported internal link {uri}");
                        continue;
                    }
                },
                _ => continue,
            };
            if target >= self.pages.len() {
                debug!("No page {} to go to", target + 1);
                continue;
            }
            self.show(view, target, went_back);
        }
    }

    fn show(&self, view: &PageView<'_>, index: usize, went_back: bool) {
        let Some(page) = self.pages.get(index) else {
            return;
        };
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = index;
        match load_page(page) {
            Ok((bitmap, overlay)) => {
                info!("Showing page {} from {:?}", index + 1, page.image);
                let (links, uris, hits) = overlay.into_parts();
                view.set_bitmap(bitmap, self.zoom, went_back, links, uris, hits);
            }
            Err(e) => {
                error!("Failed to load page {}: {e:#}", index + 1);
                view.set_error();
            }
        }
    }
}

impl ActionListener for DocumentHost {
    fn goto_uri(&self, uri: &str) {
        self.record(Action::GotoUri { uri: uri.to_string() });
    }

    fn goto_page(&self, uri: &str) {
        self.record(Action::GotoPage { uri: uri.to_string() });
    }

    fn go_backward(&self) {
        self.record(Action::GoBackward);
    }

    fn go_forward(&self) {
        self.record(Action::GoForward);
    }

    fn toggle_ui(&self) {
        self.record(Action::ToggleUi);
    }

    fn on_page_view_size_changed(&self, width: i32, height: i32) {
        self.record(Action::SizeChanged { width, height });
    }

    fn on_page_view_zoom_changed(&self, scale: f32) {
        self.record(Action::ZoomChanged { scale });
    }
}

fn load_page(page: &PageSource) -> Result<(PageBitmap, Overlay)> {
    let bitmap = PageBitmap::open(&page.image)
        .with_context(|| format!("Failed to open page image {:?}", page.image))?;
    let overlay = match &page.overlay {
        Some(path) => Overlay::load(path)?,
        None => Overlay::default(),
    };
    Ok((bitmap, overlay))
}

/// `#page=N` style targets, 1-based
fn page_number(uri: &str) -> Option<usize> {
    let n: usize = uri.strip_prefix("#page=")?.split('&').next()?.parse().ok()?;
    (n > 0).then_some(n)
}

fn load_settings(path: Option<&Path>) {
    match path {
        Some(path) => {
            if !settings::load_settings_from_path(path) {
                warn!("Using default settings");
            }
        }
        None => settings::load_settings(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    };
    WriteLogger::init(level, Config::default(), File::create(&cli.log_file)?)?;
    panic_handler::initialize_panic_handler();

    info!("Starting pageview with {} pages", cli.pages.len());

    if cli.width == 0 || cli.height == 0 {
        bail!("Viewport must not be empty ({}x{})", cli.width, cli.height);
    }
    if !(cli.zoom.is_finite() && cli.zoom > 0.0) {
        bail!("Zoom must be positive, got {}", cli.zoom);
    }
    if cli.start_page == 0 || cli.start_page > cli.pages.len() {
        bail!("Start page {} out of range 1..={}", cli.start_page, cli.pages.len());
    }

    load_settings(cli.config.as_deref());
    let mut config = settings::get_view_config();
    config.dark_mode |= cli.dark;

    let script = cli
        .script
        .as_deref()
        .map(Script::load)
        .transpose()
        .context("Failed to load gesture script")?;

    let mut overlays = cli.overlays.into_iter();
    let host = DocumentHost {
        pages: cli
            .pages
            .into_iter()
            .map(|image| PageSource {
                image,
                overlay: overlays.next(),
            })
            .collect(),
        zoom: cli.zoom,
        current: Mutex::new(0),
        pending: Mutex::new(Vec::new()),
    };

    let clock = Arc::new(ManualClock::new(0));
    let view = PageView::with_clock(config, clock.clone()).with_listener(&host);
    view.on_size_changed(cli.width as i32, cli.height as i32);
    host.show(&view, cli.start_page - 1, false);

    let background = if config.dark_mode {
        Argb::new(255, 32, 32, 32)
    } else {
        Argb::new(255, 224, 224, 224)
    };
    let mut canvas = RasterCanvas::new(cli.width, cli.height, background);
    let mut frame = |v: &PageView<'_>| {
        host.apply(v);
        canvas.clear(background);
        v.on_draw(&mut canvas)
    };

    match &script {
        Some(script) => {
            let mut runner = ScriptRunner::new(&view, clock);
            runner.run(script, &mut frame);
            info!("Script finished after {} frames", runner.frames());
        }
        None => {
            frame(&view);
        }
    }
    // Final frame reflects any page turn requested by the last step.
    frame(&view);

    canvas
        .save(&cli.output)
        .with_context(|| format!("Failed to write {:?}", cli.output))?;
    info!("Final state: {:?}", view.snapshot());
    info!("Wrote {:?}", cli.output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_numbers_from_fragments() {
        assert_eq!(page_number("#page=3"), Some(3));
        assert_eq!(page_number("#page=12&zoom=50"), Some(12));
        assert_eq!(page_number("#page=0"), None);
        assert_eq!(page_number("#nameddest=intro"), None);
        assert_eq!(page_number("https://example.com/#page=2"), None);
    }
}
