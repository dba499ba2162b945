use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, RwLock};

use crate::canvas::Argb;
use crate::inputs::GestureConfig;
use crate::widget::page_view::ViewConfig;

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "pageview";

/// Host appearance the page is composited for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Appearance {
    #[default]
    Light,
    /// Page colors are inverted (alpha kept) when drawn
    Dark,
}

impl Appearance {
    pub fn is_dark(&self) -> bool {
        matches!(self, Appearance::Dark)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub appearance: Appearance,

    #[serde(default = "default_min_scale")]
    pub min_scale: f32,

    #[serde(default = "default_max_scale")]
    pub max_scale: f32,

    /// Page-turn step as a percentage of the viewport
    #[serde(default = "default_page_step_percent")]
    pub page_step_percent: u32,

    /// Duration of a page-turn step within a column
    #[serde(default = "default_column_scroll_ms")]
    pub column_scroll_ms: u64,

    /// Duration of a page-turn step that moves to the next column
    #[serde(default = "default_column_change_ms")]
    pub column_change_ms: u64,

    #[serde(default = "default_scroll_friction")]
    pub scroll_friction: f32,

    #[serde(default = "default_link_color")]
    pub link_color: Argb,

    #[serde(default = "default_hit_color")]
    pub hit_color: Argb,

    #[serde(default = "default_error_color")]
    pub error_color: Argb,

    #[serde(default)]
    pub gestures: GestureConfig,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_min_scale() -> f32 {
    1.0
}

fn default_max_scale() -> f32 {
    8.0
}

fn default_page_step_percent() -> u32 {
    90
}

fn default_column_scroll_ms() -> u64 {
    250
}

fn default_column_change_ms() -> u64 {
    500
}

fn default_scroll_friction() -> f32 {
    crate::scroller::DEFAULT_FRICTION
}

fn default_link_color() -> Argb {
    Argb::new(32, 0, 0, 255)
}

fn default_hit_color() -> Argb {
    Argb::new(32, 255, 0, 0)
}

fn default_error_color() -> Argb {
    Argb::new(255, 255, 80, 80)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            appearance: Appearance::default(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            page_step_percent: default_page_step_percent(),
            column_scroll_ms: default_column_scroll_ms(),
            column_change_ms: default_column_change_ms(),
            scroll_friction: default_scroll_friction(),
            link_color: default_link_color(),
            hit_color: default_hit_color(),
            error_color: default_error_color(),
            gestures: GestureConfig::default(),
        }
    }
}

impl Settings {
    /// Parameters for one page view, with nonsensical values repaired
    pub fn view_config(&self) -> ViewConfig {
        let min_scale = if self.min_scale.is_finite() && self.min_scale > 0.0 {
            self.min_scale
        } else {
            default_min_scale()
        };
        let max_scale = if self.max_scale.is_finite() {
            self.max_scale.max(min_scale)
        } else {
            default_max_scale().max(min_scale)
        };

        ViewConfig {
            min_scale,
            max_scale,
            page_step_percent: self.page_step_percent.clamp(1, 100) as i32,
            column_scroll_ms: self.column_scroll_ms,
            column_change_ms: self.column_change_ms,
            scroll_friction: self.scroll_friction,
            dark_mode: self.appearance.is_dark(),
            link_color: self.link_color,
            hit_color: self.hit_color,
            error_color: self.error_color,
            gestures: self.gestures,
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        let mut settings: Settings = serde_yaml::from_str(content)?;
        if settings.version < CURRENT_VERSION {
            migrate_settings(&mut settings);
        }
        Ok(settings)
    }
}

static SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::default()));

pub fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

pub fn load_settings() {
    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, using default settings");
        return;
    };
    if path.exists() {
        load_settings_from_path(&path);
    } else {
        info!("Settings file not found, creating with defaults at {path:?}");
        if let Ok(settings) = SETTINGS.read() {
            save_settings_to_file(&settings, &path);
        }
    }
}

/// Replace the global settings with the content of `path`. Read or parse
/// failures are logged and leave the current settings untouched.
pub fn load_settings_from_path(path: &Path) -> bool {
    match fs::read_to_string(path) {
        Ok(content) => match Settings::from_yaml(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {path:?}");
                if let Ok(mut global) = SETTINGS.write() {
                    *global = settings;
                }
                true
            }
            Err(e) => {
                error!("Failed to parse settings file {path:?}: {e}");
                false
            }
        },
        Err(e) => {
            error!("Failed to read settings file {path:?}: {e}");
            false
        }
    }
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );

    // Future migrations go here:
    // if settings.version < 2 {
    //     migrate_v1_to_v2(settings);
    // }

    settings.version = CURRENT_VERSION;
}

pub fn save_settings_to_file(settings: &Settings, path: &Path) {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory {parent:?}: {e}");
                return;
            }
        }
    }

    let content = match serde_yaml::to_string(settings) {
        Ok(yaml) => format!("{SETTINGS_HEADER}{yaml}"),
        Err(e) => {
            error!("Failed to serialize settings: {e}");
            return;
        }
    };

    match fs::write(path, content) {
        Ok(()) => debug!("Saved settings to {path:?}"),
        Err(e) => error!("Failed to save settings to {path:?}: {e}"),
    }
}

const SETTINGS_HEADER: &str = r#"# ============================================================================
# pageview settings
# ============================================================================
# appearance: light | dark (dark inverts page colors)
# min_scale / max_scale: pinch zoom limits relative to the rendered page
# page_step_percent: how much of the viewport one tap-turn scrolls
# colors are #AARRGGBB
# gestures: touch_slop, tap_timeout_ms, long_press_timeout_ms,
#           min_fling_velocity, max_fling_velocity, min_scaling_span

"#;

// Public API for accessing/modifying settings

pub fn get_settings() -> Settings {
    SETTINGS
        .read()
        .map(|s| s.clone())
        .unwrap_or_default()
}

pub fn get_view_config() -> ViewConfig {
    get_settings().view_config()
}
