//! User preferences, read from `settings.toml` in the per-user config directory.
//!
//! Every field is optional in the file; missing values take the defaults below.

use crate::camera::{MAX_SCALE, MIN_SCALE};
use crate::error::{Error, Result};
use crate::gesture::GestureSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "SpineViewer";

pub const DEFAULT_CLEAR_COLOR: [f64; 4] = [0.15, 0.15, 0.2, 1.0];
/// Taps right of this x coordinate (in pixels) cycle skins instead of importing.
pub const DEFAULT_SKIN_TAP_THRESHOLD: f32 = 128.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where imported files are kept; the platform default when unset.
    pub storage_dir: Option<PathBuf>,
    pub clear_color: [f64; 4],
    pub skin_tap_threshold: f32,
    pub tap_square_size: f32,
    pub long_press_seconds: f64,
    pub wheel_zoom_step: f32,
    pub pinch_idle_seconds: f64,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for Config {
    fn default() -> Self {
        let gestures = GestureSettings::default();
        Self {
            storage_dir: None,
            clear_color: DEFAULT_CLEAR_COLOR,
            skin_tap_threshold: DEFAULT_SKIN_TAP_THRESHOLD,
            tap_square_size: gestures.tap_square_size,
            long_press_seconds: gestures.long_press_seconds,
            wheel_zoom_step: gestures.wheel_zoom_step,
            pinch_idle_seconds: gestures.pinch_idle_seconds,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
        }
    }
}

impl Config {
    pub fn gesture_settings(&self) -> GestureSettings {
        GestureSettings {
            tap_square_size: self.tap_square_size,
            long_press_seconds: self.long_press_seconds,
            wheel_zoom_step: self.wheel_zoom_step,
            pinch_idle_seconds: self.pinch_idle_seconds,
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

/// Loads the user's config, or the defaults when there is none.
pub fn load() -> Result<Config> {
    if let Some(path) = default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(toml::from_str(&content)?)
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content).map_err(|e| Error::io(path, e))
}
