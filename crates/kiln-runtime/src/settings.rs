//! Application settings file
//!
//! ```json
//! { "title": "Kiln", "screen": { "screen_width": 1280, "screen_height": 720 } }
//! ```
//!
//! Every key is optional. A missing or unreadable file is not fatal: callers
//! use [`Settings::load_or_default`] and carry on with built-in values.

use std::path::Path;

use kiln_core::{KilnError, Result, Size};
use serde::{Deserialize, Serialize};

/// Default location, relative to the working directory
pub const DEFAULT_SETTINGS_PATH: &str = "Settings/Application_Settings.json";

/// Environment variable that overrides [`DEFAULT_SETTINGS_PATH`]
pub const SETTINGS_PATH_ENV: &str = "KILN_SETTINGS";

const DEFAULT_SIZE: Size = Size::new(1280, 720);

/// Initial window size. Signed so that bad values in the file parse and then fall back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenSettings {
    #[serde(default = "default_width")]
    pub screen_width: i32,
    #[serde(default = "default_height")]
    pub screen_height: i32,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            screen_width: default_width(),
            screen_height: default_height(),
        }
    }
}

fn default_width() -> i32 {
    DEFAULT_SIZE.width as i32
}
fn default_height() -> i32 {
    DEFAULT_SIZE.height as i32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub screen: ScreenSettings,
    /// Enter fullscreen right after startup
    #[serde(default)]
    pub fullscreen: bool,
    /// Force user resizes toward the startup aspect ratio
    #[serde(default = "default_true")]
    pub lock_aspect: bool,
    #[serde(default)]
    pub assets_path: Option<String>,
}

fn default_title() -> String {
    "Kiln".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: default_title(),
            screen: ScreenSettings::default(),
            fullscreen: false,
            lock_aspect: true,
            assets_path: None,
        }
    }
}

impl Settings {
    /// Read and parse a settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
            .map_err(|e| KilnError::Settings(format!("failed to parse {}: {}", path.display(), e)))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Like [`load`](Self::load), but logs the failure and returns defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                log::info!("loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("settings {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Settings path from the environment, or the default one
    pub fn default_path() -> String {
        std::env::var(SETTINGS_PATH_ENV).unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string())
    }

    /// Initial logical window size. Non-positive dimensions fall back to 1280x720.
    pub fn screen_size(&self) -> Size {
        let ScreenSettings {
            screen_width,
            screen_height,
        } = self.screen;
        if screen_width <= 0 || screen_height <= 0 {
            return DEFAULT_SIZE;
        }
        Size::new(screen_width as u32, screen_height as u32)
    }
}
