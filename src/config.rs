//! Persisted widget configuration
//!
//! A flat JSON document at `~/.gif_widget_config.json`. Every key has a default,
//! unknown keys are ignored, and a file that fails to parse is treated as
//! absent so a corrupt config never keeps the widget from starting.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::shared::geometry::DEFAULT_SIZE;
use crate::shared::Rgb;

const CONFIG_FILE_NAME: &str = ".gif_widget_config.json";
const DEFAULT_UPDATE_INTERVAL_S: f64 = 2.0;

/// Persisted settings, one key per user-visible setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Animated image to play
    pub gif_path: Option<String>,
    /// Remembered default position (bottom-right anchor)
    pub default_x: Option<i32>,
    pub default_y: Option<i32>,
    /// Widget size in pixels
    pub width: u32,
    pub height: u32,
    /// Frame interval in milliseconds
    pub speed: u64,
    /// Hide the widget while another application has focus
    pub hide_when_not_desktop: bool,
    pub border_enabled: bool,
    /// One of "solid", "double", "dashed", "gradient"
    pub border_style: String,
    /// Hex color: "#rrggbb"
    pub border_color: String,
    pub border_width: u32,
    /// Catalog preset name, or "Wallpaper Sync"
    pub current_border_name: String,
    pub wallpaper_sync_enabled: bool,
    /// Last color derived from the wallpaper (hex)
    pub wallpaper_dominant_color: String,
    /// Seconds between wallpaper samples
    pub update_interval_s: f64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            gif_path: None,
            default_x: None,
            default_y: None,
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            speed: 100,
            hide_when_not_desktop: true,
            border_enabled: false,
            border_style: "solid".to_string(),
            border_color: "#000000".to_string(),
            border_width: 2,
            current_border_name: "None".to_string(),
            wallpaper_sync_enabled: false,
            wallpaper_dominant_color: "#000000".to_string(),
            update_interval_s: DEFAULT_UPDATE_INTERVAL_S,
        }
    }
}

impl WidgetConfig {
    /// Load configuration from `path`, falling back to defaults if it is
    /// missing or malformed
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            return Self::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read config file {:?}: {}, using defaults", path, e);
                return Self::default();
            }
        };

        match serde_json::from_str::<WidgetConfig>(&content) {
            Ok(config) => {
                info!("Configuration loaded from {:?}", path);
                debug!("Config: {:?}", config);
                config
            }
            Err(e) => {
                warn!("Failed to parse config file {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Write configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, json).context("Failed to write config file")?;

        debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// Default config location in the user's home directory
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(CONFIG_FILE_NAME))
    }

    pub fn border_color(&self) -> Rgb {
        Rgb::from_hex(&self.border_color).unwrap_or(Rgb::BLACK)
    }

    pub fn wallpaper_dominant_color(&self) -> Rgb {
        Rgb::from_hex(&self.wallpaper_dominant_color).unwrap_or(Rgb::BLACK)
    }

    /// Source path, if one is configured and still exists on disk
    pub fn existing_gif_path(&self) -> Option<PathBuf> {
        self.gif_path
            .as_ref()
            .map(PathBuf::from)
            .filter(|path| path.exists())
    }

    /// Wallpaper sampling period; nonsense values fall back to the default
    pub fn update_interval(&self) -> Duration {
        match Duration::try_from_secs_f64(self.update_interval_s) {
            Ok(interval) if !interval.is_zero() => interval,
            _ => Duration::from_secs_f64(DEFAULT_UPDATE_INTERVAL_S),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WidgetConfig::load(&dir.path().join("absent.json"));
        assert_eq!(config, WidgetConfig::default());
        assert_eq!(config.width, 150);
        assert_eq!(config.speed, 100);
        assert!(config.hide_when_not_desktop);
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(WidgetConfig::load(&path), WidgetConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"width": 220, "hide_when_not_desktop": false, "unknown_key": 7}"#,
        )
        .unwrap();

        let config = WidgetConfig::load(&path);
        assert_eq!(config.width, 220);
        assert_eq!(config.height, 150);
        assert!(!config.hide_when_not_desktop);
        assert_eq!(config.current_border_name, "None");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = WidgetConfig {
            gif_path: Some("/tmp/cat.gif".into()),
            border_enabled: true,
            border_color: "#1e90ff".into(),
            current_border_name: "Ocean Blue".into(),
            ..WidgetConfig::default()
        };

        config.save(&path).unwrap();
        let loaded = WidgetConfig::load(&path);
        assert_eq!(loaded, config);
        assert_eq!(loaded.border_color(), Rgb::new(0x1e, 0x90, 0xff));
    }

    #[test]
    fn test_bad_color_falls_back() {
        let config = WidgetConfig {
            border_color: "blue".into(),
            ..WidgetConfig::default()
        };
        assert_eq!(config.border_color(), Rgb::BLACK);
    }

    #[test]
    fn test_update_interval() {
        let mut config = WidgetConfig::default();
        assert_eq!(config.update_interval(), Duration::from_secs(2));
        config.update_interval_s = 0.5;
        assert_eq!(config.update_interval(), Duration::from_millis(500));
        for bad in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            config.update_interval_s = bad;
            assert_eq!(config.update_interval(), Duration::from_secs(2));
        }
    }
}
