//! Border style engine
//!
//! Holds the single active [`BorderConfig`]. Operations return an
//! [`ApplyOutcome`] describing what has to be painted; the coordinator owns the
//! surface and the timer wheel and carries it out.

use rand::Rng;
use tracing::{debug, warn};

use super::catalog::{
    self, BorderPreset, BorderStyle, CATALOG, GRADIENT_SPECTRUM, WALLPAPER_SYNC_NAME,
    WALLPAPER_SYNC_WIDTH,
};
use crate::config::WidgetConfig;
use crate::shared::Rgb;

/// Where the active border came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderSource {
    /// A catalog entry
    Preset(&'static str),
    /// Color sampled from the wallpaper under the widget
    WallpaperSync,
}

impl BorderSource {
    pub fn name(self) -> &'static str {
        match self {
            BorderSource::Preset(name) => name,
            BorderSource::WallpaperSync => WALLPAPER_SYNC_NAME,
        }
    }
}

/// Active border configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderConfig {
    pub enabled: bool,
    pub style: BorderStyle,
    pub color: Rgb,
    pub width: u32,
    pub source: BorderSource,
}

impl BorderConfig {
    pub fn from_preset(preset: &BorderPreset) -> Self {
        Self {
            enabled: preset.enabled,
            style: preset.style,
            color: preset.color,
            width: preset.width,
            source: BorderSource::Preset(preset.name),
        }
    }

    /// Rebuild from persisted settings. An unknown preset name resets to the
    /// first catalog entry so the name always matches what is painted.
    pub fn from_widget_config(config: &WidgetConfig) -> Self {
        let source = if config.current_border_name == WALLPAPER_SYNC_NAME {
            BorderSource::WallpaperSync
        } else if let Some(preset) = catalog::find(&config.current_border_name) {
            BorderSource::Preset(preset.name)
        } else {
            warn!(
                "Unknown border preset {:?} in config, falling back to {:?}",
                config.current_border_name, CATALOG[0].name
            );
            return Self::from_preset(&CATALOG[0]);
        };

        Self {
            enabled: config.border_enabled,
            style: BorderStyle::parse(&config.border_style).unwrap_or(BorderStyle::Solid),
            color: config.border_color(),
            width: config.border_width,
            source,
        }
    }

    pub fn write_to(&self, config: &mut WidgetConfig) {
        config.border_enabled = self.enabled;
        config.border_style = self.style.as_str().to_string();
        config.border_color = self.color.to_hex();
        config.border_width = self.width;
        config.current_border_name = self.source.name().to_string();
    }

    pub fn preset_name(&self) -> &'static str {
        self.source.name()
    }

    fn paint(&self) -> BorderPaint {
        BorderPaint {
            style: self.style,
            color: self.color,
            width: self.width,
        }
    }
}

/// A border as it should appear on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderPaint {
    pub style: BorderStyle,
    pub color: Rgb,
    pub width: u32,
}

/// What `apply()` asks the coordinator to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Border disabled: remove any border
    Cleared,
    /// Paint once
    Painted(BorderPaint),
    /// Paint, then keep the gradient cycle running
    Gradient(BorderPaint),
    /// Resize mode owns the border; re-apply when it ends
    Deferred,
}

pub struct BorderEngine {
    config: BorderConfig,
    resize_mode: bool,
}

impl BorderEngine {
    pub fn new(config: BorderConfig) -> Self {
        Self {
            config,
            resize_mode: false,
        }
    }

    pub fn config(&self) -> &BorderConfig {
        &self.config
    }

    pub fn is_resize_mode(&self) -> bool {
        self.resize_mode
    }

    pub fn set_resize_mode(&mut self, active: bool) {
        self.resize_mode = active;
    }

    /// Work out how the current config should be rendered
    pub fn apply(&self) -> ApplyOutcome {
        if self.resize_mode {
            return ApplyOutcome::Deferred;
        }
        if !self.config.enabled {
            return ApplyOutcome::Cleared;
        }
        match self.config.style {
            BorderStyle::Gradient => ApplyOutcome::Gradient(self.config.paint()),
            _ => ApplyOutcome::Painted(self.config.paint()),
        }
    }

    /// Switch to the catalog preset `name`. Unknown names are ignored.
    pub fn set_style(&mut self, name: &str) -> Option<ApplyOutcome> {
        let Some(preset) = catalog::find(name) else {
            debug!("Ignoring unknown border preset {:?}", name);
            return None;
        };
        self.config = BorderConfig::from_preset(preset);
        debug!("Border preset set to {:?}", preset.name);
        Some(self.apply())
    }

    /// Advance to the next catalog entry, wrapping after the last one
    pub fn cycle_style(&mut self) -> ApplyOutcome {
        let next = match self.config.source {
            BorderSource::Preset(name) => catalog::index_of(name).map_or(0, |i| (i + 1) % CATALOG.len()),
            BorderSource::WallpaperSync => 0,
        };
        let preset = &CATALOG[next];
        self.config = BorderConfig::from_preset(preset);
        debug!("Border preset cycled to {:?}", preset.name);
        self.apply()
    }

    /// Switch to the synthetic wallpaper preset with `color`
    pub fn apply_wallpaper_color(&mut self, color: Rgb) -> ApplyOutcome {
        self.config = BorderConfig {
            enabled: true,
            style: BorderStyle::Solid,
            color,
            width: WALLPAPER_SYNC_WIDTH,
            source: BorderSource::WallpaperSync,
        };
        self.apply()
    }

    /// One gradient step. `None` ends the cycle: the style changed, the
    /// border was disabled, or resize mode took over.
    pub fn gradient_tick<R: Rng>(&self, rng: &mut R) -> Option<BorderPaint> {
        if self.resize_mode || !self.config.enabled || self.config.style != BorderStyle::Gradient {
            return None;
        }
        let color = GRADIENT_SPECTRUM[rng.gen_range(0..GRADIENT_SPECTRUM.len())];
        Some(BorderPaint { color, ..self.config.paint() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn engine() -> BorderEngine {
        BorderEngine::new(BorderConfig::from_preset(&CATALOG[0]))
    }

    #[test]
    fn test_cycle_wraps_after_catalog_length() {
        let mut engine = engine();
        let first = engine.config().preset_name();
        let mut seen = HashSet::new();

        for _ in 0..CATALOG.len() - 1 {
            engine.cycle_style();
            assert!(seen.insert(engine.config().preset_name()));
        }
        engine.cycle_style();
        assert_eq!(engine.config().preset_name(), first);
        assert!(!seen.contains(first));
    }

    #[test]
    fn test_set_style_unknown_is_noop() {
        let mut engine = engine();
        engine.set_style("Ocean Blue").unwrap();
        let before = *engine.config();
        assert_eq!(engine.set_style("Plaid"), None);
        assert_eq!(*engine.config(), before);
    }

    #[test]
    fn test_apply_outcomes() {
        let mut engine = engine();
        assert_eq!(engine.apply(), ApplyOutcome::Cleared);

        let outcome = engine.set_style("Gold Double").unwrap();
        assert_eq!(
            outcome,
            ApplyOutcome::Painted(BorderPaint {
                style: BorderStyle::Double,
                color: Rgb::new(0xff, 0xd7, 0x00),
                width: 4,
            })
        );
        assert!(matches!(engine.set_style("Rainbow"), Some(ApplyOutcome::Gradient(_))));
    }

    #[test]
    fn test_resize_mode_defers() {
        let mut engine = engine();
        engine.set_style("Crimson");
        engine.set_resize_mode(true);
        assert_eq!(engine.apply(), ApplyOutcome::Deferred);
        assert_eq!(engine.set_style("Ocean Blue"), Some(ApplyOutcome::Deferred));
        assert_eq!(engine.config().preset_name(), "Ocean Blue");

        engine.set_resize_mode(false);
        assert!(matches!(engine.apply(), ApplyOutcome::Painted(p) if p.color == Rgb::new(0x1e, 0x90, 0xff)));
    }

    #[test]
    fn test_gradient_tick_stops_lazily() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut engine = engine();
        engine.set_style("Rainbow");

        for _ in 0..20 {
            let paint = engine.gradient_tick(&mut rng).unwrap();
            assert!(GRADIENT_SPECTRUM.contains(&paint.color));
            assert_eq!(paint.style, BorderStyle::Gradient);
        }

        engine.set_style("Crimson");
        assert_eq!(engine.gradient_tick(&mut rng), None);
    }

    #[test]
    fn test_wallpaper_color_is_tagged() {
        let mut engine = engine();
        let color = Rgb::new(10, 120, 200);
        engine.apply_wallpaper_color(color);
        let config = engine.config();
        assert_eq!(config.source, BorderSource::WallpaperSync);
        assert_eq!(config.preset_name(), WALLPAPER_SYNC_NAME);
        assert_eq!((config.style, config.width, config.color), (BorderStyle::Solid, 3, color));

        engine.cycle_style();
        assert_eq!(engine.config().preset_name(), CATALOG[0].name);
    }

    #[test]
    fn test_widget_config_round_trip() {
        let mut engine = engine();
        engine.set_style("Neon Dashed");
        let mut persisted = WidgetConfig::default();
        engine.config().write_to(&mut persisted);
        assert_eq!(persisted.current_border_name, "Neon Dashed");
        assert_eq!(BorderConfig::from_widget_config(&persisted), *engine.config());

        persisted.current_border_name = "Vanished Preset".into();
        assert_eq!(BorderConfig::from_widget_config(&persisted), BorderConfig::from_preset(&CATALOG[0]));
    }
}
