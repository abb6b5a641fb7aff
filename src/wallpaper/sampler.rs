//! Wallpaper color sampling
//!
//! Captures the screen around the widget, finds the dominant color of the
//! wallpaper there and lifts it into a border-friendly color.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::coordinator::messages::WorkerSnapshot;
use crate::error::CaptureError;
use crate::shared::{Rgb, WidgetGeometry};

/// Pixels captured beyond each widget edge
pub const CONTEXT_MARGIN: i32 = 20;
/// Movement (per axis) that invalidates the last sample
pub const MOVE_THRESHOLD: i32 = 20;
/// Colors averaged into the dominant color
pub const TOP_COLORS: usize = 5;
/// Longest edge after downsampling
const SAMPLE_EDGE: u32 = 64;
/// Pixels darker or brighter than this (exclusive) are treated as shadow/glare
const MIN_BRIGHTNESS: f64 = 30.0;
const MAX_BRIGHTNESS: f64 = 225.0;
/// Color reported for a pass whose capture or color math failed
pub const FALLBACK_COLOR: Rgb = Rgb::BLACK;

/// Screen rectangle in root coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// The widget's bounds grown by `margin` on every side
    pub fn around(geometry: &WidgetGeometry, margin: i32) -> Self {
        Self {
            x: geometry.x - margin,
            y: geometry.y - margin,
            width: (geometry.width as i64 + 2 * margin as i64).max(0) as u32,
            height: (geometry.height as i64 + 2 * margin as i64).max(0) as u32,
        }
    }
}

/// Row-major captured pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgb>,
}

impl PixelGrid {
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}

/// Screen-region capture capability
pub trait ScreenCapture {
    fn capture(&self, region: Region) -> Result<PixelGrid, CaptureError>;
}

/// True when no sample exists yet or the widget moved more than
/// [`MOVE_THRESHOLD`] pixels along either axis since the last one
pub fn should_sample(last: Option<(i32, i32)>, current: (i32, i32)) -> bool {
    match last {
        None => true,
        Some((x, y)) => (current.0 - x).abs() > MOVE_THRESHOLD || (current.1 - y).abs() > MOVE_THRESHOLD,
    }
}

/// Count-weighted average of the most frequent colors, ignoring near-black and
/// near-white pixels unless nothing else is left
pub fn dominant_color(grid: &PixelGrid) -> Result<Rgb, CaptureError> {
    if grid.width == 0 || grid.height == 0 || grid.pixels.is_empty() {
        return Err(CaptureError::EmptyRegion);
    }

    let stride = grid.width.max(grid.height).div_ceil(SAMPLE_EDGE).max(1);
    let mut sampled = Vec::new();
    for y in (0..grid.height).step_by(stride as usize) {
        for x in (0..grid.width).step_by(stride as usize) {
            if let Some(pixel) = grid.get(x, y) {
                sampled.push(pixel);
            }
        }
    }

    let filtered: Vec<Rgb> = sampled
        .iter()
        .copied()
        .filter(|p| {
            let brightness = p.brightness();
            brightness > MIN_BRIGHTNESS && brightness < MAX_BRIGHTNESS
        })
        .collect();
    let pixels = if filtered.is_empty() { &sampled } else { &filtered };
    if pixels.is_empty() {
        return Err(CaptureError::EmptyRegion);
    }

    let mut counts: HashMap<Rgb, u64> = HashMap::new();
    for pixel in pixels {
        *counts.entry(*pixel).or_insert(0) += 1;
    }

    let mut ranked: Vec<(Rgb, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(TOP_COLORS);

    let total: u64 = ranked.iter().map(|(_, count)| count).sum();
    let weighted = |channel: fn(&Rgb) -> u8| {
        let sum: u64 = ranked.iter().map(|(c, count)| channel(c) as u64 * count).sum();
        ((sum as f64) / (total as f64)).round() as u8
    };

    Ok(Rgb::new(weighted(|c| c.r), weighted(|c| c.g), weighted(|c| c.b)))
}

/// Boost saturation by 30% and keep the value inside [0.4, 0.9] so the border
/// stays visible on dark or washed-out wallpapers
pub fn enhance(color: Rgb) -> Rgb {
    let (h, s, v) = color.to_hsv();
    let s = (s * 1.3).min(1.0);
    let v = (v * 1.2).clamp(0.4, 0.9);
    Rgb::from_hsv(h, s, v)
}

/// Result of one sampling pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallpaperSample {
    pub color: Rgb,
    /// Widget position the sample was taken at
    pub position: (i32, i32),
}

/// Color read by one sampling pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    Sampled(Rgb),
    /// The pass failed; carries [`FALLBACK_COLOR`]
    Fallback(Rgb),
}

pub struct Sampler<C> {
    capture: C,
}

impl<C: ScreenCapture> Sampler<C> {
    pub fn new(capture: C) -> Self {
        Self { capture }
    }

    /// Sample and enhance the wallpaper around `geometry`. Any failure yields
    /// the fallback color for this pass only.
    pub fn sample(&self, geometry: &WidgetGeometry) -> Reading {
        match self.try_sample(geometry) {
            Ok(color) => Reading::Sampled(color),
            Err(e) => {
                warn!("Wallpaper sampling failed, falling back to {}: {}", FALLBACK_COLOR, e);
                Reading::Fallback(FALLBACK_COLOR)
            }
        }
    }

    fn try_sample(&self, geometry: &WidgetGeometry) -> Result<Rgb, CaptureError> {
        let region = Region::around(geometry, CONTEXT_MARGIN);
        let grid = self.capture.capture(region)?;
        Ok(enhance(dominant_color(&grid)?))
    }

    /// One update pass against a snapshot of coordinator state.
    ///
    /// Returns `None` when sync is off, the widget has not moved far enough, or
    /// the pass fell back. Fallback readings are not posted, so the border
    /// keeps its color and the next pass retries from the same position.
    pub fn update(&self, snapshot: &WorkerSnapshot) -> Option<WallpaperSample> {
        if !snapshot.wallpaper_sync_enabled {
            return None;
        }

        let position = snapshot.geometry.position();
        if !should_sample(snapshot.last_sampled_position, position) {
            return None;
        }

        match self.sample(&snapshot.geometry) {
            Reading::Sampled(color) => {
                debug!("Wallpaper sample at {:?}: {}", position, color);
                Some(WallpaperSample { color, position })
            }
            Reading::Fallback(color) => {
                debug!("Keeping current border, not posting fallback {}", color);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn grid(width: u32, height: u32, f: impl Fn(u32, u32) -> Rgb) -> PixelGrid {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        PixelGrid { width, height, pixels }
    }

    struct FakeCapture {
        grid: Option<PixelGrid>,
        calls: Cell<usize>,
    }

    impl ScreenCapture for FakeCapture {
        fn capture(&self, _region: Region) -> Result<PixelGrid, CaptureError> {
            self.calls.set(self.calls.get() + 1);
            self.grid.clone().ok_or(CaptureError::Backend("display gone".into()))
        }
    }

    fn snapshot(position: (i32, i32), last: Option<(i32, i32)>) -> WorkerSnapshot {
        WorkerSnapshot {
            geometry: WidgetGeometry::new(position.0, position.1, 100, 100),
            wallpaper_sync_enabled: true,
            last_sampled_position: last,
            ..WorkerSnapshot::default()
        }
    }

    #[test]
    fn test_region_around_widget() {
        let region = Region::around(&WidgetGeometry::new(100, 50, 150, 150), CONTEXT_MARGIN);
        assert_eq!(region, Region { x: 80, y: 30, width: 190, height: 190 });
    }

    #[test]
    fn test_debounce_threshold() {
        assert!(should_sample(None, (0, 0)));
        assert!(!should_sample(Some((100, 100)), (120, 80)));
        assert!(!should_sample(Some((100, 100)), (100, 100)));
        assert!(should_sample(Some((100, 100)), (121, 100)));
        assert!(should_sample(Some((100, 100)), (100, 79)));
    }

    #[test]
    fn test_dominant_color_weights_top_colors() {
        let blue = Rgb::new(40, 60, 200);
        let green = Rgb::new(40, 180, 60);
        // Three quarters blue, one quarter green
        let pixels = grid(4, 4, |x, _| if x < 3 { blue } else { green });
        assert_eq!(dominant_color(&pixels).unwrap(), Rgb::new(40, 90, 165));
    }

    #[test]
    fn test_outliers_filtered() {
        let teal = Rgb::new(20, 120, 120);
        let pixels = grid(10, 10, |x, y| match (x + y) % 3 {
            0 => Rgb::BLACK,
            1 => Rgb::WHITE,
            _ => teal,
        });
        assert_eq!(dominant_color(&pixels).unwrap(), teal);
    }

    #[test]
    fn test_all_outliers_falls_back_to_unfiltered() {
        let pixels = grid(8, 8, |_, _| Rgb::new(5, 5, 5));
        assert_eq!(dominant_color(&pixels).unwrap(), Rgb::new(5, 5, 5));
    }

    #[test]
    fn test_more_than_five_colors_uses_top_five() {
        // Six colors, the rarest should not contribute
        let palette = [
            Rgb::new(100, 100, 100),
            Rgb::new(100, 100, 100),
            Rgb::new(100, 100, 100),
            Rgb::new(110, 100, 100),
            Rgb::new(120, 100, 100),
            Rgb::new(130, 100, 100),
            Rgb::new(140, 100, 100),
            Rgb::new(200, 100, 100),
        ];
        let pixels = PixelGrid { width: 8, height: 1, pixels: palette.to_vec() };
        // Five colors: 100x3, 110, 120, 130, 140 (ties broken by value, 200 dropped)
        assert_eq!(dominant_color(&pixels).unwrap().r, 114);
    }

    #[test]
    fn test_empty_grid_is_error() {
        let pixels = PixelGrid { width: 0, height: 0, pixels: Vec::new() };
        assert!(matches!(dominant_color(&pixels), Err(CaptureError::EmptyRegion)));
    }

    #[test]
    fn test_enhance_black_has_floor() {
        assert_eq!(enhance(Rgb::BLACK), Rgb::new(102, 102, 102));
    }

    #[test]
    fn test_enhance_saturation_capped() {
        let (_, s, v) = enhance(Rgb::RED).to_hsv();
        assert!(s <= 1.0);
        assert!(v <= 0.9 + 1.0 / 255.0);
        let (_, s, _) = enhance(Rgb::new(150, 100, 100)).to_hsv();
        assert!(s > Rgb::new(150, 100, 100).to_hsv().1);
    }

    #[test]
    fn test_update_skips_small_moves() {
        let sampler = Sampler::new(FakeCapture {
            grid: Some(grid(4, 4, |_, _| Rgb::new(40, 60, 200))),
            calls: Cell::new(0),
        });

        assert!(sampler.update(&snapshot((110, 110), Some((100, 100)))).is_none());
        assert_eq!(sampler.capture.calls.get(), 0);

        let sample = sampler.update(&snapshot((130, 100), Some((100, 100)))).unwrap();
        assert_eq!(sample.position, (130, 100));
        assert_eq!(sample.color, enhance(Rgb::new(40, 60, 200)));
        assert_eq!(sampler.capture.calls.get(), 1);
    }

    #[test]
    fn test_failed_capture_reads_black() {
        let failing = Sampler::new(FakeCapture { grid: None, calls: Cell::new(0) });
        let geometry = WidgetGeometry::new(0, 0, 100, 100);
        assert_eq!(failing.sample(&geometry), Reading::Fallback(Rgb::BLACK));

        let empty = Sampler::new(FakeCapture {
            grid: Some(PixelGrid { width: 0, height: 0, pixels: Vec::new() }),
            calls: Cell::new(0),
        });
        assert_eq!(empty.sample(&geometry), Reading::Fallback(FALLBACK_COLOR));

        let solid = Sampler::new(FakeCapture {
            grid: Some(grid(4, 4, |_, _| Rgb::new(40, 60, 200))),
            calls: Cell::new(0),
        });
        assert_eq!(solid.sample(&geometry), Reading::Sampled(enhance(Rgb::new(40, 60, 200))));
    }

    #[test]
    fn test_update_disabled_or_failing() {
        let sampler = Sampler::new(FakeCapture { grid: None, calls: Cell::new(0) });
        let mut snap = snapshot((0, 0), None);
        assert!(sampler.update(&snap).is_none());
        assert_eq!(sampler.capture.calls.get(), 1);

        snap.wallpaper_sync_enabled = false;
        assert!(sampler.update(&snap).is_none());
        assert_eq!(sampler.capture.calls.get(), 1);
    }
}
