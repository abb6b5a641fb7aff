//! Widget geometry
//!
//! Position and size of the widget window, plus the anchoring rules that keep
//! the bottom-right corner fixed while resizing.

/// Smallest allowed widget edge
pub const MIN_SIZE: u32 = 50;
/// Largest allowed widget edge
pub const MAX_SIZE: u32 = 500;
/// Default widget edge
pub const DEFAULT_SIZE: u32 = 150;
/// Gap between the widget and the right/bottom screen edge
pub const EDGE_MARGIN: i32 = 10;
/// Room left for a bottom panel (dash-to-panel is usually 48px)
pub const PANEL_HEIGHT: i32 = 48;

/// Screen dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub width: u32,
    pub height: u32,
}

impl Screen {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Widget window geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WidgetGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl WidgetGeometry {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Geometry of a `width`x`height` widget anchored in the bottom-right corner
    pub fn anchored(screen: Screen, width: u32, height: u32) -> Self {
        let width = clamp_size(width);
        let height = clamp_size(height);
        let (x, y) = anchored_position(screen, width, height);
        Self { x, y, width, height }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn moved_to(self, x: i32, y: i32) -> Self {
        Self { x, y, ..self }
    }

    /// Apply a resize gesture.
    ///
    /// Horizontal and vertical deltas are averaged into one uniform delta so the
    /// widget keeps its aspect ratio; both edges are clamped to
    /// [`MIN_SIZE`, `MAX_SIZE`] and the position is recomputed so the
    /// bottom-right corner stays put. Returns `None` if the size would not change.
    pub fn resized(&self, delta_x: i32, delta_y: i32, screen: Screen) -> Option<Self> {
        let delta = (delta_x + delta_y).div_euclid(2);
        let width = clamp_size_signed(self.width as i64 + delta as i64);
        let height = clamp_size_signed(self.height as i64 + delta as i64);

        if width == self.width && height == self.height {
            return None;
        }

        let (x, y) = anchored_position(screen, width, height);
        Some(Self { x, y, width, height })
    }
}

/// Top-left position that keeps a `width`x`height` widget in the bottom-right corner
pub fn anchored_position(screen: Screen, width: u32, height: u32) -> (i32, i32) {
    let x = screen.width as i32 - width as i32 - EDGE_MARGIN;
    let y = screen.height as i32 - height as i32 - PANEL_HEIGHT - EDGE_MARGIN;
    (x, y)
}

pub fn clamp_size(size: u32) -> u32 {
    size.clamp(MIN_SIZE, MAX_SIZE)
}

fn clamp_size_signed(size: i64) -> u32 {
    size.clamp(MIN_SIZE as i64, MAX_SIZE as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Screen = Screen { width: 1920, height: 1080 };

    #[test]
    fn test_anchored_default() {
        let geometry = WidgetGeometry::anchored(SCREEN, 150, 150);
        assert_eq!(geometry, WidgetGeometry::new(1760, 872, 150, 150));
    }

    #[test]
    fn test_resize_averages_deltas() {
        let geometry = WidgetGeometry::anchored(SCREEN, 150, 150);
        let resized = geometry.resized(30, 10, SCREEN).unwrap();
        assert_eq!((resized.width, resized.height), (170, 170));
        // Floor division, like a uniform drag of -1px
        let shrunk = geometry.resized(-1, 0, SCREEN).unwrap();
        assert_eq!(shrunk.width, 149);
    }

    #[test]
    fn test_resize_clamps_and_keeps_corner() {
        let geometry = WidgetGeometry::anchored(SCREEN, 150, 150);
        for delta in [-10_000, -200, -101, -99, 0, 1, 99, 349, 351, 10_000] {
            let next = geometry.resized(delta, delta, SCREEN).unwrap_or(geometry);
            assert!((MIN_SIZE..=MAX_SIZE).contains(&next.width));
            assert!((MIN_SIZE..=MAX_SIZE).contains(&next.height));
            assert_eq!(next.x, SCREEN.width as i32 - next.width as i32 - 10);
            assert_eq!(next.y + next.height as i32, 1080 - 48 - 10);
        }
    }

    #[test]
    fn test_resize_at_limit_is_none() {
        let geometry = WidgetGeometry::anchored(SCREEN, MAX_SIZE, MAX_SIZE);
        assert_eq!(geometry.resized(40, 40, SCREEN), None);
        let geometry = WidgetGeometry::anchored(SCREEN, MIN_SIZE, MIN_SIZE);
        assert_eq!(geometry.resized(-40, -40, SCREEN), None);
    }
}
