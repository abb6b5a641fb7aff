//! Root window capture for wallpaper sampling

use anyhow::{Context, Result};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConnectionExt, ImageFormat, Window};
use x11rb::rust_connection::RustConnection;

use crate::error::CaptureError;
use crate::shared::{Rgb, Screen};
use crate::wallpaper::sampler::{PixelGrid, Region};
use crate::wallpaper::ScreenCapture;

pub struct X11ScreenCapture {
    conn: RustConnection,
    root: Window,
    screen: Screen,
}

impl X11ScreenCapture {
    /// Open a dedicated connection for the sampler thread
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) =
            x11rb::connect(None).context("Failed to connect to X server for wallpaper sampler")?;
        let setup_screen = &conn.setup().roots[screen_num];
        let root = setup_screen.root;
        let screen = Screen::new(
            setup_screen.width_in_pixels as u32,
            setup_screen.height_in_pixels as u32,
        );
        Ok(Self { conn, root, screen })
    }
}

/// Intersect `region` with the screen; `None` when nothing is left
pub fn clamp_to_screen(region: Region, screen: Screen) -> Option<Region> {
    let left = region.x.max(0);
    let top = region.y.max(0);
    let right = (region.x + region.width as i32).min(screen.width as i32);
    let bottom = (region.y + region.height as i32).min(screen.height as i32);
    if right <= left || bottom <= top {
        return None;
    }
    Some(Region {
        x: left,
        y: top,
        width: (right - left) as u32,
        height: (bottom - top) as u32,
    })
}

/// Unpack a 32bpp little-endian ZPixmap (BGRX)
pub fn unpack_bgrx(depth: u8, data: &[u8], width: u32, height: u32) -> Result<PixelGrid, CaptureError> {
    let pixels = (width * height) as usize;
    if pixels == 0 || data.len() != pixels * 4 {
        return Err(CaptureError::UnsupportedFormat {
            depth,
            bytes: data.len(),
            pixels,
        });
    }

    let pixels = data
        .chunks_exact(4)
        .map(|px| Rgb::new(px[2], px[1], px[0]))
        .collect();
    Ok(PixelGrid { width, height, pixels })
}

impl ScreenCapture for X11ScreenCapture {
    fn capture(&self, region: Region) -> Result<PixelGrid, CaptureError> {
        let region = clamp_to_screen(region, self.screen).ok_or(CaptureError::EmptyRegion)?;

        let reply = self
            .conn
            .get_image(
                ImageFormat::Z_PIXMAP,
                self.root,
                region.x as i16,
                region.y as i16,
                region.width as u16,
                region.height as u16,
                !0,
            )
            .map_err(|e| CaptureError::Backend(e.to_string()))?
            .reply()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;

        unpack_bgrx(reply.depth, &reply.data, region.width, region.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Screen = Screen { width: 1920, height: 1080 };

    #[test]
    fn test_region_clamped_at_screen_edges() {
        let region = Region { x: 1850, y: -10, width: 190, height: 190 };
        assert_eq!(
            clamp_to_screen(region, SCREEN),
            Some(Region { x: 1850, y: 0, width: 70, height: 180 })
        );
        let offscreen = Region { x: 2000, y: 0, width: 50, height: 50 };
        assert_eq!(clamp_to_screen(offscreen, SCREEN), None);
    }

    #[test]
    fn test_unpack_bgrx() {
        let data = [0x10, 0x20, 0x30, 0x00, 0xff, 0x00, 0x00, 0x00];
        let grid = unpack_bgrx(24, &data, 2, 1).unwrap();
        assert_eq!(grid.pixels, vec![Rgb::new(0x30, 0x20, 0x10), Rgb::new(0, 0, 0xff)]);

        assert!(matches!(
            unpack_bgrx(16, &data, 2, 2),
            Err(CaptureError::UnsupportedFormat { depth: 16, bytes: 8, pixels: 4 })
        ));
    }
}
