//! Widget window and popup menu
//!
//! The widget is an undecorated override-redirect window kept above other
//! windows by restacking it whenever it is shown or moved. Frames go up with
//! `PutImage`; borders, the resize highlight and the menu are drawn with core
//! protocol primitives and the server's "fixed" font.

use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{debug, warn};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use super::Display;
use crate::animation::Frame;
use crate::border::{BorderPaint, BorderStyle};
use crate::coordinator::events::MenuAction;
use crate::coordinator::menu::{MenuItem, MenuModel};
use crate::platform::{ResizeHighlight, Surface};
use crate::shared::{Rgb, Screen, WidgetGeometry};

const BACKGROUND: u32 = 0x000000;
const HIGHLIGHT_COLOR: Rgb = Rgb::RED;
const HIGHLIGHT_WIDTH: u32 = 2;
const BANNER_TEXT: &[&str] = &["Resize Mode On", "Ctrl+Drag"];

pub const MENU_WIDTH: u16 = 220;
pub const MENU_ITEM_HEIGHT: u16 = 20;
pub const MENU_SEPARATOR_HEIGHT: u16 = 8;
const MENU_PADDING: i16 = 8;
const MENU_BACKGROUND: u32 = 0xf0f0f0;
const MENU_TEXT: u32 = 0x202020;
const MENU_SEPARATOR: u32 = 0xb0b0b0;
/// Font ascent of "fixed", used to place the text baseline
const FONT_ASCENT: i16 = 11;

/// Vertical extent of each menu row
pub fn menu_rows(menu: &MenuModel) -> Vec<(i16, u16)> {
    let mut top = 0i16;
    menu.items
        .iter()
        .map(|item| {
            let height = match item {
                MenuItem::Entry { .. } => MENU_ITEM_HEIGHT,
                MenuItem::Separator => MENU_SEPARATOR_HEIGHT,
            };
            let row = (top, height);
            top += height as i16;
            row
        })
        .collect()
}

pub fn menu_height(menu: &MenuModel) -> u16 {
    menu_rows(menu).iter().map(|(_, height)| height).sum()
}

/// Entry under a click at menu-relative `(x, y)`; `None` outside the menu or on
/// a separator
pub fn menu_hit(menu: &MenuModel, x: i16, y: i16) -> Option<MenuAction> {
    if x < 0 || x >= MENU_WIDTH as i16 || y < 0 {
        return None;
    }
    menu_rows(menu)
        .iter()
        .position(|&(top, height)| y >= top && y < top + height as i16)
        .and_then(|index| menu.action_at(index))
}

/// Keep a popup of `width`x`height` opened at `(x, y)` on screen
pub fn menu_origin(screen: Screen, x: i32, y: i32, width: u16, height: u16) -> (i32, i32) {
    let max_x = (screen.width as i32 - width as i32).max(0);
    let max_y = (screen.height as i32 - height as i32).max(0);
    (x.clamp(0, max_x), y.clamp(0, max_y))
}

/// RGBA rows to the 32bpp BGRX layout of a 24-bit TrueColor visual, alpha
/// composited over black
pub fn frame_to_bgrx(frame: &Frame) -> Vec<u8> {
    let mut data = Vec::with_capacity(frame.as_raw().len());
    for px in frame.pixels() {
        let [r, g, b, a] = px.0;
        let blend = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        data.extend_from_slice(&[blend(b), blend(g), blend(r), 0]);
    }
    data
}

struct MenuWindow {
    window: Window,
    model: Option<MenuModel>,
}

pub struct X11Surface {
    conn: Arc<RustConnection>,
    window: Window,
    gc: Gcontext,
    depth: u8,
    screen: Screen,
    max_request_bytes: usize,
    geometry: WidgetGeometry,
    visible: bool,
    border: Option<BorderPaint>,
    highlight: Option<ResizeHighlight>,
    menu: MenuWindow,
}

impl X11Surface {
    pub fn new(display: &Display, geometry: WidgetGeometry) -> Result<Self> {
        if display.depth != 24 && display.depth != 32 {
            bail!("Unsupported root depth {}, need a 24 or 32 bit TrueColor visual", display.depth);
        }

        let conn = display.conn.clone();
        let window = conn.generate_id()?;
        let menu_window = conn.generate_id()?;
        let gc = conn.generate_id()?;
        let font = conn.generate_id()?;

        conn.create_window(
            display.depth,
            window,
            display.root,
            geometry.x as i16,
            geometry.y as i16,
            geometry.width as u16,
            geometry.height as u16,
            0,
            WindowClass::INPUT_OUTPUT,
            0,
            &CreateWindowAux::new()
                .background_pixel(BACKGROUND)
                .override_redirect(1)
                .event_mask(
                    EventMask::EXPOSURE
                        | EventMask::BUTTON_PRESS
                        | EventMask::BUTTON_RELEASE
                        | EventMask::BUTTON1_MOTION,
                ),
        )?;

        conn.create_window(
            display.depth,
            menu_window,
            display.root,
            0,
            0,
            MENU_WIDTH,
            MENU_ITEM_HEIGHT,
            1,
            WindowClass::INPUT_OUTPUT,
            0,
            &CreateWindowAux::new()
                .background_pixel(MENU_BACKGROUND)
                .border_pixel(MENU_SEPARATOR)
                .override_redirect(1)
                .event_mask(EventMask::EXPOSURE | EventMask::BUTTON_PRESS),
        )?;

        conn.open_font(font, b"fixed")?;
        conn.create_gc(
            gc,
            window,
            &CreateGCAux::new()
                .foreground(BACKGROUND)
                .background(MENU_BACKGROUND)
                .font(font)
                .graphics_exposures(0),
        )?;
        conn.close_font(font)?;

        debug!("Created widget window {} and menu window {}", window, menu_window);

        Ok(Self {
            max_request_bytes: conn.maximum_request_bytes(),
            conn,
            window,
            gc,
            depth: display.depth,
            screen: display.screen,
            geometry,
            visible: false,
            border: None,
            highlight: None,
            menu: MenuWindow {
                window: menu_window,
                model: None,
            },
        })
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn menu_window(&self) -> Window {
        self.menu.window
    }

    pub fn menu_showing(&self) -> bool {
        self.menu.model.is_some()
    }

    /// Command under a click on the menu window
    pub fn menu_action_at(&self, x: i16, y: i16) -> Option<MenuAction> {
        let model = self.menu.model.as_ref()?;
        if y >= menu_height(model) as i16 {
            return None;
        }
        menu_hit(model, x, y)
    }

    /// Repaint the popup after an expose
    pub fn redraw_menu(&self) -> Result<()> {
        let Some(model) = &self.menu.model else {
            return Ok(());
        };
        self.draw_menu(model)
    }

    fn draw_menu(&self, model: &MenuModel) -> Result<()> {
        let conn = self.conn.as_ref();
        let window = self.menu.window;

        conn.change_gc(self.gc, &ChangeGCAux::new().foreground(MENU_BACKGROUND))?;
        conn.poly_fill_rectangle(
            window,
            self.gc,
            &[Rectangle {
                x: 0,
                y: 0,
                width: MENU_WIDTH,
                height: menu_height(model),
            }],
        )?;

        for (item, (top, height)) in model.items.iter().zip(menu_rows(model)) {
            match item {
                MenuItem::Separator => {
                    let y = top + height as i16 / 2;
                    conn.change_gc(
                        self.gc,
                        &ChangeGCAux::new()
                            .foreground(MENU_SEPARATOR)
                            .line_width(1)
                            .line_style(LineStyle::SOLID),
                    )?;
                    conn.poly_segment(
                        window,
                        self.gc,
                        &[Segment {
                            x1: 4,
                            y1: y,
                            x2: MENU_WIDTH as i16 - 4,
                            y2: y,
                        }],
                    )?;
                }
                MenuItem::Entry { label, checked, .. } => {
                    let text = format!("{} {}", if *checked { "*" } else { " " }, label);
                    let baseline = top + (height as i16 + FONT_ASCENT) / 2;
                    conn.change_gc(
                        self.gc,
                        &ChangeGCAux::new().foreground(MENU_TEXT).background(MENU_BACKGROUND),
                    )?;
                    conn.image_text8(window, self.gc, MENU_PADDING, baseline, &latin1(&text))?;
                }
            }
        }
        Ok(())
    }

    /// Draw whatever sits on top of the frame: the resize highlight when
    /// active, otherwise the border
    fn draw_decoration(&self) -> Result<()> {
        if let Some(highlight) = self.highlight {
            self.stroke(BorderStyle::Solid, HIGHLIGHT_COLOR, HIGHLIGHT_WIDTH)?;
            if highlight.banner {
                self.draw_banner()?;
            }
            return Ok(());
        }

        match self.border {
            Some(border) => self.stroke(border.style, border.color, border.width),
            None => Ok(()),
        }
    }

    fn stroke(&self, style: BorderStyle, color: Rgb, width: u32) -> Result<()> {
        let conn = self.conn.as_ref();
        let (w, h) = (self.geometry.width as i32, self.geometry.height as i32);
        let width = width.max(1) as i32;

        let rect = |inset: i32, line: i32| {
            let offset = inset + line / 2;
            Rectangle {
                x: offset as i16,
                y: offset as i16,
                width: (w - 2 * offset - 1).max(1) as u16,
                height: (h - 2 * offset - 1).max(1) as u16,
            }
        };

        match style {
            BorderStyle::Double => {
                let line = (width / 3).max(1);
                conn.change_gc(
                    self.gc,
                    &ChangeGCAux::new()
                        .foreground(color.to_pixel())
                        .line_width(line as u32)
                        .line_style(LineStyle::SOLID),
                )?;
                conn.poly_rectangle(self.window, self.gc, &[rect(0, line), rect(width - line, line)])?;
            }
            BorderStyle::Dashed => {
                conn.change_gc(
                    self.gc,
                    &ChangeGCAux::new()
                        .foreground(color.to_pixel())
                        .line_width(width as u32)
                        .line_style(LineStyle::ON_OFF_DASH),
                )?;
                conn.set_dashes(self.gc, 0, &[6, 4])?;
                conn.poly_rectangle(self.window, self.gc, &[rect(0, width)])?;
            }
            BorderStyle::Solid | BorderStyle::Gradient => {
                conn.change_gc(
                    self.gc,
                    &ChangeGCAux::new()
                        .foreground(color.to_pixel())
                        .line_width(width as u32)
                        .line_style(LineStyle::SOLID),
                )?;
                conn.poly_rectangle(self.window, self.gc, &[rect(0, width)])?;
            }
        }
        Ok(())
    }

    fn draw_banner(&self) -> Result<()> {
        let conn = self.conn.as_ref();
        conn.change_gc(
            self.gc,
            &ChangeGCAux::new()
                .foreground(HIGHLIGHT_COLOR.to_pixel())
                .background(Rgb::WHITE.to_pixel()),
        )?;
        for (line, text) in BANNER_TEXT.iter().enumerate() {
            let y = 8 + FONT_ASCENT + line as i16 * (FONT_ASCENT + 3);
            conn.image_text8(self.window, self.gc, 8, y, text.as_bytes())?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.conn.clear_area(false, self.window, 0, 0, 0, 0)?;
        Ok(())
    }

    fn raise(&self) -> Result<()> {
        self.conn.configure_window(
            self.window,
            &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
        )?;
        Ok(())
    }

    fn release_grab(&self) -> Result<()> {
        self.conn.ungrab_pointer(x11rb::CURRENT_TIME)?;
        Ok(())
    }
}

impl Surface for X11Surface {
    fn set_geometry(&mut self, geometry: WidgetGeometry) -> Result<()> {
        let resized = geometry.width != self.geometry.width || geometry.height != self.geometry.height;
        self.geometry = geometry;
        self.conn.configure_window(
            self.window,
            &ConfigureWindowAux::new()
                .x(geometry.x)
                .y(geometry.y)
                .width(geometry.width)
                .height(geometry.height)
                .stack_mode(StackMode::ABOVE),
        )?;
        if resized {
            // Old frame size until the next load; keep the decoration on the new edge
            self.clear()?;
            self.draw_decoration()?;
        }
        Ok(())
    }

    fn set_visible(&mut self, visible: bool) -> Result<()> {
        if visible {
            self.conn.map_window(self.window)?;
            self.raise()?;
        } else {
            self.conn.unmap_window(self.window)?;
        }
        self.conn.flush()?;
        self.visible = visible;
        debug!("Widget {}", if visible { "shown" } else { "hidden" });
        Ok(())
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn present_frame(&mut self, frame: &Frame) -> Result<()> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            bail!("Empty frame");
        }

        let data = frame_to_bgrx(frame);
        let stride = width as usize * 4;
        // Request header plus PutImage fields
        let rows_per_request = ((self.max_request_bytes.saturating_sub(64)) / stride).max(1);

        for (band, rows) in data.chunks(rows_per_request * stride).enumerate() {
            let band_height = rows.len() / stride;
            self.conn.put_image(
                ImageFormat::Z_PIXMAP,
                self.window,
                self.gc,
                width as u16,
                band_height as u16,
                0,
                (band * rows_per_request) as i16,
                0,
                self.depth,
                rows,
            )?;
        }

        self.draw_decoration()
    }

    fn paint_border(&mut self, border: Option<BorderPaint>) -> Result<()> {
        let removed = self.border.is_some() && border.is_none();
        self.border = border;
        if removed {
            // Exposes repaint the frame underneath
            self.conn.clear_area(true, self.window, 0, 0, 0, 0)?;
            return Ok(());
        }
        self.draw_decoration()
    }

    fn set_resize_highlight(&mut self, highlight: Option<ResizeHighlight>) -> Result<()> {
        let shrinking = match (self.highlight, highlight) {
            (Some(_), None) => true,
            (Some(old), Some(new)) => old.banner && !new.banner,
            _ => false,
        };
        self.highlight = highlight;
        if shrinking {
            self.conn.clear_area(true, self.window, 0, 0, 0, 0)?;
            return Ok(());
        }
        self.draw_decoration()
    }

    fn show_menu(&mut self, menu: &MenuModel, x: i32, y: i32) -> Result<()> {
        let height = menu_height(menu);
        let (x, y) = menu_origin(self.screen, x, y, MENU_WIDTH, height);

        self.conn.configure_window(
            self.menu.window,
            &ConfigureWindowAux::new()
                .x(x)
                .y(y)
                .width(MENU_WIDTH as u32)
                .height(height as u32)
                .stack_mode(StackMode::ABOVE),
        )?;
        self.conn.map_window(self.menu.window)?;
        self.draw_menu(menu)?;
        self.menu.model = Some(menu.clone());

        let grab = self
            .conn
            .grab_pointer(
                false,
                self.menu.window,
                EventMask::BUTTON_PRESS,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                0u32,
                0u32,
                x11rb::CURRENT_TIME,
            )?
            .reply()?;
        if grab.status != GrabStatus::SUCCESS {
            // Still usable, only clicks elsewhere will not dismiss it
            warn!("Menu pointer grab failed: {:?}", grab.status);
        }
        Ok(())
    }

    fn close_menu(&mut self) -> Result<()> {
        if self.menu.model.take().is_none() {
            return Ok(());
        }
        self.release_grab()?;
        self.conn.unmap_window(self.menu.window)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.conn.flush()?;
        Ok(())
    }
}

impl Drop for X11Surface {
    fn drop(&mut self) {
        let _ = self.conn.free_gc(self.gc);
        let _ = self.conn.destroy_window(self.menu.window);
        let _ = self.conn.destroy_window(self.window);
        let _ = self.conn.flush();
    }
}

/// Core fonts take Latin-1; anything else becomes '?'
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
