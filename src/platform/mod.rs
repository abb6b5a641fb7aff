//! Platform boundary
//!
//! The coordinator only talks to the windowing system through [`Surface`].
//! The X11 implementation lives in [`x11`]; tests use an in-memory fake.

pub mod x11;

use anyhow::Result;

use crate::animation::Frame;
use crate::border::BorderPaint;
use crate::coordinator::menu::MenuModel;
use crate::shared::WidgetGeometry;

/// Temporary resize-mode decoration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeHighlight {
    /// Show the "Resize Mode On / Ctrl+Drag" banner
    pub banner: bool,
}

/// The widget window as seen by the coordinator
pub trait Surface {
    fn set_geometry(&mut self, geometry: WidgetGeometry) -> Result<()>;

    fn set_visible(&mut self, visible: bool) -> Result<()>;

    fn is_visible(&self) -> bool;

    fn present_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Paint the decorative border; `None` removes it
    fn paint_border(&mut self, border: Option<BorderPaint>) -> Result<()>;

    /// Resize-mode highlight; while set it overrides the border
    fn set_resize_highlight(&mut self, highlight: Option<ResizeHighlight>) -> Result<()>;

    /// Pop up the context menu at root coordinates
    fn show_menu(&mut self, menu: &MenuModel, x: i32, y: i32) -> Result<()>;

    fn close_menu(&mut self) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}
