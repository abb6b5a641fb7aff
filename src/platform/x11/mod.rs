//! X11 backend
//!
//! Every piece that talks to the X server: the widget surface and its popup
//! menu, input translation, the active-window query and root-window capture.
//! The background workers each open their own connection so their replies
//! never interleave with the event stream on the UI loop.

pub mod active_window;
pub mod capture;
pub mod input;
pub mod picker;
pub mod surface;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{Atom, ConnectionExt, Window};
use x11rb::rust_connection::RustConnection;

use crate::shared::Screen;

pub use active_window::X11ActiveWindow;
pub use capture::X11ScreenCapture;
pub use input::InputTranslator;
pub use surface::X11Surface;

/// Atoms the widget needs
#[derive(Debug, Clone, Copy)]
pub struct Atoms {
    pub net_active_window: Atom,
    pub net_wm_name: Atom,
    pub utf8_string: Atom,
}

impl Atoms {
    pub fn new<C: Connection>(conn: &C) -> Result<Self> {
        let intern = |name: &str| -> Result<Atom> {
            Ok(conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
        };

        Ok(Self {
            net_active_window: intern("_NET_ACTIVE_WINDOW")?,
            net_wm_name: intern("_NET_WM_NAME")?,
            utf8_string: intern("UTF8_STRING")?,
        })
    }
}

/// An open display and the facts about its default screen
pub struct Display {
    pub conn: Arc<RustConnection>,
    pub root: Window,
    pub depth: u8,
    pub screen: Screen,
}

impl Display {
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X server")?;
        let setup_screen = &conn.setup().roots[screen_num];
        let root = setup_screen.root;
        let depth = setup_screen.root_depth;
        let screen = Screen::new(
            setup_screen.width_in_pixels as u32,
            setup_screen.height_in_pixels as u32,
        );

        info!("Connected to X server, screen {}, root window {}", screen_num, root);
        info!("Screen size: {}x{}", screen.width, screen.height);

        Ok(Self {
            conn: Arc::new(conn),
            root,
            depth,
            screen,
        })
    }
}
