//! Focused window name via EWMH

use anyhow::{Context, Result};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt, Window};
use x11rb::rust_connection::RustConnection;

use super::Atoms;
use crate::error::PresenceError;
use crate::presence::ActiveWindowSource;

/// Longest window name read, in 32-bit units
const NAME_LENGTH: u32 = 256;

pub struct X11ActiveWindow {
    conn: RustConnection,
    root: Window,
    atoms: Atoms,
}

impl X11ActiveWindow {
    /// Open a dedicated connection for the presence thread
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) =
            x11rb::connect(None).context("Failed to connect to X server for presence monitor")?;
        let root = conn.setup().roots[screen_num].root;
        let atoms = Atoms::new(&conn)?;
        Ok(Self { conn, root, atoms })
    }

    fn active_window(&self) -> Result<Window, PresenceError> {
        let reply = self
            .conn
            .get_property(false, self.root, self.atoms.net_active_window, AtomEnum::WINDOW, 0, 1)
            .map_err(query_error)?
            .reply()
            .map_err(query_error)?;

        match reply.value32().and_then(|mut values| values.next()) {
            Some(window) if window != x11rb::NONE => Ok(window),
            _ => Err(PresenceError::NoActiveWindow),
        }
    }

    fn window_name(&self, window: Window) -> Result<String, PresenceError> {
        let net_name = self
            .conn
            .get_property(false, window, self.atoms.net_wm_name, self.atoms.utf8_string, 0, NAME_LENGTH)
            .map_err(query_error)?
            .reply()
            .map_err(query_error)?;
        if !net_name.value.is_empty() {
            return Ok(String::from_utf8_lossy(&net_name.value).into_owned());
        }

        let wm_name = self
            .conn
            .get_property(false, window, AtomEnum::WM_NAME, AtomEnum::STRING, 0, NAME_LENGTH)
            .map_err(query_error)?
            .reply()
            .map_err(query_error)?;
        Ok(String::from_utf8_lossy(&wm_name.value).into_owned())
    }
}

impl ActiveWindowSource for X11ActiveWindow {
    fn active_window_name(&self) -> Result<String, PresenceError> {
        let window = self.active_window()?;
        self.window_name(window)
    }
}

fn query_error(e: impl std::fmt::Display) -> PresenceError {
    PresenceError::Query(e.to_string())
}
