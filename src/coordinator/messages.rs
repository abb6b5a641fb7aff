//! Cross-thread traffic
//!
//! Workers read a [`WorkerSnapshot`] (published by the coordinator after every
//! mutation) and send [`WorkerMessage`]s back. They never mutate widget state.

use std::path::PathBuf;

use crate::animation::Frame;
use crate::error::LoadError;
use crate::shared::WidgetGeometry;
use crate::wallpaper::WallpaperSample;

/// Read-only projection of coordinator state for the background workers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerSnapshot {
    pub geometry: WidgetGeometry,
    pub menu_open: bool,
    pub hide_when_not_desktop: bool,
    pub wallpaper_sync_enabled: bool,
    pub last_sampled_position: Option<(i32, i32)>,
}

/// Results handed to the coordinator's queue
#[derive(Debug)]
pub enum WorkerMessage {
    /// `true` when the desktop (not an application) has focus
    Presence(bool),
    /// Enhanced wallpaper color under the widget
    WallpaperSample(WallpaperSample),
    /// A decode job finished. Only the latest requested generation is applied.
    FramesDecoded {
        generation: u64,
        path: PathBuf,
        size: (u32, u32),
        result: Result<Vec<Frame>, LoadError>,
    },
    /// The file picker closed; `None` when cancelled
    SourcePicked(Option<PathBuf>),
}
