//! File picker for choosing a new GIF
//!
//! Shells out to zenity; blocks until the dialog closes, so callers run it on
//! a blocking task.

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, warn};

/// Ask the user for a GIF. `None` when cancelled or when no picker is available.
pub fn pick_gif() -> Option<PathBuf> {
    let output = Command::new("zenity")
        .args([
            "--file-selection",
            "--title=Select a GIF",
            "--file-filter=GIF files | *.gif",
            "--file-filter=All files | *",
        ])
        .output();

    match output {
        Ok(output) if output.status.success() => parse_selection(&output.stdout),
        Ok(_) => {
            debug!("File selection cancelled");
            None
        }
        Err(e) => {
            warn!("Could not run zenity file picker: {}", e);
            None
        }
    }
}

fn parse_selection(stdout: &[u8]) -> Option<PathBuf> {
    let selection = String::from_utf8_lossy(stdout);
    let selection = selection.trim_end_matches(['\n', '\r']);
    if selection.is_empty() {
        None
    } else {
        Some(PathBuf::from(selection))
    }
}
