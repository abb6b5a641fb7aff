//! Recoverable failure types
//!
//! None of these end the process: the coordinator logs them and carries on
//! with the previous state (or a safe fallback) for that tick.

use std::path::PathBuf;
use thiserror::Error;

/// A new animation source could not replace the current one
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source {0:?} does not exist")]
    Missing(PathBuf),

    #[error("failed to decode {path:?}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("{0:?} decoded to zero frames")]
    NoFrames(PathBuf),
}

/// Screen capture or color math failed for one sampling tick
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture region is empty")]
    EmptyRegion,

    #[error("unsupported pixel format: depth {depth}, {bytes} bytes for {pixels} pixels")]
    UnsupportedFormat { depth: u8, bytes: usize, pixels: usize },

    #[error("screen capture failed: {0}")]
    Backend(String),
}

/// Active-window query failed for one presence tick
#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("no window has focus")]
    NoActiveWindow,

    #[error("active window query failed: {0}")]
    Query(String),
}
