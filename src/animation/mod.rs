//! Animation playback
//!
//! `decoder` turns an animated GIF into frames pre-scaled to the widget size;
//! `scheduler` steps through them on the coordinator's timer wheel.

pub mod decoder;
pub mod scheduler;

pub use scheduler::{AnimationScheduler, TickOutcome};

/// One pre-scaled, ready-to-present animation frame
pub type Frame = image::RgbaImage;
