//! Wallpaper color sync
//!
//! `sampler` holds the color math and the debounce rule; `worker` runs it on a
//! daemon thread and posts results to the coordinator.

pub mod sampler;
pub mod worker;

pub use sampler::{Sampler, ScreenCapture, WallpaperSample};
pub use worker::SampleRequests;
