//! Shared value types
//!
//! Plain data used by every subsystem: colors and widget geometry.

pub mod color;
pub mod geometry;

pub use color::Rgb;
pub use geometry::{Screen, WidgetGeometry};
