//! Decorative border
//!
//! A fixed catalog of presets plus the engine that applies, cycles and
//! animates the active border configuration.

pub mod catalog;
pub mod engine;

pub use catalog::{BorderPreset, BorderStyle, CATALOG};
pub use engine::{ApplyOutcome, BorderConfig, BorderEngine, BorderPaint, BorderSource};
