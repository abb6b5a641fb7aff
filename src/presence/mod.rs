//! Desktop presence
//!
//! The monitor polls which window has focus on a background thread; the
//! visibility controller turns its signal into show/hide decisions on the
//! coordinator thread.

pub mod monitor;
pub mod visibility;

pub use monitor::{ActiveWindowSource, PresenceMonitor};
pub use visibility::{reconcile, VisibilityDecision};
