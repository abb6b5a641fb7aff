//! Desktop presence monitor
//!
//! Daemon thread that asks which window has focus every poll period and posts
//! "on desktop" / "not on desktop" to the coordinator. It never touches the
//! window itself.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::coordinator::messages::{WorkerMessage, WorkerSnapshot};
use crate::error::PresenceError;

/// Time between active-window queries
pub const POLL_PERIOD: Duration = Duration::from_millis(500);

/// Focused window names that mean "the desktop has focus" (matched as
/// lower-case substrings, localized names included)
pub const DESKTOP_NAMES: &[&str] = &[
    "desktop",
    "masaüstü",
    "nautilus-desktop",
    "gnome-shell",
    "xfdesktop",
    "plasmashell",
    "pcmanfm-desktop",
    "escritorio",
    "bureau",
    "schreibtisch",
];

/// Active-window query capability
pub trait ActiveWindowSource {
    /// Name of the focused window
    fn active_window_name(&self) -> Result<String, PresenceError>;
}

pub fn is_desktop_name(name: &str) -> bool {
    let name = name.trim().to_lowercase();
    name.is_empty() || DESKTOP_NAMES.iter().any(|desktop| name.contains(desktop))
}

/// A failed query (no focused window, or the query itself failing) counts as
/// being on the desktop, so errors keep the widget visible
pub fn classify(result: Result<String, PresenceError>) -> bool {
    match result {
        Ok(name) => is_desktop_name(&name),
        Err(PresenceError::NoActiveWindow) => true,
        Err(e) => {
            debug!("Presence query failed, assuming desktop: {}", e);
            true
        }
    }
}

pub struct PresenceMonitor<A> {
    source: A,
    period: Duration,
}

impl<A: ActiveWindowSource> PresenceMonitor<A> {
    pub fn new(source: A) -> Self {
        Self {
            source,
            period: POLL_PERIOD,
        }
    }

    /// One poll against a snapshot. `None` means the tick was skipped because
    /// the menu is open or the hide policy is off.
    pub fn poll_once(&self, snapshot: &WorkerSnapshot) -> Option<bool> {
        if snapshot.menu_open || !snapshot.hide_when_not_desktop {
            return None;
        }
        Some(classify(self.source.active_window_name()))
    }
}

impl<A: ActiveWindowSource + Send + 'static> PresenceMonitor<A> {
    /// Run on a detached daemon thread for the life of the process. The loop
    /// ends only when the coordinator's channel closes.
    pub fn spawn(
        self,
        snapshot: watch::Receiver<WorkerSnapshot>,
        results: mpsc::Sender<WorkerMessage>,
    ) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("presence-monitor".into())
            .spawn(move || {
                info!("Presence monitor started ({:?} poll)", self.period);
                loop {
                    let current = snapshot.borrow().clone();
                    if let Some(on_desktop) = self.poll_once(&current) {
                        if results.blocking_send(WorkerMessage::Presence(on_desktop)).is_err() {
                            info!("Presence monitor shutting down");
                            return;
                        }
                    }
                    thread::sleep(self.period);
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeSource {
        name: Option<&'static str>,
        calls: Cell<usize>,
    }

    impl ActiveWindowSource for FakeSource {
        fn active_window_name(&self) -> Result<String, PresenceError> {
            self.calls.set(self.calls.get() + 1);
            self.name.map(str::to_string).ok_or(PresenceError::NoActiveWindow)
        }
    }

    fn snapshot(menu_open: bool, hide: bool) -> WorkerSnapshot {
        WorkerSnapshot {
            menu_open,
            hide_when_not_desktop: hide,
            ..WorkerSnapshot::default()
        }
    }

    #[test]
    fn test_desktop_names() {
        assert!(is_desktop_name(""));
        assert!(is_desktop_name("Desktop"));
        assert!(is_desktop_name("Masaüstü"));
        assert!(is_desktop_name("gnome-shell"));
        assert!(!is_desktop_name("Mozilla Firefox"));
        assert!(!is_desktop_name("Terminal"));
    }

    #[test]
    fn test_failures_fail_open() {
        assert!(classify(Err(PresenceError::NoActiveWindow)));
        assert!(classify(Err(PresenceError::Query("connection reset".into()))));
        assert!(!classify(Ok("vim".into())));
    }

    #[test]
    fn test_skips_without_querying() {
        let monitor = PresenceMonitor::new(FakeSource {
            name: Some("Firefox"),
            calls: Cell::new(0),
        });

        assert_eq!(monitor.poll_once(&snapshot(true, true)), None);
        assert_eq!(monitor.poll_once(&snapshot(false, false)), None);
        assert_eq!(monitor.source.calls.get(), 0);

        assert_eq!(monitor.poll_once(&snapshot(false, true)), Some(false));
        assert_eq!(monitor.source.calls.get(), 1);
    }

    #[test]
    fn test_no_focus_is_desktop() {
        let monitor = PresenceMonitor::new(FakeSource {
            name: None,
            calls: Cell::new(0),
        });
        assert_eq!(monitor.poll_once(&snapshot(false, true)), Some(true));
    }
}
