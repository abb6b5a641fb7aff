//! Timer wheel
//!
//! All delayed work on the UI loop (animation frames, gradient cycling, the
//! menu grace period, the resize banner, the post-drag wallpaper sample) is a
//! deadline in this queue. The loop sleeps until `next_deadline()` and then
//! fires everything `pop_due()` returns. Time is always passed in, so tests
//! drive it with plain `Instant` arithmetic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Instant;

/// Delayed work owned by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKind {
    /// Render the next animation frame
    AnimationFrame,
    /// Repaint the gradient border with a new spectrum color
    GradientCycle,
    /// Clear the menu-open flag after the menu closed
    MenuGrace,
    /// Remove the resize-mode banner
    ResizeBanner,
    /// Forced wallpaper sample shortly after a drag started
    DragSample,
}

#[derive(Debug, Default)]
pub struct Timers {
    queue: BinaryHeap<Reverse<(Instant, u64, TimerKind)>>,
    seq: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` at `at`, replacing any pending timer of the same kind
    pub fn schedule(&mut self, kind: TimerKind, at: Instant) {
        self.cancel(kind);
        self.seq += 1;
        self.queue.push(Reverse((at, self.seq, kind)));
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.queue.retain(|Reverse((_, _, k))| *k != kind);
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.queue.iter().any(|Reverse((_, _, k))| *k == kind)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.peek().map(|Reverse((at, _, _))| *at)
    }

    /// Remove and return every timer due at `now`, earliest first
    pub fn pop_due(&mut self, now: Instant) -> Vec<TimerKind> {
        let mut due = Vec::new();
        while let Some(Reverse((at, _, _))) = self.queue.peek() {
            if *at > now {
                break;
            }
            if let Some(Reverse((_, _, kind))) = self.queue.pop() {
                due.push(kind);
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
