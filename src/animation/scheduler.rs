//! Animation scheduler
//!
//! A self-perpetuating chain on the timer wheel: each tick renders the current
//! frame, advances the index and asks to be rescheduled after the interval.
//! The chain ends as soon as playback stops or there is nothing to show.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use super::Frame;
use crate::error::LoadError;
use crate::platform::Surface;

/// Shortest frame interval accepted from the config
pub const MIN_INTERVAL_MS: u64 = 10;

/// Index, play flag and interval of the running animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    pub frame_index: usize,
    pub playing: bool,
    pub frame_count: usize,
    pub interval: Duration,
}

/// What the coordinator should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Schedule the next tick after this delay
    Continue(Duration),
    /// Playback ended; do not reschedule
    Stopped,
}

/// Next frame index, wrapping after the last frame
pub fn advance(index: usize, frame_count: usize) -> usize {
    if frame_count == 0 {
        0
    } else {
        (index + 1) % frame_count
    }
}

pub struct AnimationScheduler {
    frames: Vec<Frame>,
    frame_index: usize,
    playing: bool,
    interval: Duration,
}

impl AnimationScheduler {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            frames: Vec::new(),
            frame_index: 0,
            playing: false,
            interval: Duration::from_millis(interval_ms.max(MIN_INTERVAL_MS)),
        }
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            frame_index: self.frame_index,
            playing: self.playing,
            frame_count: self.frames.len(),
            interval: self.interval,
        }
    }

    pub fn has_frames(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Frame most recently shown (used to repaint after an expose)
    pub fn last_frame(&self) -> Option<&Frame> {
        if self.frames.is_empty() {
            return None;
        }
        let shown = (self.frame_index + self.frames.len() - 1) % self.frames.len();
        self.frames.get(shown)
    }

    /// Swap in a freshly decoded frame sequence.
    ///
    /// An empty sequence leaves the current frames and playback untouched.
    pub fn replace_frames(&mut self, frames: Vec<Frame>, source: &Path) -> Result<(), LoadError> {
        if frames.is_empty() {
            return Err(LoadError::NoFrames(source.to_path_buf()));
        }

        debug!("Swapping in {} frames from {:?}", frames.len(), source);
        self.frames = frames;
        self.frame_index = 0;
        self.playing = true;
        Ok(())
    }

    /// Flip play/pause; returns the new play state. Playback cannot start
    /// without frames.
    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing && self.has_frames();
        self.playing
    }

    /// Render the current frame and advance.
    ///
    /// A failed render resets to the first frame and tries once more; a second
    /// failure stops playback for good (until the next play toggle or reload).
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S) -> TickOutcome {
        if self.frames.is_empty() {
            self.playing = false;
            return TickOutcome::Stopped;
        }
        if !self.playing {
            return TickOutcome::Stopped;
        }

        if self.frame_index >= self.frames.len() {
            self.frame_index = 0;
        }

        match surface.present_frame(&self.frames[self.frame_index]) {
            Ok(()) => {
                self.frame_index = advance(self.frame_index, self.frames.len());
            }
            Err(e) => {
                warn!("Animation error on frame {}: {:#}", self.frame_index, e);
                self.frame_index = 0;
                if let Err(e) = surface.present_frame(&self.frames[0]) {
                    warn!("Animation retry failed, stopping playback: {:#}", e);
                    self.playing = false;
                    return TickOutcome::Stopped;
                }
                self.frame_index = advance(0, self.frames.len());
            }
        }

        TickOutcome::Continue(self.interval)
    }
}
