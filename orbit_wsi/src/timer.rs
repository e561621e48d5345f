//! Frame timer for presentation pacing
//!
//! Tracks per-frame deltas and total elapsed time for the session's frame
//! loop. Supports both wall-clock sampling (self-managed presentation) and
//! externally supplied timestamps (external frame mode).

use std::time::Instant;

/// Per-frame timer owned by the platform provider
///
/// All values are in seconds. `frame()` samples the wall clock;
/// `frame_external()` advances using a host-supplied absolute timestamp
/// instead. The two share the same "last sample" state, so a session
/// switching modes should `reset()` first (the session does this when an
/// external swapchain is installed).
#[derive(Debug)]
pub struct FrameTimer {
    start: Instant,
    /// Time of the most recent frame sample, relative to the epoch
    last: f64,
    /// Delta of the most recent frame
    frame_time: f64,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last: 0.0,
            frame_time: 0.0,
        }
    }

    /// Restart the epoch; the next frame delta is measured from now
    pub fn reset(&mut self) {
        self.start = Instant::now();
        self.last = 0.0;
        self.frame_time = 0.0;
    }

    /// Advance one frame using wall time, returning the frame delta in seconds
    pub fn frame(&mut self) -> f64 {
        let now = self.start.elapsed().as_secs_f64();
        self.frame_time = (now - self.last).max(0.0);
        self.last = now;
        self.frame_time
    }

    /// Advance one frame using a host-supplied absolute time in seconds
    ///
    /// Returns the delta versus the previous sample. Used in external frame
    /// mode where the compositor owns pacing.
    pub fn frame_external(&mut self, time: f64) -> f64 {
        self.frame_time = (time - self.last).max(0.0);
        self.last = time;
        self.frame_time
    }

    /// Seconds since the epoch, as of the most recent frame sample
    pub fn elapsed(&self) -> f64 {
        self.last
    }

    /// Delta of the most recent frame in seconds
    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
