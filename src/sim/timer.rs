//! Logical fixed-interval timers
//!
//! Timers count simulated milliseconds only; the host decides how real time
//! maps onto `GameSession::advance`.

use serde::{Deserialize, Serialize};

/// A repeating timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    interval_ms: u32,
    elapsed_ms: u32,
}

impl Timer {
    /// Intervals below 1 ms are raised to 1 ms
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            elapsed_ms: 0,
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Milliseconds until the next firing
    #[inline]
    pub fn until_due(&self) -> u32 {
        self.interval_ms - self.elapsed_ms
    }

    /// Advance by at most `until_due()` ms; returns true when the timer fires
    ///
    /// A firing timer rewinds to zero elapsed.
    pub fn advance(&mut self, ms: u32) -> bool {
        self.elapsed_ms = (self.elapsed_ms + ms).min(self.interval_ms);
        if self.elapsed_ms == self.interval_ms {
            self.elapsed_ms = 0;
            true
        } else {
            false
        }
    }

    /// Restart with a new interval (elapsed time is discarded)
    pub fn restart(&mut self, interval_ms: u32) {
        *self = Self::new(interval_ms);
    }
}

/// Largest real-time step accepted per frame (ms); longer gaps (hidden tab) are cut
pub const MAX_FRAME_MS: f64 = 250.0;

/// Converts real frame times into whole logical milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    /// Fractional milliseconds carried between frames
    carry_ms: f64,
}

impl FrameClock {
    /// Whole milliseconds to advance for a frame that took `elapsed_ms`
    ///
    /// Non-finite or negative frame times advance nothing and leave the carry
    /// untouched.
    pub fn step(&mut self, elapsed_ms: f64) -> u32 {
        if !elapsed_ms.is_finite() {
            log::warn!("Ignoring non-finite frame time {elapsed_ms}");
            return 0;
        }
        let total = self.carry_ms + elapsed_ms.clamp(0.0, MAX_FRAME_MS);
        let whole = total.floor();
        self.carry_ms = total - whole;
        whole as u32
    }

    pub fn reset(&mut self) {
        self.carry_ms = 0.0;
    }
}
