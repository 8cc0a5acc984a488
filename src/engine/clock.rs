//! Match clock
//!
//! Counts whole elapsed seconds while running. There is exactly one
//! scheduling anchor: starting sets it, stopping clears it, so a running
//! clock can never have two tickers. Fractions of a second pending at stop
//! are dropped, the same as cancelling an interval timer.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Read-only view of the clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub duration_seconds: u64,
    pub running: bool,
}

/// Elapsed match time
#[derive(Debug, Clone, Default)]
pub struct MatchClock {
    duration_seconds: u64,
    /// When the next pending second started counting; `None` while stopped
    anchor: Option<Instant>,
}

impl MatchClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total whole seconds counted so far
    #[cfg(test)]
    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    pub fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            duration_seconds: self.duration_seconds,
            running: self.is_running(),
        }
    }

    /// Start counting from `now`. No-op if already running.
    pub fn start(&mut self, now: Instant) {
        if self.anchor.is_none() {
            self.anchor = Some(now);
        }
    }

    /// Credit the seconds completed up to `now`, then stop.
    pub fn stop(&mut self, now: Instant) {
        self.tick(now);
        self.anchor = None;
    }

    /// Flip between running and stopped
    pub fn toggle(&mut self, now: Instant) {
        if self.is_running() {
            self.stop(now);
        } else {
            self.start(now);
        }
    }

    /// Back to zero and stopped
    pub fn reset(&mut self) {
        self.duration_seconds = 0;
        self.anchor = None;
    }

    /// Advance by every whole second completed since the last tick.
    ///
    /// Returns the number of seconds added. Does nothing while stopped.
    pub fn tick(&mut self, now: Instant) -> u64 {
        let Some(anchor) = self.anchor else {
            return 0;
        };
        let elapsed = now.saturating_duration_since(anchor);
        let whole = elapsed.as_secs();
        if whole > 0 {
            self.duration_seconds += whole;
            self.anchor = Some(anchor + Duration::from_secs(whole));
        }
        whole
    }
}

/// Format seconds as `MM:SS`, or `H:MM:SS` once past an hour
pub fn format_duration(seconds: u64) -> String {
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hrs > 0 {
        format!("{}:{:02}:{:02}", hrs, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}
