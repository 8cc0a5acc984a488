//! Double-tap coalescing
//!
//! A single key press or tap can arrive twice in quick succession. The gate
//! admits a command only if at least `min_interval` has passed since the
//! last admitted one.

use std::time::{Duration, Instant};

/// Minimum spacing between two accepted point submissions
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct CommandGate {
    min_interval: Duration,
    last_admitted: Option<Instant>,
}

impl Default for CommandGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

impl CommandGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_admitted: None,
        }
    }

    /// Admit a command at `now`, or reject it as a duplicate.
    ///
    /// Rejected submissions do not push the window forward, so a stream of
    /// bounces cannot lock input out indefinitely.
    pub fn admit(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_admitted {
            if now.saturating_duration_since(last) < self.min_interval {
                return false;
            }
        }
        self.last_admitted = Some(now);
        true
    }

    /// Forget the last admitted command
    pub fn clear(&mut self) {
        self.last_admitted = None;
    }
}
