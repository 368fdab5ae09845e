// OPC UA NodeSet exporter for Rust
// SPDX-License-Identifier: MPL-2.0

//! A simple elapsed-time helper with millisecond resolution.

use std::time::{Duration, Instant};

/// Measures wall time from construction (or the last [`PerfTimer::reset`])
/// on a monotonic clock.
#[derive(Debug, Clone)]
pub struct PerfTimer {
    start: Instant,
}

impl Default for PerfTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl PerfTimer {
    /// Create a timer and mark the starting point.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Restart the timer.
    pub fn reset(&mut self) {
        self.start = Instant::now();
    }

    /// Time elapsed since the starting point.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed time formatted as `HH:MM:SS.mmm`.
    pub fn elapsed_string(&self) -> String {
        Self::duration_to_string(self.elapsed())
    }

    /// Format a duration as `HH:MM:SS.mmm`.
    pub fn duration_to_string(duration: Duration) -> String {
        let millis = duration.as_millis();
        let hours = millis / 3_600_000;
        let minutes = millis / 60_000 % 60;
        let seconds = millis / 1000 % 60;
        let millis = millis % 1000;
        format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
    }
}
