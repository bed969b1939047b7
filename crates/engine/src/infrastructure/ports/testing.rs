//! Testability ports for injecting time and randomness.

use chrono::{DateTime, Utc};

// =============================================================================
// Testability Ports
// =============================================================================

pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub trait RandomPort: Send + Sync {
    /// Uniform integer in `min..=max`.
    fn gen_range(&self, min: i32, max: i32) -> i32;

    /// Uniform index into a slice of length `len` (`len` > 0).
    fn pick(&self, len: usize) -> usize {
        let max = len.saturating_sub(1).min(i32::MAX as usize) as i32;
        self.gen_range(0, max).clamp(0, max) as usize
    }
}
