//! Soft time limits for search stages.
//!
//! A slow stage is reported, never interrupted.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct StageTimer {
    started: Instant,
    threshold: Duration,
}

impl StageTimer {
    #[must_use]
    pub fn start(threshold_ms: u64) -> Self {
        Self {
            started: Instant::now(),
            threshold: Duration::from_millis(threshold_ms),
        }
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    #[must_use]
    pub fn is_slow(&self) -> bool {
        self.started.elapsed() > self.threshold
    }

    /// Log the stage at info level if it ran past the threshold.
    pub fn report(&self, stage: &str, hits: usize) {
        if self.is_slow() {
            tracing::info!(stage, hits, elapsed_ms = self.elapsed_ms(), "slow search stage");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_threshold_is_slow_after_any_delay() {
        let timer = StageTimer::start(0);
        std::thread::sleep(Duration::from_millis(2));
        assert!(timer.is_slow());
        assert!(timer.elapsed_ms() >= 2);
    }

    #[test]
    fn generous_threshold_is_not_slow() {
        let timer = StageTimer::start(60_000);
        assert!(!timer.is_slow());
    }
}
