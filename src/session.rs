use std::time::Duration;

use crate::config::TestConfig;
use crate::stats::RunCounters;
use crate::timer::RunTimers;

/// Everything that lives for exactly one run: created at reset, frozen when
/// the run finishes, discarded by the next reset.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub counters: RunCounters,
    pub started_at: Option<Duration>,
    pub finished_at: Option<Duration>,
    pub timers: RunTimers,
    /// Seconds remaining (timed), words completed (words) or elapsed
    /// seconds (zen)
    pub progress: u32,
    pub live_wpm: u32,
    pub live_accuracy: f64,
}

impl RunContext {
    pub fn new(config: &TestConfig) -> Self {
        Self {
            counters: RunCounters::default(),
            started_at: None,
            finished_at: None,
            timers: RunTimers::default(),
            progress: config.duration.unwrap_or(0),
            live_wpm: 0,
            live_accuracy: 100.0,
        }
    }

    /// Time since the first keystroke, stopping at the finish
    pub fn elapsed(&self, now: Duration) -> Duration {
        match self.started_at {
            Some(start) => self.finished_at.unwrap_or(now).saturating_sub(start),
            None => Duration::ZERO,
        }
    }
}
