use std::time::Duration;
use tracing::debug;

/// Cadence shared by the mode tick and the live-metrics tick
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Opaque handle for a scheduled timer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// One firing of a timer and the deadline it was due at. A late poll
/// reports the original deadline, not the poll time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Firing {
    pub handle: TimerHandle,
    pub due: Duration,
}

/// Schedules future ticks without blocking. Time is passed in explicitly so
/// the same scheduler works with a wall clock or a manual one.
pub trait Scheduler {
    fn schedule_repeating(&mut self, now: Duration, every: Duration) -> TimerHandle;

    fn schedule_once(&mut self, now: Duration, after: Duration) -> TimerHandle;

    /// Cancelling an unknown or already fired handle is a no-op.
    fn cancel(&mut self, handle: TimerHandle);

    /// Drains every firing due at or before `now`, earliest deadline first.
    /// Ties fire in scheduling order. A repeating timer that fell behind
    /// fires once per missed interval, each firing carrying its own deadline.
    fn poll_due(&mut self, now: Duration) -> Vec<Firing>;
}

#[derive(Debug, Clone)]
struct Entry {
    handle: TimerHandle,
    due: Duration,
    every: Option<Duration>,
}

/// In-process timer queue
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    entries: Vec<Entry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, due: Duration, every: Option<Duration>) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { handle, due, every });
        handle
    }
}

impl Scheduler for TimerQueue {
    fn schedule_repeating(&mut self, now: Duration, every: Duration) -> TimerHandle {
        // a zero period would never let poll_due return
        let every = every.max(Duration::from_millis(1));
        self.push(now + every, Some(every))
    }

    fn schedule_once(&mut self, now: Duration, after: Duration) -> TimerHandle {
        self.push(now + after, None)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.entries.retain(|e| e.handle != handle);
    }

    fn poll_due(&mut self, now: Duration) -> Vec<Firing> {
        let mut fired = Vec::new();

        loop {
            let next = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.due <= now)
                .min_by_key(|(_, e)| (e.due, e.handle))
                .map(|(i, _)| i);

            let Some(idx) = next else { break };

            let entry = &self.entries[idx];
            fired.push(Firing {
                handle: entry.handle,
                due: entry.due,
            });
            match self.entries[idx].every {
                Some(every) => self.entries[idx].due += every,
                None => {
                    self.entries.remove(idx);
                }
            }
        }

        fired
    }
}

/// What an engine-owned timer is for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Countdown (timed modes) or elapsed-seconds (zen) tick
    Mode,
    /// Live WPM / accuracy sampling
    Metrics,
    /// Deferred completion in words mode
    Finish,
}

/// Handles a run has outstanding. Anything not listed here is stale.
#[derive(Debug, Default, Clone)]
pub struct RunTimers {
    pub mode: Option<TimerHandle>,
    pub metrics: Option<TimerHandle>,
    pub finish: Option<TimerHandle>,
}

impl RunTimers {
    pub fn kind_of(&self, handle: TimerHandle) -> Option<TimerKind> {
        if self.mode == Some(handle) {
            Some(TimerKind::Mode)
        } else if self.metrics == Some(handle) {
            Some(TimerKind::Metrics)
        } else if self.finish == Some(handle) {
            Some(TimerKind::Finish)
        } else {
            None
        }
    }

    pub fn is_idle(&self) -> bool {
        self.mode.is_none() && self.metrics.is_none() && self.finish.is_none()
    }

    pub fn cancel_all<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        for handle in [self.mode.take(), self.metrics.take(), self.finish.take()]
            .into_iter()
            .flatten()
        {
            debug!(?handle, "cancel timer");
            scheduler.cancel(handle);
        }
    }
}
