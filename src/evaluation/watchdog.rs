//! Termination watchdog
//!
//! The watchdog polls the sensor on a fixed interval and decides when a run
//! is over. It is the only writer of the termination flag.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::evaluation::environment::Reading;

/// Why a run was ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The sensor reported the run as over
    Terminal,
    /// Progress stopped changing
    Stagnated,
    /// The time limit ran out
    Deadline,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Terminal => write!(f, "terminal"),
            TerminationReason::Stagnated => write!(f, "stagnated"),
            TerminationReason::Deadline => write!(f, "deadline"),
        }
    }
}

/// Detects progress that has stopped changing
///
/// Keeps the last `window` known progress values; unknown readings are
/// skipped so a misread frame neither breaks nor extends a streak.
#[derive(Clone, Debug)]
pub struct StagnationDetector {
    window: usize,
    recent: VecDeque<f64>,
}

impl StagnationDetector {
    /// Create a detector over `window` consecutive known readings
    pub fn new(window: usize) -> Self {
        assert!(window >= 2, "Stagnation window must cover at least two readings");
        Self {
            window,
            recent: VecDeque::with_capacity(window),
        }
    }

    /// Record a reading; returns true once the window is full of one value
    pub fn observe(&mut self, progress: Option<f64>) -> bool {
        if let Some(value) = progress {
            if self.recent.len() == self.window {
                self.recent.pop_front();
            }
            self.recent.push_back(value);
        }
        self.is_stagnant()
    }

    /// Whether the last `window` known readings were identical
    pub fn is_stagnant(&self) -> bool {
        self.recent.len() == self.window
            && self.recent.iter().all(|&v| v == self.recent[0])
    }

    /// Most recent known reading
    pub fn last(&self) -> Option<f64> {
        self.recent.back().copied()
    }

    /// Forget every reading
    pub fn reset(&mut self) {
        self.recent.clear();
    }
}

/// Outcome of one watch
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatchReport {
    /// Why the watch ended
    pub reason: TerminationReason,
    /// Last known-good progress seen while running
    pub last_progress: Option<f64>,
    /// Time from the start of the run to termination
    pub elapsed: Duration,
}

impl WatchReport {
    /// Whether the environment ended the run itself
    pub fn saw_terminal(&self) -> bool {
        self.reason == TerminationReason::Terminal
    }
}

/// Raises the termination flag when dropped, including during an unwind
struct StopOnDrop<'a>(&'a AtomicBool);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Polls a sensor until the run ends
#[derive(Clone, Debug)]
pub struct Watchdog {
    pub poll_interval: Duration,
    pub stagnation_window: usize,
    pub time_limit: Duration,
}

impl Watchdog {
    /// Create a watchdog
    pub fn new(poll_interval: Duration, stagnation_window: usize, time_limit: Duration) -> Self {
        Self {
            poll_interval,
            stagnation_window,
            time_limit,
        }
    }

    /// Poll `sample` until termination, then raise `stop`
    ///
    /// Polls happen every `poll_interval` after `start`, except that the
    /// last sleep is cut short at the deadline. `stop` is raised on every
    /// exit path, so a panic in `sample` still releases the actuator.
    pub fn watch<F>(&self, mut sample: F, stop: &AtomicBool, start: Instant) -> WatchReport
    where
        F: FnMut() -> Reading,
    {
        let _stop_guard = StopOnDrop(stop);
        let mut detector = StagnationDetector::new(self.stagnation_window);
        let mut last_progress = None;

        loop {
            let remaining = self.time_limit.saturating_sub(start.elapsed());
            thread::sleep(self.poll_interval.min(remaining));

            let reading = sample();
            if reading.progress.is_some() {
                last_progress = reading.progress;
            }
            let stagnant = detector.observe(reading.progress);
            let elapsed = start.elapsed();

            let reason = if reading.terminal {
                Some(TerminationReason::Terminal)
            } else if stagnant {
                Some(TerminationReason::Stagnated)
            } else if elapsed >= self.time_limit {
                Some(TerminationReason::Deadline)
            } else {
                None
            };

            if let Some(reason) = reason {
                return WatchReport {
                    reason,
                    last_progress,
                    elapsed,
                };
            }
        }
    }
}
