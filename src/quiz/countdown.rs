// src/quiz/countdown.rs

use std::time::{Duration, Instant};

/// A pausable integer-seconds countdown.
///
/// The session state machine owns at most one of these at a time. There is
/// no background tick task: every method takes the caller's `Instant`, so
/// expiry is materialized when the next event is applied (and tests can
/// fabricate time). Dropping the countdown cancels it.
#[derive(Debug, Clone)]
pub struct Countdown {
    /// Time left as of `running_since` (or exactly, while paused).
    remaining: Duration,
    /// `Some` while running, `None` while paused.
    running_since: Option<Instant>,
}

impl Countdown {
    /// Starts a running countdown of `duration` at `now`.
    pub fn start(duration: Duration, now: Instant) -> Self {
        Countdown {
            remaining: duration,
            running_since: Some(now),
        }
    }

    /// Freezes the remaining time. No-op if already paused.
    pub fn pause(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.remaining = self
                .remaining
                .saturating_sub(now.saturating_duration_since(since));
        }
    }

    /// Resumes ticking from the frozen remainder. No-op if already running.
    pub fn resume(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        match self.running_since {
            Some(since) => self
                .remaining
                .saturating_sub(now.saturating_duration_since(since)),
            None => self.remaining,
        }
    }

    pub fn remaining_seconds(&self, now: Instant) -> u64 {
        self.remaining(now).as_secs()
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.remaining(now).is_zero()
    }
}
