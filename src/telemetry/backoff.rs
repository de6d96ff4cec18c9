//! Retry pacing for socket (re)binding
//!
//! Each failure multiplies the wait by 1.5 up to a 30 s ceiling. A success
//! resets the schedule. There is no attempt limit: the channel keeps trying
//! for as long as the process runs.

use std::time::{Duration, Instant};

pub const BACKOFF_FACTOR: f64 = 1.5;
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Backoff {
    name: &'static str,
    attempts: u32,
    base: Duration,
    current: Duration,
    last_attempt: Option<Instant>,
}

impl Backoff {
    pub fn new(name: &'static str, base: Duration) -> Self {
        Self {
            name,
            attempts: 0,
            base,
            current: base,
            last_attempt: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Consecutive failures since the last success
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Wait that applies after the most recent failure
    pub fn current_delay(&self) -> Duration {
        self.current
    }

    /// Whether enough time has passed since the last failure to try again.
    pub fn can_retry(&self) -> bool {
        self.can_retry_at(Instant::now())
    }

    pub fn can_retry_at(&self, now: Instant) -> bool {
        match self.last_attempt {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.current,
        }
    }

    /// Record a failed attempt and return the wait before the next one.
    pub fn record_failure(&mut self) -> Duration {
        self.record_failure_at(Instant::now())
    }

    pub fn record_failure_at(&mut self, now: Instant) -> Duration {
        if self.attempts > 0 {
            let next = self.current.as_secs_f64() * BACKOFF_FACTOR;
            self.current = Duration::from_secs_f64(next.min(MAX_BACKOFF.as_secs_f64()));
        }
        self.attempts += 1;
        self.last_attempt = Some(now);
        self.current
    }

    pub fn record_success(&mut self) {
        self.attempts = 0;
        self.current = self.base;
        self.last_attempt = None;
    }
}
