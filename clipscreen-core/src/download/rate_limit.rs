//! Rolling-window limiter for download starts.
//!
//! Keeps the start instants of the downloads admitted within the current
//! window. A new start is admitted once fewer than `max_calls` of those
//! instants are younger than `period`; otherwise the caller sleeps until the
//! oldest one ages out.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    period: Duration,
    starts: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, period: Duration) -> Self {
        Self {
            max_calls,
            period,
            starts: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Blocks until the window admits another start, then records it.
    /// Returns how long the caller was made to wait.
    pub fn acquire(&self) -> Duration {
        let mut waited = Duration::ZERO;
        loop {
            let wait = match self.admit(Instant::now()) {
                None => return waited,
                Some(wait) => wait,
            };
            log::info!(
                "Rate limit reached ({} downloads per {:.0}s), waiting {:.1}s",
                self.max_calls,
                self.period.as_secs_f64(),
                wait.as_secs_f64()
            );
            thread::sleep(wait);
            waited += wait;
        }
    }

    /// Records a start if the window admits one now, without blocking.
    pub fn try_acquire(&self) -> bool {
        self.admit(Instant::now()).is_none()
    }

    /// Starts recorded within the window ending at `now`.
    pub fn in_window(&self) -> usize {
        let mut starts = self.starts.lock().unwrap_or_else(|e| e.into_inner());
        Self::expire(&mut starts, Instant::now(), self.period);
        starts.len()
    }

    /// Admits a start at `now` (returning `None`) or returns how long until
    /// the oldest start in the window expires.
    fn admit(&self, now: Instant) -> Option<Duration> {
        let mut starts = self.starts.lock().unwrap_or_else(|e| e.into_inner());
        Self::expire(&mut starts, now, self.period);

        if starts.len() < self.max_calls {
            starts.push_back(now);
            return None;
        }

        // A zero-capacity limiter would never admit anything; callers
        // validate max_calls > 0 through CoreConfig::validate.
        let oldest = starts.front().copied().unwrap_or(now);
        let remaining = self.period.saturating_sub(now.duration_since(oldest));
        Some(remaining.max(Duration::from_millis(1)))
    }

    fn expire(starts: &mut VecDeque<Instant>, now: Instant, period: Duration) {
        while let Some(oldest) = starts.front() {
            if now.duration_since(*oldest) >= period {
                starts.pop_front();
            } else {
                break;
            }
        }
    }
}
