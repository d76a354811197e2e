// server/src/services/rate_limiter.rs

//! Fixed-window limiter for failed logins.
//!
//! Only failures count. Counters live in this process and are lost on
//! restart; several server instances each keep their own.
//!
//! An attempt is reserved before the credentials are checked and settled once
//! the outcome is known. Reservations count against the budget, so parallel
//! requests from one client cannot get past the limit together.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::warn;

const PURGE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
  started: Instant,
  failures: u32,
  in_flight: u32,
}

impl Window {
  fn idle(&self) -> bool {
    self.failures == 0 && self.in_flight == 0
  }
}

#[derive(Debug)]
pub struct LoginRateLimiter {
  max_failures: u32,
  window: Duration,
  windows: Mutex<HashMap<String, Window>>,
}

impl LoginRateLimiter {
  pub fn new(max_failures: u32, window: Duration) -> Self {
    Self {
      max_failures,
      window,
      windows: Mutex::new(HashMap::new()),
    }
  }

  /// Reserves one attempt for `key`. `Err(retry_after_secs)` once the window's
  /// failures plus the attempts still in flight reach the limit.
  pub fn begin_attempt(&self, key: &str) -> Result<(), u64> {
    self.begin_attempt_at(key, Instant::now())
  }

  pub fn begin_attempt_at(&self, key: &str, now: Instant) -> Result<(), u64> {
    let mut windows = self.windows.lock();
    if windows.len() > PURGE_THRESHOLD {
      let window = self.window;
      windows.retain(|_, w| w.in_flight > 0 || now.duration_since(w.started) < window);
    }

    let entry = windows.entry(key.to_string()).or_insert(Window {
      started: now,
      failures: 0,
      in_flight: 0,
    });
    if now.duration_since(entry.started) >= self.window {
      entry.started = now;
      entry.failures = 0;
    }

    if entry.failures + entry.in_flight >= self.max_failures {
      let remaining = self.window.saturating_sub(now.duration_since(entry.started));
      let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
      warn!(key, failures = entry.failures, in_flight = entry.in_flight, retry_after_secs = secs, "Login rate limit reached.");
      return Err(secs.max(1));
    }
    entry.in_flight += 1;
    Ok(())
  }

  /// Settles a reservation made by [`begin_attempt`](Self::begin_attempt).
  pub fn finish_attempt(&self, key: &str, failed: bool) {
    self.finish_attempt_at(key, failed, Instant::now())
  }

  pub fn finish_attempt_at(&self, key: &str, failed: bool, now: Instant) {
    let mut windows = self.windows.lock();
    let Some(entry) = windows.get_mut(key) else {
      return;
    };
    entry.in_flight = entry.in_flight.saturating_sub(1);
    if failed {
      // The window opens with the first failure.
      if entry.failures == 0 || now.duration_since(entry.started) >= self.window {
        entry.started = now;
        entry.failures = 0;
      }
      entry.failures += 1;
    }
    if entry.idle() {
      windows.remove(key);
    }
  }

  pub fn tracked_keys(&self) -> usize {
    self.windows.lock().len()
  }
}
