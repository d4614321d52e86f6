//! Fixed-window rate limiter
//!
//! Each identity gets a window that starts at its first request and lasts
//! `window`. Up to `max_requests` calls are allowed inside it; later calls
//! are denied until the window elapses and a fresh one starts.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Default maximum requests per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 5;

/// Default window duration in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 60;

/// Configuration for the rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per identity within one window.
    pub max_requests: u32,
    /// Window length, measured from the first request in it.
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, Duration::from_secs(DEFAULT_WINDOW_SECS))
    }
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Request admitted; `remaining` more fit in the current window.
    Allowed { remaining: u32 },
    /// Quota spent; the window resets after `retry_after`.
    Denied { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    window_start: Instant,
    count: u32,
}

impl RateWindow {
    fn start(now: Instant) -> Self {
        Self {
            window_start: now,
            count: 0,
        }
    }

    // The window covers [window_start, window_start + window).
    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.window_start) >= window
    }

    fn resets_in(&self, now: Instant, window: Duration) -> Duration {
        window.saturating_sub(now.saturating_duration_since(self.window_start))
    }
}

/// Per-identity fixed-window rate limiter.
///
/// The whole read-increment-compare step runs under one lock, so two
/// concurrent requests can never both take the last slot.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, RateWindow>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Counts a request from `identity` against its current window.
    pub fn check(&self, identity: &str) -> RateDecision {
        self.check_at(identity, Instant::now())
    }

    /// Same as [`check`](Self::check) with an explicit clock reading.
    pub fn check_at(&self, identity: &str, now: Instant) -> RateDecision {
        let mut windows = self.lock();

        let window = windows
            .entry(identity.to_string())
            .or_insert_with(|| RateWindow::start(now));

        if window.is_expired(now, self.config.window) {
            *window = RateWindow::start(now);
        }

        // Denied requests still count, so a full window stays full.
        window.count = window.count.saturating_add(1);

        if window.count > self.config.max_requests {
            RateDecision::Denied {
                retry_after: window.resets_in(now, self.config.window),
            }
        } else {
            RateDecision::Allowed {
                remaining: self.config.max_requests - window.count,
            }
        }
    }

    /// Drops windows that have already elapsed. Returns how many were removed.
    pub fn prune_expired(&self, now: Instant) -> usize {
        let mut windows = self.lock();
        let before = windows.len();
        windows.retain(|_, window| !window.is_expired(now, self.config.window));
        before - windows.len()
    }

    /// Number of identities with a live or not-yet-pruned window.
    pub fn tracked_identities(&self) -> usize {
        self.lock().len()
    }

    // A poisoned table only means a panic mid-check; the counts are still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, RateWindow>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
