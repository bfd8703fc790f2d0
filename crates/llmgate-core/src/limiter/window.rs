//! Tumbling window counters for a single key

use super::types::WINDOW;
use crate::config::RateLimitPolicy;
use tokio::time::Instant;

/// Request and token counters for one key within a fixed 60 second window.
///
/// Both counters only grow inside a window and are reset together.
#[derive(Debug, Clone)]
pub struct RateWindowState {
    window_started_at: Instant,
    request_count: u32,
    tokens_used: u64,
}

impl RateWindowState {
    pub fn new(now: Instant) -> Self {
        Self {
            window_started_at: now,
            request_count: 0,
            tokens_used: 0,
        }
    }

    /// Start a fresh window if the current one has expired.
    ///
    /// Returns true when a reset happened.
    pub fn roll(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.window_started_at) >= WINDOW {
            self.window_started_at = now;
            self.request_count = 0;
            self.tokens_used = 0;
            true
        } else {
            false
        }
    }

    /// Whether both dimensions of `policy` have room left
    pub fn admits(&self, policy: &RateLimitPolicy) -> bool {
        let requests_ok = policy
            .requests_per_minute
            .is_none_or(|limit| self.request_count < limit);
        let tokens_ok = policy
            .tokens_per_minute
            .is_none_or(|limit| self.tokens_used < u64::from(limit));
        requests_ok && tokens_ok
    }

    /// Count one admitted request
    pub fn admit(&mut self) {
        self.request_count = self.request_count.saturating_add(1);
    }

    /// Debit tokens reported by a completed call
    pub fn debit(&mut self, tokens: u64) {
        self.tokens_used = self.tokens_used.saturating_add(tokens);
    }

    /// Instant at which the current window expires
    pub fn resets_at(&self) -> Instant {
        self.window_started_at + WINDOW
    }

    pub fn request_count(&self) -> u32 {
        self.request_count
    }

    pub fn tokens_used(&self) -> u64 {
        self.tokens_used
    }
}
