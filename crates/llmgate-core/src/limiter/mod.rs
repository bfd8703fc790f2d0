//! Keyed admission control for provider calls
//!
//! Every rate limit key owns one [`RateWindowState`] and one FIFO queue of
//! waiters, guarded by a per-key lock so unrelated keys never contend. Requests
//! are gated up front; tokens are only debited after a response arrives, so the
//! token dimension tightens future admissions instead of gating the current one.

mod history;
mod keyed;
mod types;
mod window;


pub use keyed::KeyedRateLimiter;
pub use types::{
    Admission, DELAY_THRESHOLD, DelayedEntry, HISTORY_CAPACITY, PendingEntry, WINDOW, WindowUsage,
};
pub use window::RateWindowState;
