//! Limiter records and constants

use crate::config::RateLimitPolicy;
use crate::context::RequestContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Length of the tumbling accounting window
pub const WINDOW: Duration = Duration::from_secs(60);

/// Waits at or above this are recorded as delayed
pub const DELAY_THRESHOLD: Duration = Duration::from_millis(50);

/// Number of delayed records retained across all keys
pub const HISTORY_CAPACITY: usize = 200;

/// A caller suspended in `acquire` waiting for capacity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEntry {
    pub id: Uuid,
    pub key: String,
    pub context: RequestContext,
    pub added_at: DateTime<Utc>,
}

impl PendingEntry {
    pub(crate) fn new(key: &str, context: RequestContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: key.to_string(),
            context,
            added_at: Utc::now(),
        }
    }
}

/// Historical record of an admission that had to wait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayedEntry {
    pub key: String,
    pub context: RequestContext,
    pub added_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub waited_ms: u64,
}

/// Outcome of a successful `acquire`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// Key the caller was admitted under
    pub key: String,
    /// Time spent suspended before admission
    pub waited: Duration,
    /// Whether the caller went through the waiter queue
    pub queued: bool,
}

impl Admission {
    pub(crate) fn immediate(key: &str) -> Self {
        Self {
            key: key.to_string(),
            waited: Duration::ZERO,
            queued: false,
        }
    }
}

/// Current window counters for one key
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowUsage {
    pub key: String,
    pub policy: RateLimitPolicy,
    pub request_count: u32,
    pub tokens_used: u64,
    /// Milliseconds until the current window resets
    pub resets_in_ms: u64,
    /// Callers currently queued on this key
    pub waiting: usize,
}
