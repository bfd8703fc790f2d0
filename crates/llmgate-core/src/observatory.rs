//! Read-only view of the limiter's live state

use crate::error::GateResult;
use crate::limiter::{DelayedEntry, KeyedRateLimiter, PendingEntry, WindowUsage};
use serde::Serialize;

/// What is waiting now and what recently had to wait
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    /// Suspended callers across all keys, oldest first
    pub pending: Vec<PendingEntry>,
    /// Delayed admissions in insertion order, oldest first
    pub recent_delayed: Vec<DelayedEntry>,
}

/// Observer over a gateway's limiter.
///
/// Reads never mutate limiter state and never wait on a queue.
#[derive(Debug, Clone)]
pub struct QueueObservatory {
    limiter: KeyedRateLimiter,
}

impl QueueObservatory {
    pub fn new(limiter: KeyedRateLimiter) -> Self {
        Self { limiter }
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            pending: self.limiter.pending(),
            recent_delayed: self.limiter.recent_delayed(),
        }
    }

    /// Snapshot as the JSON document served to dashboards
    pub fn snapshot_json(&self) -> GateResult<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    /// Per-key window counters
    pub fn windows(&self) -> Vec<WindowUsage> {
        self.limiter.window_usage()
    }

    pub fn pending_count(&self) -> usize {
        self.limiter.pending_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitPolicy;
    use crate::context::RequestContext;
    use std::time::Duration;

    #[tokio::test]
    async fn test_empty_snapshot_json() {
        let observatory = QueueObservatory::new(KeyedRateLimiter::new());
        let json: serde_json::Value =
            serde_json::from_str(&observatory.snapshot_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"pending": [], "recentDelayed": []})
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_tracks_waiters() {
        let limiter = KeyedRateLimiter::new();
        let observatory = QueueObservatory::new(limiter.clone());
        let policy = RateLimitPolicy::unlimited().with_requests_per_minute(1);
        let context = RequestContext::workflow("wf-7", "ex-1");

        limiter.acquire("k", &policy, &context).await;

        let waiter = {
            let limiter = limiter.clone();
            let context = context.clone();
            tokio::spawn(async move { limiter.acquire("k", &policy, &context).await })
        };
        while observatory.pending_count() == 0 {
            tokio::task::yield_now().await;
        }

        let snapshot = observatory.snapshot();
        assert_eq!(snapshot.pending.len(), 1);
        assert_eq!(snapshot.pending[0].key, "k");
        assert_eq!(snapshot.pending[0].context, context);
        assert!(snapshot.recent_delayed.is_empty());

        let windows = observatory.windows();
        assert_eq!(windows[0].request_count, 1);
        assert_eq!(windows[0].waiting, 1);

        let admission = waiter.await.unwrap();
        assert_eq!(admission.waited, Duration::from_secs(60));

        let snapshot = observatory.snapshot();
        assert!(snapshot.pending.is_empty());
        assert_eq!(snapshot.recent_delayed.len(), 1);

        let json = serde_json::to_value(&snapshot).unwrap();
        let delayed = &json["recentDelayed"][0];
        assert_eq!(delayed["key"], "k");
        assert_eq!(delayed["waitedMs"], 60_000);
        assert_eq!(delayed["context"]["workflowId"], "wf-7");
        assert!(delayed["addedAt"].is_string());
        assert!(delayed["completedAt"].is_string());
    }
}
