//! Per-key FIFO rate limiter

use super::history::DelayedHistory;
use super::types::{Admission, DELAY_THRESHOLD, DelayedEntry, PendingEntry, WindowUsage};
use super::window::RateWindowState;
use crate::config::RateLimitPolicy;
use crate::context::RequestContext;
use crate::error::{GateError, GateResult};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Rate limiter keeping an independent budget and waiter queue per key.
///
/// Cloning shares the underlying state, so the gateway and the observatory
/// see the same counters.
#[derive(Debug, Clone, Default)]
pub struct KeyedRateLimiter {
    inner: Arc<LimiterInner>,
}

#[derive(Debug, Default)]
struct LimiterInner {
    slots: DashMap<String, Arc<KeySlot>>,
    history: DelayedHistory,
}

/// One key's exclusion domain
#[derive(Debug)]
struct KeySlot {
    state: Mutex<KeyState>,
    /// Signalled whenever the head of the queue changes
    notify: Notify,
}

#[derive(Debug)]
struct KeyState {
    window: RateWindowState,
    /// Policy of the most recent `acquire`; consulted by `record_tokens`
    policy: RateLimitPolicy,
    waiters: VecDeque<Waiter>,
}

#[derive(Debug)]
struct Waiter {
    entry: PendingEntry,
    enqueued_at: Instant,
}

impl KeySlot {
    fn new(now: Instant, policy: RateLimitPolicy) -> Self {
        Self {
            state: Mutex::new(KeyState {
                window: RateWindowState::new(now),
                policy,
                waiters: VecDeque::new(),
            }),
            notify: Notify::new(),
        }
    }
}

/// Removes a queued entry if the waiting future goes away before admission,
/// whether through cancellation or by being dropped.
struct QueuedGuard<'a> {
    slot: &'a KeySlot,
    key: &'a str,
    id: Uuid,
    armed: bool,
}

impl Drop for QueuedGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.slot.state.lock();
        let was_head = state.waiters.front().map(|w| w.entry.id) == Some(self.id);
        state.waiters.retain(|w| w.entry.id != self.id);
        let remaining = state.waiters.len();
        drop(state);

        warn!(key = self.key, pending = remaining, "Abandoned wait for admission");
        if was_head {
            self.slot.notify.notify_waiters();
        }
    }
}

impl KeyedRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a limiter whose delayed history keeps `capacity` entries
    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(LimiterInner {
                slots: DashMap::new(),
                history: DelayedHistory::with_capacity(capacity),
            }),
        }
    }

    /// Wait until `key` has capacity under `policy`, then count the request.
    ///
    /// Waiters on the same key are admitted strictly in arrival order.
    pub async fn acquire(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        context: &RequestContext,
    ) -> Admission {
        match self
            .admit(key, policy, context, std::future::pending::<Infallible>())
            .await
        {
            Ok(admission) => admission,
            Err(never) => match never {},
        }
    }

    /// Like [`acquire`](Self::acquire), but gives up when `cancel` fires.
    ///
    /// A cancelled caller leaves the queue without consuming capacity and
    /// without producing a delayed record.
    pub async fn acquire_with_cancel(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        context: &RequestContext,
        cancel: &CancellationToken,
    ) -> GateResult<Admission> {
        self.admit(key, policy, context, cancel.cancelled())
            .await
            .map_err(|_| GateError::cancelled(key))
    }

    /// Admit only if it can happen right now; never queues.
    pub fn try_acquire(&self, key: &str, policy: &RateLimitPolicy) -> bool {
        let slot = self.slot(key, policy);
        let mut state = slot.state.lock();
        state.policy = *policy;
        state.window.roll(Instant::now());
        if policy.is_unbounded() {
            state.window.admit();
            return true;
        }
        if state.waiters.is_empty() && state.window.admits(policy) {
            state.window.admit();
            true
        } else {
            false
        }
    }

    /// Debit tokens reported by a completed call against the window active now.
    ///
    /// A no-op for unknown keys and for keys whose policy has no token budget.
    /// Never wakes waiters: debits only shrink the remaining budget.
    pub fn record_tokens(&self, key: &str, tokens: u64) {
        let Some(slot) = self.inner.slots.get(key).map(|s| Arc::clone(s.value())) else {
            debug!(key, tokens, "Ignoring token debit for unknown key");
            return;
        };

        let mut state = slot.state.lock();
        if !state.policy.limits_tokens() {
            return;
        }
        if state.window.roll(Instant::now()) {
            debug!(key, "Window rolled over before token debit");
        }
        state.window.debit(tokens);
        debug!(
            key,
            tokens,
            tokens_used = state.window.tokens_used(),
            "Recorded token usage"
        );
    }

    /// Currently queued callers across all keys, in enqueue order
    pub fn pending(&self) -> Vec<PendingEntry> {
        let mut pending: Vec<(Instant, PendingEntry)> = self
            .inner
            .slots
            .iter()
            .flat_map(|slot| {
                let state = slot.state.lock();
                let entries: Vec<(Instant, PendingEntry)> = state
                    .waiters
                    .iter()
                    .map(|w| (w.enqueued_at, w.entry.clone()))
                    .collect();
                entries
            })
            .collect();
        // stable sort keeps per-key queue order for equal instants
        pending.sort_by_key(|(enqueued_at, _)| *enqueued_at);
        pending.into_iter().map(|(_, entry)| entry).collect()
    }

    /// Number of callers currently queued across all keys
    pub fn pending_count(&self) -> usize {
        self.inner
            .slots
            .iter()
            .map(|slot| slot.state.lock().waiters.len())
            .sum()
    }

    /// Recent delayed admissions, oldest first
    pub fn recent_delayed(&self) -> Vec<DelayedEntry> {
        self.inner.history.entries()
    }

    /// Window counters for every key seen so far, sorted by key
    pub fn window_usage(&self) -> Vec<WindowUsage> {
        let now = Instant::now();
        let mut usage: Vec<WindowUsage> = self
            .inner
            .slots
            .iter()
            .map(|slot| {
                let state = slot.state.lock();
                // Read-only: an expired window reads as empty without being reset
                let expired = now >= state.window.resets_at();
                WindowUsage {
                    key: slot.key().clone(),
                    policy: state.policy,
                    request_count: if expired { 0 } else { state.window.request_count() },
                    tokens_used: if expired { 0 } else { state.window.tokens_used() },
                    resets_in_ms: state
                        .window
                        .resets_at()
                        .saturating_duration_since(now)
                        .as_millis() as u64,
                    waiting: state.waiters.len(),
                }
            })
            .collect();
        usage.sort_by(|a, b| a.key.cmp(&b.key));
        usage
    }

    fn slot(&self, key: &str, policy: &RateLimitPolicy) -> Arc<KeySlot> {
        if let Some(slot) = self.inner.slots.get(key) {
            return Arc::clone(slot.value());
        }
        let slot = self
            .inner
            .slots
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(KeySlot::new(Instant::now(), *policy)));
        Arc::clone(slot.value())
    }

    /// Admission loop shared by the blocking and cancellable entry points.
    ///
    /// Resolves with `Err` carrying the output of `cancelled` if it completes
    /// before the caller is admitted.
    async fn admit<C>(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        context: &RequestContext,
        cancelled: C,
    ) -> Result<Admission, C::Output>
    where
        C: Future,
    {
        let slot = self.slot(key, policy);

        let id = {
            let mut state = slot.state.lock();
            state.policy = *policy;
            state.window.roll(Instant::now());
            if policy.is_unbounded() {
                state.window.admit();
                return Ok(Admission::immediate(key));
            }

            if state.waiters.is_empty() && state.window.admits(policy) {
                state.window.admit();
                debug!(
                    key,
                    request_count = state.window.request_count(),
                    "Admitted immediately"
                );
                return Ok(Admission::immediate(key));
            }

            let entry = PendingEntry::new(key, context.clone());
            let id = entry.id;
            state.waiters.push_back(Waiter {
                entry,
                enqueued_at: Instant::now(),
            });
            info!(
                key,
                source = %context.source,
                pending = state.waiters.len(),
                request_count = state.window.request_count(),
                tokens_used = state.window.tokens_used(),
                "Rate limit reached, queueing request"
            );
            id
        };

        let mut guard = QueuedGuard {
            slot: slot.as_ref(),
            key,
            id,
            armed: true,
        };
        tokio::pin!(cancelled);

        loop {
            // Registered before the state check so a head change between the
            // check and the select is not missed.
            let notified = slot.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let deadline = {
                let mut state = slot.state.lock();
                let now = Instant::now();
                state.window.roll(now);

                let at_head = state.waiters.front().map(|w| w.entry.id) == Some(id);
                if at_head && state.window.admits(policy) {
                    let admitted = state.waiters.pop_front();
                    state.window.admit();
                    drop(state);
                    guard.armed = false;
                    // Capacity may remain for the next waiter in line
                    slot.notify.notify_waiters();

                    return Ok(match admitted {
                        Some(waiter) => self.complete_wait(key, waiter, now),
                        None => Admission::immediate(key),
                    });
                }
                state.window.resets_at()
            };

            tokio::select! {
                _ = sleep_until(deadline) => {}
                _ = &mut notified => {}
                output = &mut cancelled => {
                    // guard removes the entry and hands the head to the next waiter
                    drop(guard);
                    return Err(output);
                }
            }
        }
    }

    fn complete_wait(&self, key: &str, waiter: Waiter, now: Instant) -> Admission {
        let waited = now.saturating_duration_since(waiter.enqueued_at);
        let waited_ms = waited.as_millis() as u64;

        if waited >= DELAY_THRESHOLD {
            let completed_at = waiter.entry.added_at
                + chrono::Duration::from_std(waited).unwrap_or_else(|_| chrono::Duration::zero());
            self.inner.history.push(DelayedEntry {
                key: key.to_string(),
                context: waiter.entry.context,
                added_at: waiter.entry.added_at,
                completed_at,
                waited_ms,
            });
        }

        info!(key, waited_ms, "Admitted after waiting");
        Admission {
            key: key.to_string(),
            waited,
            queued: true,
        }
    }
}
