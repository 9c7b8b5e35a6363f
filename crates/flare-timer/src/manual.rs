//! Host-driven timer wheel.
//!
//! # Ordering
//!
//! Expired timers are returned by [`ManualTimer::pop_due`] in
//! `(due_at, token)` order, so two timers due at the same instant fire
//! in the order they were scheduled.
//!
//! Every timer is due strictly after the clock time it was scheduled
//! at. A timer scheduled while draining therefore waits for the next
//! [`advance`](ManualTimer::advance), whatever its delay.
//!
//! # Identity
//!
//! At most one timer is pending per [`BeaconId`]. Scheduling under an
//! identity that already has a pending timer cancels the old one first.

use std::collections::HashMap;

use flare_core::{BeaconId, TimerService, TimerToken};
use indexmap::IndexMap;
use tracing::{trace, warn};

/// A timer that reached its due time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Expired {
    /// Token returned when the timer was scheduled.
    pub token: TimerToken,
    /// Identity the timer was scheduled under.
    pub identity: BeaconId,
    /// Clock time (seconds) at which it was due.
    pub due_at: f64,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    identity: BeaconId,
    due_at: f64,
}

/// Single-shot timer service on a manually advanced clock.
#[derive(Debug, Default)]
pub struct ManualTimer {
    now: f64,
    next_token: u64,
    pending: IndexMap<TimerToken, Entry>,
    by_identity: HashMap<BeaconId, TimerToken>,
}

impl ManualTimer {
    /// Create a timer at clock time zero with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock time in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Move the clock forward by `dt` seconds.
    ///
    /// Negative or non-finite steps are ignored: the clock never runs
    /// backwards.
    pub fn advance(&mut self, dt: f64) {
        if !dt.is_finite() || dt < 0.0 {
            warn!(dt, "ignoring invalid timer advance");
            return;
        }
        self.now += dt;
    }

    /// Remove and return the earliest timer that is due, if any.
    ///
    /// Timers scheduled while draining are never returned by the same
    /// drain: their due time is always later than the current clock.
    pub fn pop_due(&mut self) -> Option<Expired> {
        let (&token, entry) = self
            .pending
            .iter()
            .filter(|(_, e)| e.due_at <= self.now)
            .min_by(|(ta, a), (tb, b)| a.due_at.total_cmp(&b.due_at).then(ta.cmp(tb)))?;
        let expired = Expired {
            token,
            identity: entry.identity,
            due_at: entry.due_at,
        };
        self.remove(token);
        Some(expired)
    }

    /// Whether `token` is still pending.
    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.pending.contains_key(&token)
    }

    /// Pending token for `identity`, if any.
    pub fn token_for(&self, identity: BeaconId) -> Option<TimerToken> {
        self.by_identity.get(&identity).copied()
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Due time of the earliest pending timer.
    pub fn next_due(&self) -> Option<f64> {
        self.pending
            .values()
            .map(|e| e.due_at)
            .min_by(|a, b| a.total_cmp(b))
    }

    fn remove(&mut self, token: TimerToken) -> bool {
        match self.pending.shift_remove(&token) {
            Some(entry) => {
                if self.by_identity.get(&entry.identity) == Some(&token) {
                    self.by_identity.remove(&entry.identity);
                }
                true
            }
            None => false,
        }
    }
}

impl TimerService for ManualTimer {
    fn schedule_once(&mut self, delay_secs: f64, identity: BeaconId) -> TimerToken {
        if let Some(previous) = self.by_identity.get(&identity).copied() {
            trace!(%identity, %previous, "replacing pending timer");
            self.remove(previous);
        }

        let delay = if delay_secs.is_finite() && delay_secs > 0.0 {
            delay_secs
        } else {
            0.0
        };
        // A delay too small to move `now` still lands after it.
        let mut due_at = self.now + delay;
        if due_at <= self.now {
            due_at = self.now.next_up();
        }
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.pending
            .insert(token, Entry { identity, due_at });
        self.by_identity.insert(identity, token);
        token
    }

    fn cancel(&mut self, token: TimerToken) -> bool {
        self.remove(token)
    }
}
