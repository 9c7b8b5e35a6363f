//! Tick-bounded dispatch queue with FIFO overflow.
//!
//! [`DispatchQueue`] sits between effect producers and the host's
//! effect call-out. Throttled calls run immediately while the per-tick
//! budget lasts; the rest wait in a FIFO backlog that
//! [`on_tick()`](DispatchQueue::on_tick) drains at the start of each
//! update.
//!
//! # Accounting
//!
//! - `counter` counts throttled calls executed during the current tick.
//!   It is reset exactly once per tick, before that tick's flush.
//! - A throttled call runs immediately iff `counter < budget` and the
//!   backlog is empty.
//! - Bypassing calls never read or write `counter` or the backlog.
//! - The backlog keeps submission order across ticks. A flush that
//!   aborts on a failing call can leave budget unspent, which is why the
//!   empty-backlog condition above is needed.

use std::collections::VecDeque;

use flare_core::{CallError, ConfigError, EffectCall, EffectSink};
use tracing::{debug, trace};

use crate::config::QueueConfig;
use crate::metrics::QueueMetrics;

/// What [`DispatchQueue::submit()`] did with a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Executed immediately outside the throttle.
    Bypassed,
    /// Executed immediately and counted against this tick's budget.
    Immediate,
    /// Budget spent; appended to the backlog.
    Deferred {
        /// Zero-based position in the backlog after insertion.
        position: usize,
    },
}

/// Per-tick throttle for effect calls.
///
/// Exclusively owns the budget counter and the deferred-call backlog.
/// Both are only touched through [`submit()`](DispatchQueue::submit)
/// and [`on_tick()`](DispatchQueue::on_tick).
#[derive(Debug)]
pub struct DispatchQueue {
    pending: VecDeque<EffectCall>,
    counter: usize,
    budget: usize,
    metrics: QueueMetrics,
}

impl DispatchQueue {
    /// Create a queue from a validated [`QueueConfig`].
    pub fn new(config: QueueConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_budget(config.budget))
    }

    /// Create a queue with the given budget.
    ///
    /// # Panics
    ///
    /// Panics if `budget` is zero.
    pub fn with_budget(budget: usize) -> Self {
        assert!(budget > 0, "DispatchQueue budget must be at least 1");
        Self {
            pending: VecDeque::new(),
            counter: 0,
            budget,
            metrics: QueueMetrics::default(),
        }
    }

    /// Submit one call.
    ///
    /// With `bypass_throttle` the call runs immediately and the queue
    /// state is untouched. Otherwise the call runs immediately if the
    /// budget allows, or is appended to the backlog.
    ///
    /// # Errors
    ///
    /// Returns the sink's [`CallError`] if an immediate call fails. A
    /// failed call is not counted against the budget and is not queued.
    pub fn submit<S>(
        &mut self,
        sink: &mut S,
        call: EffectCall,
        bypass_throttle: bool,
    ) -> Result<Dispatch, CallError>
    where
        S: EffectSink + ?Sized,
    {
        if bypass_throttle {
            self.invoke(sink, &call)?;
            self.metrics.bypassed_calls += 1;
            trace!(call = call.name(), "dispatch bypassed throttle");
            return Ok(Dispatch::Bypassed);
        }

        if self.counter < self.budget && self.pending.is_empty() {
            self.invoke(sink, &call)?;
            self.counter += 1;
            self.metrics.immediate_calls += 1;
            trace!(call = call.name(), counter = self.counter, "dispatch immediate");
            return Ok(Dispatch::Immediate);
        }

        trace!(
            call = call.name(),
            backlog = self.pending.len() + 1,
            "budget spent, deferring call"
        );
        self.pending.push_back(call);
        self.metrics.deferred_calls += 1;
        self.metrics.peak_backlog = self.metrics.peak_backlog.max(self.pending.len());
        Ok(Dispatch::Deferred {
            position: self.pending.len() - 1,
        })
    }

    /// Start a new tick: reset the counter and flush the backlog.
    ///
    /// Deferred calls are popped from the head and executed until the
    /// backlog is empty or the budget is spent. Returns the number of
    /// calls flushed.
    ///
    /// Must be called exactly once per host update.
    ///
    /// # Errors
    ///
    /// A failing call aborts the rest of this tick's flush and its error
    /// is returned. The failed call has already left the backlog and is
    /// not retried; calls flushed before it are not rolled back. Calls
    /// behind it stay queued for the next tick.
    pub fn on_tick<S>(&mut self, sink: &mut S) -> Result<usize, CallError>
    where
        S: EffectSink + ?Sized,
    {
        self.counter = 0;
        self.metrics.ticks += 1;

        let mut flushed = 0;
        while self.counter < self.budget {
            let Some(call) = self.pending.pop_front() else {
                break;
            };
            self.invoke(sink, &call)?;
            self.counter += 1;
            self.metrics.flushed_calls += 1;
            flushed += 1;
        }

        if !self.pending.is_empty() {
            debug!(
                flushed,
                backlog = self.pending.len(),
                "tick budget spent with calls still queued"
            );
        }
        Ok(flushed)
    }

    fn invoke<S>(&mut self, sink: &mut S, call: &EffectCall) -> Result<(), CallError>
    where
        S: EffectSink + ?Sized,
    {
        sink.emit(call).inspect_err(|err| {
            self.metrics.failed_calls += 1;
            debug!(call = call.name(), error = %err, "effect call failed");
        })
    }

    /// Throttled calls executed during the current tick.
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Throttled calls allowed per tick.
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Whether a throttled call submitted now would run immediately.
    pub fn has_budget(&self) -> bool {
        self.counter < self.budget && self.pending.is_empty()
    }

    /// Number of deferred calls waiting for a later tick.
    pub fn backlog(&self) -> usize {
        self.pending.len()
    }

    /// Deferred calls in execution order.
    pub fn pending(&self) -> impl Iterator<Item = &EffectCall> {
        self.pending.iter()
    }

    /// Cumulative counters.
    pub fn metrics(&self) -> &QueueMetrics {
        &self.metrics
    }
}
