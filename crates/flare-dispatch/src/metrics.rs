//! Cumulative counters for the dispatch queue.
//!
//! [`QueueMetrics`] lets the host see how often the per-tick budget is
//! hit and how deep the backlog gets under sustained load.

/// Cumulative dispatch counters since the queue was created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueMetrics {
    /// Throttled calls executed immediately on submit.
    pub immediate_calls: u64,
    /// Calls that bypassed the throttle.
    pub bypassed_calls: u64,
    /// Calls appended to the backlog because the budget was spent.
    pub deferred_calls: u64,
    /// Deferred calls executed by a later tick flush.
    pub flushed_calls: u64,
    /// Calls whose call-out returned an error.
    pub failed_calls: u64,
    /// Number of `on_tick()` passes.
    pub ticks: u64,
    /// Largest backlog observed.
    pub peak_backlog: usize,
}
