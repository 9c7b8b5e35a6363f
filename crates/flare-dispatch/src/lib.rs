//! Tick-bounded dispatch queue for Flare effect calls.
//!
//! The host engine caps how many temporary effects it renders per
//! update; calls over that cap are silently lost. [`DispatchQueue`]
//! counts throttled calls per tick and defers the overflow, flushing it
//! in submission order on later ticks. Every accepted call runs exactly
//! once.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod metrics;
pub mod queue;

pub use config::QueueConfig;
pub use metrics::QueueMetrics;
pub use queue::{Dispatch, DispatchQueue};
