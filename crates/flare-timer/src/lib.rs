//! Deterministic single-shot timer service for Flare beacons.
//!
//! [`ManualTimer`] implements [`TimerService`](flare_core::TimerService)
//! on a clock that only moves when the host advances it, so beacon
//! schedules are reproducible in tests and follow the host's update
//! loop in production.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod manual;

pub use manual::{Expired, ManualTimer};
