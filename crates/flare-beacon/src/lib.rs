//! Recurring per-owner beacon emitters for Flare.
//!
//! A beacon is bound to one owner entity. While running it repeatedly
//! draws a ring at the owner's position through the dispatch queue,
//! optionally plays a sound, and reschedules itself on the host's timer
//! service. [`BeaconRegistry`] owns every beacon and guarantees at most
//! one per owner.
//!
//! # Lifecycle
//!
//! ```text
//!            create            start/resume
//!   (none) ─────────► Stopped ─────────────► Running ◄──┐
//!                                             │    │    │ resume
//!                                       pause │    └────┼──► timer fires
//!                                             ▼         │
//!                                           Paused ─────┘
//!
//!   stop (any state), duration expiry, owner removal, round reset:
//!   entry removed, on_destroy runs once.
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod beacon;
pub mod config;
pub mod hooks;
pub mod registry;

pub use beacon::{BeaconStatus, RING_EFFECT};
pub use config::{BeaconConfig, Color, Lifetime, SoundConfig, SoundKind, MIN_INTERVAL};
pub use hooks::{BeaconHooks, BeaconView, Hook};
pub use registry::{BeaconRegistry, FireContext};
