//! Core types and traits for the Flare effect scheduler.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Flare workspace:
//! identifiers, the effect call model, error types, and the traits the
//! host engine implements ([`EffectSink`], [`TimerService`], [`OwnerWorld`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod effect;
pub mod error;
pub mod id;
pub mod traits;
pub mod vector;

pub use effect::{EffectArg, EffectCall, Recipients};
pub use error::{CallError, ConfigError};
pub use id::{BeaconId, OwnerId, TickId, TimerToken};
pub use traits::{EffectSink, OwnerWorld, TimerService};
pub use vector::Vec3;
