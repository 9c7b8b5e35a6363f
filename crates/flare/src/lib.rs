//! Flare: tick-throttled effect dispatch and recurring per-owner beacons.
//!
//! This is the top-level facade crate. It re-exports the public API of
//! the Flare sub-crates and provides [`EffectsHost`], which wires a
//! dispatch queue, a timer and a beacon registry to the game's effect
//! sink and world.
//!
//! # Quick start
//!
//! ```rust
//! use flare::prelude::*;
//! use flare_test_utils::{MockWorld, RecordingSink};
//!
//! let world = MockWorld::new().with_owner(OwnerId(7), Vec3::new(0.0, 0.0, 64.0));
//! let config = HostConfig::from_toml_str(r#"
//!     [beacon]
//!     duration = 6.0
//!     color = { r = 255, g = 0, b = 0 }
//! "#).unwrap();
//! let mut host = EffectsHost::new(config, RecordingSink::new(), world).unwrap();
//!
//! let id = host.create_beacon(OwnerId(7), BeaconHooks::new(), false).unwrap().unwrap();
//! host.start(id).unwrap();
//! while host.registry().exists(OwnerId(7)) {
//!     host.tick(0.5).unwrap();
//! }
//! // Stops itself on the fourth firing, after drawing three rings.
//! assert_eq!(host.sink().count(RING_EFFECT), 3);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `flare-core` | IDs, effect calls, errors, host traits |
//! | [`dispatch`] | `flare-dispatch` | Per-tick throttled dispatch queue |
//! | [`timer`] | `flare-timer` | Host-driven single-shot timer service |
//! | [`beacon`] | `flare-beacon` | Beacon config, hooks and registry |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod event;
pub mod host;

pub use config::HostConfig;
pub use error::HostError;
pub use event::HostEvent;
pub use host::{EffectsHost, TickReport};

/// Core types, traits, and IDs (`flare-core`).
///
/// Contains [`types::EffectCall`] and its arguments, the error enums,
/// and the host seams [`types::EffectSink`], [`types::TimerService`]
/// and [`types::OwnerWorld`].
pub use flare_core as types;

/// Per-tick throttled dispatch (`flare-dispatch`).
pub use flare_dispatch as dispatch;

/// Single-shot timer service on a manually advanced clock (`flare-timer`).
pub use flare_timer as timer;

/// Recurring per-owner beacons (`flare-beacon`).
///
/// [`beacon::BeaconRegistry`] can be driven directly when the host
/// supplies its own timer service.
pub use flare_beacon as beacon;

/// Common imports for typical Flare usage.
///
/// ```rust
/// use flare::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use flare_core::{
        BeaconId, EffectArg, EffectCall, EffectSink, OwnerId, OwnerWorld, Recipients,
        TimerService, Vec3,
    };

    // Errors
    pub use flare_core::{CallError, ConfigError};

    // Dispatch
    pub use flare_dispatch::{Dispatch, QueueConfig};

    // Beacons
    pub use flare_beacon::{
        BeaconConfig, BeaconHooks, BeaconStatus, BeaconView, Color, Lifetime, SoundConfig,
        SoundKind, RING_EFFECT,
    };

    // Host
    pub use crate::{EffectsHost, HostConfig, HostError, HostEvent, TickReport};
}
