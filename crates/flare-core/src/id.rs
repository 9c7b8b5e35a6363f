//! Strongly-typed identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies an owner entity (typically a connected player).
///
/// Owner ids are assigned by the host engine. Flare never allocates
/// them; it only uses them as registry keys and passes them back to
/// the host through [`OwnerWorld`](crate::OwnerWorld) lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub u32);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for OwnerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Handle to a beacon inside a registry.
///
/// Allocated from a per-registry monotonic counter, so a beacon created
/// with `override` always receives a handle distinct from the one it
/// replaced. A handle whose beacon has been stopped is simply stale:
/// every registry operation treats it as absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BeaconId(pub u64);

impl fmt::Display for BeaconId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "beacon#{}", self.0)
    }
}

impl From<u64> for BeaconId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Opaque token for one scheduled single-shot timer.
///
/// Returned by [`TimerService::schedule_once`](crate::TimerService::schedule_once)
/// and passed back verbatim to cancel it. Tokens are never reused by a
/// timer service, so a stale token can never cancel an unrelated timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(pub u64);

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented each time the host drives one update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        assert_eq!(OwnerId(7).to_string(), "7");
        assert_eq!(BeaconId(3).to_string(), "beacon#3");
        assert_eq!(TimerToken(12).to_string(), "timer#12");
        assert_eq!(TickId(40).to_string(), "40");
    }

    #[test]
    fn owner_id_from_u32() {
        assert_eq!(OwnerId::from(5), OwnerId(5));
    }
}
