//! Events pushed into the host from game callbacks.

use flare_core::OwnerId;

/// A world event that forces beacons to stop.
///
/// Sent through [`EffectsHost::event_sender`](crate::EffectsHost::event_sender)
/// from any thread and applied at the start of the next tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// The owner entity was removed from the world.
    OwnerRemoved(OwnerId),
    /// The owner died.
    OwnerDied(OwnerId),
    /// The owner's client disconnected.
    OwnerDisconnected(OwnerId),
    /// The round ended; every beacon stops.
    RoundReset,
}

impl HostEvent {
    /// Owner targeted by the event, or `None` for a round reset.
    pub fn owner(&self) -> Option<OwnerId> {
        match *self {
            Self::OwnerRemoved(owner) | Self::OwnerDied(owner) | Self::OwnerDisconnected(owner) => {
                Some(owner)
            }
            Self::RoundReset => None,
        }
    }
}
