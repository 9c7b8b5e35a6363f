//! Traits implemented by the host engine.
//!
//! Flare owns the scheduling logic; everything that touches the engine
//! (rendering an effect, knowing where a player stands, running delayed
//! callbacks) comes in through these three seams.

use crate::effect::EffectCall;
use crate::error::CallError;
use crate::id::{BeaconId, OwnerId, TimerToken};
use crate::vector::Vec3;

/// The effect call-out: performs an effect or plays a sound.
///
/// May fail arbitrarily. Failures propagate to the caller of the
/// operation that invoked the sink.
pub trait EffectSink {
    /// Execute one call.
    fn emit(&mut self, call: &EffectCall) -> Result<(), CallError>;
}

impl<S: EffectSink + ?Sized> EffectSink for &mut S {
    fn emit(&mut self, call: &EffectCall) -> Result<(), CallError> {
        (**self).emit(call)
    }
}

impl<S: EffectSink + ?Sized> EffectSink for Box<S> {
    fn emit(&mut self, call: &EffectCall) -> Result<(), CallError> {
        (**self).emit(call)
    }
}

/// Cancellable single-shot delayed invocation, keyed per beacon.
///
/// There is no callback argument: when a timer expires, whoever drives
/// the service hands the `(token, identity)` pair to the beacon
/// registry. Scheduling under an identity that already has a pending
/// timer replaces it, so an identity never has two live timers.
pub trait TimerService {
    /// Arrange for `identity` to be fired after `delay_secs` seconds.
    fn schedule_once(&mut self, delay_secs: f64, identity: BeaconId) -> TimerToken;

    /// Cancel a pending timer. Returns `false` if the token had already
    /// fired, been cancelled, or been replaced.
    fn cancel(&mut self, token: TimerToken) -> bool;
}

/// Read-only view of the owner entities in the host world.
pub trait OwnerWorld {
    /// Whether the owner currently exists (is connected).
    fn owner_exists(&self, owner: OwnerId) -> bool;

    /// Whether the owner is in a state that disallows new effects,
    /// e.g. dead or about to be removed.
    fn owner_is_removable(&self, owner: OwnerId) -> bool;

    /// Current world position of the owner, if known.
    fn current_position(&self, owner: OwnerId) -> Option<Vec3>;
}
