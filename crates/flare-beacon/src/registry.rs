//! The beacon registry: at most one beacon per owner.
//!
//! # Ownership
//!
//! The registry owns every beacon. Callers hold [`BeaconId`]s, which
//! go stale once the beacon is stopped; every operation on a stale id is
//! a no-op. Host services (dispatch queue, sink, timer, world) are
//! borrowed per call through [`FireContext`] rather than stored, so the
//! registry itself has no engine dependencies.
//!
//! # Timer tokens
//!
//! A beacon holds an outstanding [`TimerToken`] iff it is `Running`.
//! [`on_timer`](BeaconRegistry::on_timer) ignores any expiry whose token
//! does not match, which covers timers that raced a pause or stop.

use std::collections::HashMap;

use flare_core::{
    BeaconId, CallError, ConfigError, EffectSink, OwnerId, OwnerWorld, TimerService, TimerToken,
};
use flare_dispatch::DispatchQueue;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::beacon::{Beacon, BeaconStatus};
use crate::config::{BeaconConfig, Lifetime};
use crate::hooks::{BeaconHooks, BeaconView};

/// Host services borrowed for the duration of a firing.
pub struct FireContext<'a> {
    /// Queue the ring and sound are submitted through.
    pub queue: &'a mut DispatchQueue,
    /// Effect call-out.
    pub sink: &'a mut dyn EffectSink,
    /// Timer used to schedule the next firing.
    pub timer: &'a mut dyn TimerService,
    /// Owner positions.
    pub world: &'a dyn OwnerWorld,
}

/// Owns every live beacon, keyed by owner.
#[derive(Debug, Default)]
pub struct BeaconRegistry {
    beacons: IndexMap<OwnerId, Beacon>,
    owners: HashMap<BeaconId, OwnerId>,
    next_id: u64,
}

impl BeaconRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Lifecycle ──────────────────────────────────────────────────

    /// Create a beacon for `owner`, in the `Stopped` state.
    ///
    /// Returns `Ok(None)` if the owner does not exist, or if it is
    /// removable and no existing beacon is being returned. If the owner
    /// already has a beacon and `override_existing` is false, its id is
    /// returned unchanged and `config` is ignored. With
    /// `override_existing` the old beacon is fully stopped (including
    /// `on_destroy`) before the new one is made.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation and would
    /// have been used. Nothing is changed in that case.
    pub fn create(
        &mut self,
        world: &dyn OwnerWorld,
        timer: &mut dyn TimerService,
        owner: OwnerId,
        config: BeaconConfig,
        hooks: BeaconHooks,
        override_existing: bool,
    ) -> Result<Option<BeaconId>, ConfigError> {
        if !world.owner_exists(owner) {
            debug!(%owner, "beacon not created: owner does not exist");
            return Ok(None);
        }
        if let Some(existing) = self.beacons.get(&owner) {
            if !override_existing {
                return Ok(Some(existing.id));
            }
        }
        config.validate()?;
        if world.owner_is_removable(owner) {
            debug!(%owner, "beacon not created: owner is removable");
            return Ok(None);
        }
        if override_existing {
            self.stop_owner(timer, owner);
        }

        let id = BeaconId(self.next_id);
        self.next_id += 1;
        self.beacons
            .insert(owner, Beacon::new(id, owner, config, hooks));
        self.owners.insert(id, owner);
        debug!(%owner, beacon = %id, "beacon created");
        Ok(Some(id))
    }

    /// Start a beacon: fire once now and schedule the next firing.
    ///
    /// No-op if the beacon is already running or the id is stale.
    /// Identical to [`resume`](Self::resume).
    ///
    /// # Errors
    ///
    /// Propagates the [`CallError`] of the first firing. The beacon is
    /// left `Paused` with no outstanding timer.
    pub fn start(&mut self, ctx: &mut FireContext<'_>, id: BeaconId) -> Result<(), CallError> {
        let Some(owner) = self.owners.get(&id).copied() else {
            return Ok(());
        };
        let Some(beacon) = self.beacons.get_mut(&owner) else {
            return Ok(());
        };
        if beacon.status == BeaconStatus::Running {
            return Ok(());
        }
        beacon.status = BeaconStatus::Running;
        debug!(%owner, beacon = %id, "beacon running");
        self.fire(ctx, owner)
    }

    /// Resume a paused beacon. Same semantics as [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// As for [`start`](Self::start).
    pub fn resume(&mut self, ctx: &mut FireContext<'_>, id: BeaconId) -> Result<(), CallError> {
        self.start(ctx, id)
    }

    /// Pause a running beacon, cancelling its timer.
    ///
    /// Returns `false` (and does nothing) unless the beacon was running.
    pub fn pause(&mut self, timer: &mut dyn TimerService, id: BeaconId) -> bool {
        let Some(beacon) = self.get_mut(id) else {
            return false;
        };
        if beacon.status != BeaconStatus::Running {
            return false;
        }
        beacon.halt(timer);
        debug!(owner = %beacon.owner, beacon = %id, "beacon paused");
        true
    }

    /// Stop and remove a beacon, running `on_destroy` once.
    ///
    /// Returns `false` if the id is stale.
    pub fn stop(&mut self, timer: &mut dyn TimerService, id: BeaconId) -> bool {
        match self.owners.get(&id).copied() {
            Some(owner) => self.stop_owner(timer, owner),
            None => false,
        }
    }

    // ── Drivers ────────────────────────────────────────────────────

    /// Handle an expired timer.
    ///
    /// Fires the beacon named by `identity` only if it is running and
    /// `token` is its outstanding token. Returns whether it fired.
    ///
    /// # Errors
    ///
    /// Propagates the firing's [`CallError`]; the beacon is left
    /// `Paused`.
    pub fn on_timer(
        &mut self,
        ctx: &mut FireContext<'_>,
        token: TimerToken,
        identity: BeaconId,
    ) -> Result<bool, CallError> {
        let Some(beacon) = self.get_mut(identity) else {
            warn!(%token, beacon = %identity, "timer fired for unknown beacon");
            return Ok(false);
        };
        if beacon.status != BeaconStatus::Running || beacon.token != Some(token) {
            warn!(
                %token,
                beacon = %identity,
                status = ?beacon.status,
                "ignoring stale timer"
            );
            return Ok(false);
        }
        // The token has fired; it is no longer outstanding.
        beacon.token = None;
        let owner = beacon.owner;
        self.fire(ctx, owner)?;
        Ok(true)
    }

    /// Stop the beacon of an owner that was removed from the world.
    pub fn owner_removed(&mut self, timer: &mut dyn TimerService, owner: OwnerId) -> bool {
        self.stop_owner(timer, owner)
    }

    /// Stop every beacon. Returns how many were stopped.
    pub fn round_reset(&mut self, timer: &mut dyn TimerService) -> usize {
        let owners: Vec<OwnerId> = self.beacons.keys().copied().collect();
        let stopped = owners
            .into_iter()
            .filter(|&owner| self.stop_owner(timer, owner))
            .count();
        if stopped > 0 {
            debug!(stopped, "round reset");
        }
        stopped
    }

    // ── Owner-keyed API ────────────────────────────────────────────

    /// Id of the owner's beacon, if any.
    pub fn find(&self, owner: OwnerId) -> Option<BeaconId> {
        self.beacons.get(&owner).map(|b| b.id)
    }

    /// Whether the owner has a beacon.
    pub fn exists(&self, owner: OwnerId) -> bool {
        self.beacons.contains_key(&owner)
    }

    /// [`start`](Self::start) the owner's beacon, if any.
    ///
    /// # Errors
    ///
    /// As for [`start`](Self::start).
    pub fn start_owner(
        &mut self,
        ctx: &mut FireContext<'_>,
        owner: OwnerId,
    ) -> Result<(), CallError> {
        match self.find(owner) {
            Some(id) => self.start(ctx, id),
            None => Ok(()),
        }
    }

    /// [`resume`](Self::resume) the owner's beacon, if any.
    ///
    /// # Errors
    ///
    /// As for [`start`](Self::start).
    pub fn resume_owner(
        &mut self,
        ctx: &mut FireContext<'_>,
        owner: OwnerId,
    ) -> Result<(), CallError> {
        self.start_owner(ctx, owner)
    }

    /// [`pause`](Self::pause) the owner's beacon, if any.
    pub fn pause_owner(&mut self, timer: &mut dyn TimerService, owner: OwnerId) -> bool {
        match self.find(owner) {
            Some(id) => self.pause(timer, id),
            None => false,
        }
    }

    /// Stop and remove the owner's beacon, if any.
    pub fn stop_owner(&mut self, timer: &mut dyn TimerService, owner: OwnerId) -> bool {
        let Some(mut beacon) = self.beacons.shift_remove(&owner) else {
            return false;
        };
        self.owners.remove(&beacon.id);
        beacon.cancel_timer(timer);
        debug!(%owner, beacon = %beacon.id, "beacon stopped");
        beacon.finish();
        true
    }

    // ── Inspection ─────────────────────────────────────────────────

    /// Snapshot of a beacon.
    pub fn view(&self, id: BeaconId) -> Option<BeaconView<'_>> {
        self.get(id).map(Beacon::view)
    }

    /// Lifecycle state. `None` once the beacon has been stopped.
    pub fn status(&self, id: BeaconId) -> Option<BeaconStatus> {
        self.get(id).map(|b| b.status)
    }

    /// Time left before the beacon expires.
    pub fn remaining(&self, id: BeaconId) -> Option<Lifetime> {
        self.get(id).map(|b| b.remaining)
    }

    /// The beacon's configuration.
    pub fn config(&self, id: BeaconId) -> Option<&BeaconConfig> {
        self.get(id).map(|b| &b.config)
    }

    /// Owner the beacon is bound to.
    pub fn owner_of(&self, id: BeaconId) -> Option<OwnerId> {
        self.owners.get(&id).copied()
    }

    /// Outstanding timer token. Only running beacons have one.
    pub fn token(&self, id: BeaconId) -> Option<TimerToken> {
        self.get(id).and_then(|b| b.token)
    }

    /// Number of live beacons.
    pub fn len(&self) -> usize {
        self.beacons.len()
    }

    /// Whether no beacons are live.
    pub fn is_empty(&self) -> bool {
        self.beacons.is_empty()
    }

    /// Live beacon ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = BeaconId> + '_ {
        self.beacons.values().map(|b| b.id)
    }

    // ── Internals ──────────────────────────────────────────────────

    fn get(&self, id: BeaconId) -> Option<&Beacon> {
        let owner = self.owners.get(&id)?;
        self.beacons.get(owner)
    }

    fn get_mut(&mut self, id: BeaconId) -> Option<&mut Beacon> {
        let owner = self.owners.get(&id)?;
        self.beacons.get_mut(owner)
    }

    /// One firing of a running beacon.
    fn fire(&mut self, ctx: &mut FireContext<'_>, owner: OwnerId) -> Result<(), CallError> {
        let Some(beacon) = self.beacons.get_mut(&owner) else {
            return Ok(());
        };
        if beacon.countdown() {
            debug!(%owner, beacon = %beacon.id, "beacon duration elapsed");
            self.stop_owner(ctx.timer, owner);
            return Ok(());
        }
        if let Err(err) = beacon.emit(ctx) {
            beacon.halt(ctx.timer);
            debug!(%owner, beacon = %beacon.id, error = %err, "beacon firing failed, paused");
            return Err(err);
        }
        beacon.schedule_next(ctx.timer);
        Ok(())
    }
}

impl Drop for BeaconRegistry {
    fn drop(&mut self) {
        for (owner, mut beacon) in self.beacons.drain(..) {
            warn!(%owner, beacon = %beacon.id, "beacon still live at registry drop");
            beacon.finish();
        }
        self.owners.clear();
    }
}
