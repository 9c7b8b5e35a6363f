//! The effects host: one session's queue, timer and beacons.
//!
//! [`EffectsHost`] is the user-facing entry point. The game calls
//! [`tick()`](EffectsHost::tick) once per server update; each tick
//! applies queued world events, flushes the dispatch backlog, then
//! delivers expired beacon timers.
//!
//! # Ownership model
//!
//! The host owns the sink and world adapters and lends them to the
//! queue and registry per call. All mutating methods take `&mut self`.
//! The only cross-thread surface is the event channel returned by
//! [`event_sender()`](EffectsHost::event_sender).
//!
//! # Shutdown
//!
//! Dropping the host stops every remaining beacon, so every `on_destroy`
//! hook runs exactly once.

use crossbeam_channel::{Receiver, Sender};
use flare_beacon::{BeaconConfig, BeaconHooks, BeaconRegistry, FireContext};
use flare_core::{BeaconId, EffectCall, EffectSink, OwnerId, OwnerWorld, TickId};
use flare_dispatch::{Dispatch, DispatchQueue};
use flare_timer::ManualTimer;
use tracing::{debug, trace};

use crate::config::HostConfig;
use crate::error::HostError;
use crate::event::HostEvent;

// ── TickReport ──────────────────────────────────────────────────

/// Summary of one [`EffectsHost::tick()`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Tick that just ran.
    pub tick_id: TickId,
    /// Host events applied at the start of the tick.
    pub events_applied: usize,
    /// Deferred calls flushed from the backlog.
    pub flushed: usize,
    /// Beacon timer expiries that produced a firing.
    pub beacons_fired: usize,
    /// Calls still queued after the tick.
    pub backlog: usize,
}

// ── EffectsHost ─────────────────────────────────────────────────

/// A single game session's effect scheduler.
///
/// # Example
///
/// ```
/// use flare::prelude::*;
/// use flare_test_utils::{MockWorld, RecordingSink};
///
/// let world = MockWorld::new().with_owner(OwnerId(1), Vec3::ZERO);
/// let mut host = EffectsHost::new(HostConfig::default(), RecordingSink::new(), world).unwrap();
///
/// let id = host.create_beacon(OwnerId(1), BeaconHooks::new(), false).unwrap().unwrap();
/// host.start(id).unwrap();
/// for _ in 0..6 {
///     host.tick(0.25).unwrap();
/// }
/// // One firing on start, one more after 1.5 s.
/// assert_eq!(host.sink().count(RING_EFFECT), 2);
/// ```
pub struct EffectsHost<S: EffectSink, W: OwnerWorld> {
    queue: DispatchQueue,
    timer: ManualTimer,
    registry: BeaconRegistry,
    sink: S,
    world: W,
    defaults: BeaconConfig,
    events_tx: Sender<HostEvent>,
    events_rx: Receiver<HostEvent>,
    tick_id: TickId,
}

impl<S: EffectSink, W: OwnerWorld> EffectsHost<S, W> {
    /// Create a host from a validated [`HostConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Config`] if any section fails validation.
    pub fn new(config: HostConfig, sink: S, world: W) -> Result<Self, HostError> {
        config.validate()?;
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        Ok(Self {
            queue: DispatchQueue::new(config.queue)?,
            timer: ManualTimer::new(),
            registry: BeaconRegistry::new(),
            sink,
            world,
            defaults: config.beacon,
            events_tx,
            events_rx,
            tick_id: TickId::default(),
        })
    }

    /// Parse a TOML config and create a host from it.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Config`] for parse or validation failures.
    pub fn from_toml_str(text: &str, sink: S, world: W) -> Result<Self, HostError> {
        Self::new(HostConfig::from_toml_str(text)?, sink, world)
    }

    // ── Dispatch ────────────────────────────────────────────────

    /// Submit an effect call through the throttled queue.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Call`] if an immediately executed call fails.
    pub fn submit(&mut self, call: EffectCall, bypass_throttle: bool) -> Result<Dispatch, HostError> {
        Ok(self.queue.submit(&mut self.sink, call, bypass_throttle)?)
    }

    // ── Beacons ─────────────────────────────────────────────────

    /// Create a beacon for `owner` from the host's default template.
    ///
    /// See [`BeaconRegistry::create`] for the `None` cases.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Config`] if the template is invalid.
    pub fn create_beacon(
        &mut self,
        owner: OwnerId,
        hooks: BeaconHooks,
        override_existing: bool,
    ) -> Result<Option<BeaconId>, HostError> {
        let config = self.defaults.clone();
        self.create_beacon_with(owner, config, hooks, override_existing)
    }

    /// Create a beacon for `owner` with an explicit config.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Config`] if `config` is invalid.
    pub fn create_beacon_with(
        &mut self,
        owner: OwnerId,
        config: BeaconConfig,
        hooks: BeaconHooks,
        override_existing: bool,
    ) -> Result<Option<BeaconId>, HostError> {
        Ok(self.registry.create(
            &self.world,
            &mut self.timer,
            owner,
            config,
            hooks,
            override_existing,
        )?)
    }

    /// Start a beacon; fires once immediately.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Call`] if the firing fails. The beacon is
    /// left paused.
    pub fn start(&mut self, id: BeaconId) -> Result<(), HostError> {
        let (registry, mut ctx) = self.split();
        Ok(registry.start(&mut ctx, id)?)
    }

    /// Resume a paused beacon; fires once immediately.
    ///
    /// # Errors
    ///
    /// As for [`start`](Self::start).
    pub fn resume(&mut self, id: BeaconId) -> Result<(), HostError> {
        let (registry, mut ctx) = self.split();
        Ok(registry.resume(&mut ctx, id)?)
    }

    /// Pause a running beacon. Returns whether it was running.
    pub fn pause(&mut self, id: BeaconId) -> bool {
        self.registry.pause(&mut self.timer, id)
    }

    /// Stop and remove a beacon. Returns whether it existed.
    pub fn stop(&mut self, id: BeaconId) -> bool {
        self.registry.stop(&mut self.timer, id)
    }

    /// Start the owner's beacon, if it has one.
    ///
    /// # Errors
    ///
    /// As for [`start`](Self::start).
    pub fn start_owner(&mut self, owner: OwnerId) -> Result<(), HostError> {
        let (registry, mut ctx) = self.split();
        Ok(registry.start_owner(&mut ctx, owner)?)
    }

    /// Resume the owner's beacon, if it has one.
    ///
    /// # Errors
    ///
    /// As for [`start`](Self::start).
    pub fn resume_owner(&mut self, owner: OwnerId) -> Result<(), HostError> {
        let (registry, mut ctx) = self.split();
        Ok(registry.resume_owner(&mut ctx, owner)?)
    }

    /// Pause the owner's beacon, if it has one and it is running.
    pub fn pause_owner(&mut self, owner: OwnerId) -> bool {
        self.registry.pause_owner(&mut self.timer, owner)
    }

    /// Stop the owner's beacon, if it has one.
    pub fn stop_owner(&mut self, owner: OwnerId) -> bool {
        self.registry.stop_owner(&mut self.timer, owner)
    }

    /// Stop the beacon of a removed owner immediately.
    pub fn owner_removed(&mut self, owner: OwnerId) -> bool {
        self.registry.owner_removed(&mut self.timer, owner)
    }

    /// Stop every beacon immediately. Returns how many were stopped.
    pub fn round_reset(&mut self) -> usize {
        self.registry.round_reset(&mut self.timer)
    }

    /// Sender for world events, usable from any thread.
    pub fn event_sender(&self) -> Sender<HostEvent> {
        self.events_tx.clone()
    }

    // ── Tick ────────────────────────────────────────────────────

    /// Run one host update, `dt` seconds after the previous one.
    ///
    /// 1. Apply every queued [`HostEvent`].
    /// 2. Advance the timer clock by `dt`.
    /// 3. Reset the dispatch counter and flush the backlog.
    /// 4. Fire every beacon whose timer has expired, in due order.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Call`] on the first failing call. Expired
    /// timers not yet delivered stay pending and fire on the next tick.
    pub fn tick(&mut self, dt: f64) -> Result<TickReport, HostError> {
        self.tick_id = TickId(self.tick_id.0 + 1);

        let events_applied = self.drain_events();
        self.timer.advance(dt);
        let flushed = self.queue.on_tick(&mut self.sink)?;

        let mut beacons_fired = 0;
        while let Some(expired) = self.timer.pop_due() {
            let (registry, mut ctx) = self.split();
            if registry.on_timer(&mut ctx, expired.token, expired.identity)? {
                beacons_fired += 1;
            }
        }

        let report = TickReport {
            tick_id: self.tick_id,
            events_applied,
            flushed,
            beacons_fired,
            backlog: self.queue.backlog(),
        };
        trace!(
            tick = self.tick_id.0,
            events_applied,
            flushed,
            beacons_fired,
            backlog = report.backlog,
            "tick complete"
        );
        Ok(report)
    }

    fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            debug!(?event, "applying host event");
            match event.owner() {
                Some(owner) => {
                    self.registry.owner_removed(&mut self.timer, owner);
                }
                None => {
                    self.registry.round_reset(&mut self.timer);
                }
            }
            applied += 1;
        }
        applied
    }

    fn split(&mut self) -> (&mut BeaconRegistry, FireContext<'_>) {
        let Self {
            queue,
            timer,
            registry,
            sink,
            world,
            ..
        } = self;
        (
            registry,
            FireContext {
                queue,
                sink,
                timer,
                world,
            },
        )
    }

    // ── Accessors ───────────────────────────────────────────────

    /// The dispatch queue, for counters and metrics.
    pub fn queue(&self) -> &DispatchQueue {
        &self.queue
    }

    /// The beacon registry, for inspection.
    pub fn registry(&self) -> &BeaconRegistry {
        &self.registry
    }

    /// The timer service.
    pub fn timer(&self) -> &ManualTimer {
        &self.timer
    }

    /// Seconds elapsed on the host clock.
    pub fn now(&self) -> f64 {
        self.timer.now()
    }

    /// Last completed tick.
    pub fn tick_id(&self) -> TickId {
        self.tick_id
    }

    /// Template used by [`create_beacon`](Self::create_beacon).
    pub fn defaults(&self) -> &BeaconConfig {
        &self.defaults
    }

    /// The effect sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the effect sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// The owner world.
    pub fn world(&self) -> &W {
        &self.world
    }

    /// Mutable access to the owner world.
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }
}

impl<S: EffectSink, W: OwnerWorld> Drop for EffectsHost<S, W> {
    fn drop(&mut self) {
        let stopped = self.registry.round_reset(&mut self.timer);
        if stopped > 0 {
            debug!(stopped, "host dropped, beacons stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flare_beacon::RING_EFFECT;
    use flare_core::Vec3;
    use flare_test_utils::{tagged_call, MockWorld, RecordingSink};

    fn host() -> EffectsHost<RecordingSink, MockWorld> {
        let world = MockWorld::new()
            .with_owner(OwnerId(1), Vec3::ZERO)
            .with_owner(OwnerId(2), Vec3::ZERO);
        EffectsHost::new(HostConfig::default(), RecordingSink::new(), world).unwrap()
    }

    #[test]
    fn tick_ids_increase() {
        let mut h = host();
        assert_eq!(h.tick(0.1).unwrap().tick_id, TickId(1));
        assert_eq!(h.tick(0.1).unwrap().tick_id, TickId(2));
        assert_eq!(h.tick_id(), TickId(2));
    }

    #[test]
    fn tick_flushes_backlog() {
        let mut h = host();
        let budget = h.queue().budget();
        for i in 0..(budget as i64 + 5) {
            h.submit(tagged_call(i), false).unwrap();
        }
        assert_eq!(h.queue().backlog(), 5);
        let report = h.tick(0.0).unwrap();
        assert_eq!(report.flushed, 5);
        assert_eq!(report.backlog, 0);
        assert_eq!(h.sink().tags().len(), budget + 5);
    }

    #[test]
    fn events_are_applied_on_next_tick() {
        let mut h = host();
        let id = h.create_beacon(OwnerId(1), BeaconHooks::new(), false).unwrap().unwrap();
        h.start(id).unwrap();

        let tx = h.event_sender();
        std::thread::spawn(move || tx.send(HostEvent::OwnerDied(OwnerId(1))).unwrap())
            .join()
            .unwrap();
        assert!(h.registry().exists(OwnerId(1)));

        let report = h.tick(0.1).unwrap();
        assert_eq!(report.events_applied, 1);
        assert!(!h.registry().exists(OwnerId(1)));
        assert!(h.timer().is_empty());
    }

    #[test]
    fn round_reset_event_stops_all() {
        let mut h = host();
        h.create_beacon(OwnerId(1), BeaconHooks::new(), false).unwrap();
        h.create_beacon(OwnerId(2), BeaconHooks::new(), false).unwrap();
        h.event_sender().send(HostEvent::RoundReset).unwrap();
        h.tick(0.1).unwrap();
        assert!(h.registry().is_empty());
    }

    #[test]
    fn flush_failure_surfaces_as_call_error() {
        let mut h = host();
        let budget = h.queue().budget();
        for _ in 0..budget {
            h.submit(tagged_call(0), false).unwrap();
        }
        h.submit(
            EffectCall::temp_entity("Broken", Default::default(), Vec::new()),
            false,
        )
        .unwrap();
        *h.sink_mut() = RecordingSink::new().fail_on("Broken");
        match h.tick(0.0) {
            Err(HostError::Call(_)) => {}
            other => panic!("expected Call error, got {other:?}"),
        }
        assert_eq!(h.queue().backlog(), 0);
    }

    #[test]
    fn vanishing_interval_is_rejected() {
        let mut h = host();
        let cfg = BeaconConfig {
            interval: 1e-20,
            ..BeaconConfig::default()
        };
        match h.create_beacon_with(OwnerId(1), cfg, BeaconHooks::new(), false) {
            Err(HostError::Config(flare_core::ConfigError::InvalidInterval { .. })) => {}
            other => panic!("expected InvalidInterval, got {other:?}"),
        }
        assert!(h.registry().is_empty());
    }

    #[test]
    fn shortest_interval_fires_once_per_tick() {
        let mut h = host();
        let cfg = BeaconConfig {
            interval: flare_beacon::MIN_INTERVAL,
            ..BeaconConfig::default()
        };
        let id = h
            .create_beacon_with(OwnerId(1), cfg, BeaconHooks::new(), false)
            .unwrap()
            .unwrap();
        h.start(id).unwrap();
        for _ in 0..5 {
            assert_eq!(h.tick(1.0).unwrap().beacons_fired, 1);
        }
    }

    #[test]
    fn beacon_fires_on_schedule() {
        let mut h = host();
        let id = h.create_beacon(OwnerId(1), BeaconHooks::new(), false).unwrap().unwrap();
        h.start(id).unwrap();
        let mut fired = 0;
        for _ in 0..12 {
            fired += h.tick(0.25).unwrap().beacons_fired;
        }
        // Start fires once, then every 1.5 s over 3.0 s.
        assert_eq!(fired, 2);
        assert_eq!(h.sink().count(RING_EFFECT), 3);
    }
}
