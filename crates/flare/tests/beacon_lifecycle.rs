//! Integration test: beacon lifecycle through the host.
//!
//! Drives beacons purely through `EffectsHost` ticks and world events,
//! checking firing counts, automatic expiry, and that every exit path
//! runs `on_destroy` exactly once.

use std::cell::RefCell;
use std::rc::Rc;

use flare::prelude::*;
use flare_test_utils::{MockWorld, RecordingSink};

const ALICE: OwnerId = OwnerId(1);
const BOB: OwnerId = OwnerId(2);

fn host() -> EffectsHost<RecordingSink, MockWorld> {
    let world = MockWorld::new()
        .with_owner(ALICE, Vec3::new(100.0, 0.0, 0.0))
        .with_owner(BOB, Vec3::new(-100.0, 0.0, 0.0));
    EffectsHost::new(HostConfig::default(), RecordingSink::new(), world).unwrap()
}

/// Hooks that log `(label, owner)` into a shared journal.
fn journaled(journal: &Rc<RefCell<Vec<(&'static str, OwnerId)>>>) -> BeaconHooks {
    let pre = Rc::clone(journal);
    let post = Rc::clone(journal);
    let destroy = Rc::clone(journal);
    BeaconHooks::new()
        .pre(move |owner, _| pre.borrow_mut().push(("pre", owner)))
        .post(move |owner, _| post.borrow_mut().push(("post", owner)))
        .on_destroy(move |owner, _| destroy.borrow_mut().push(("destroy", owner)))
}

fn count(journal: &Rc<RefCell<Vec<(&'static str, OwnerId)>>>, label: &str) -> usize {
    journal.borrow().iter().filter(|(l, _)| *l == label).count()
}

fn run(host: &mut EffectsHost<RecordingSink, MockWorld>, seconds: f64) {
    let steps = (seconds / 0.25).round() as usize;
    for _ in 0..steps {
        host.tick(0.25).unwrap();
    }
}

#[test]
fn finite_beacon_stops_itself() {
    let mut host = host();
    let journal = Rc::new(RefCell::new(Vec::new()));
    let cfg = BeaconConfig {
        duration: Lifetime::Remaining(6.0),
        ..BeaconConfig::default()
    };
    let id = host
        .create_beacon_with(ALICE, cfg, journaled(&journal), false)
        .unwrap()
        .unwrap();
    host.start(id).unwrap();
    run(&mut host, 10.0);

    assert_eq!(host.sink().count(RING_EFFECT), 3);
    assert_eq!(count(&journal, "pre"), 3);
    assert_eq!(count(&journal, "post"), 3);
    assert_eq!(count(&journal, "destroy"), 1);
    assert!(host.registry().find(ALICE).is_none());
    assert!(host.timer().is_empty());
}

#[test]
fn hooks_run_in_order_around_each_firing() {
    let mut host = host();
    let journal = Rc::new(RefCell::new(Vec::new()));
    let id = host
        .create_beacon(ALICE, journaled(&journal), false)
        .unwrap()
        .unwrap();
    host.start(id).unwrap();
    assert!(host.stop(id));

    let labels: Vec<_> = journal.borrow().iter().map(|(l, _)| *l).collect();
    assert_eq!(labels, vec!["pre", "post", "destroy"]);
}

#[test]
fn pause_and_resume_through_host() {
    let mut host = host();
    let id = host.create_beacon(ALICE, BeaconHooks::new(), false).unwrap().unwrap();
    host.start(id).unwrap();
    run(&mut host, 1.5);
    assert_eq!(host.sink().count(RING_EFFECT), 2);

    assert!(host.pause(id));
    assert!(!host.pause(id));
    run(&mut host, 10.0);
    assert_eq!(host.sink().count(RING_EFFECT), 2);

    host.resume(id).unwrap();
    assert_eq!(host.sink().count(RING_EFFECT), 3);
    assert_eq!(host.timer().len(), 1);
    assert_eq!(host.registry().status(id), Some(BeaconStatus::Running));
}

#[test]
fn owner_keyed_controls() {
    let mut host = host();
    host.create_beacon(BOB, BeaconHooks::new(), false).unwrap();
    host.start_owner(BOB).unwrap();
    assert!(host.pause_owner(BOB));
    host.resume_owner(BOB).unwrap();
    assert_eq!(host.sink().count(RING_EFFECT), 2);
    assert!(host.stop_owner(BOB));
    assert!(!host.stop_owner(BOB));
    host.start_owner(BOB).unwrap();
    assert_eq!(host.sink().count(RING_EFFECT), 2);
}

#[test]
fn death_and_disconnect_events_stop_beacons() {
    let mut host = host();
    let journal = Rc::new(RefCell::new(Vec::new()));
    for owner in [ALICE, BOB] {
        let id = host
            .create_beacon(owner, journaled(&journal), false)
            .unwrap()
            .unwrap();
        host.start(id).unwrap();
    }

    let tx = host.event_sender();
    tx.send(HostEvent::OwnerDied(ALICE)).unwrap();
    tx.send(HostEvent::OwnerDisconnected(BOB)).unwrap();
    let report = host.tick(0.25).unwrap();

    assert_eq!(report.events_applied, 2);
    assert!(host.registry().is_empty());
    assert_eq!(count(&journal, "destroy"), 2);

    // Events for owners without beacons are harmless.
    tx.send(HostEvent::OwnerRemoved(ALICE)).unwrap();
    assert_eq!(host.tick(0.25).unwrap().events_applied, 1);
}

#[test]
fn dead_owner_cannot_get_a_beacon() {
    let mut host = host();
    host.world_mut().kill(ALICE);
    assert_eq!(host.create_beacon(ALICE, BeaconHooks::new(), false), Ok(None));
    host.world_mut().revive(ALICE);
    assert!(host.create_beacon(ALICE, BeaconHooks::new(), false).unwrap().is_some());
}

#[test]
fn override_replaces_running_beacon() {
    let mut host = host();
    let journal = Rc::new(RefCell::new(Vec::new()));
    let first = host
        .create_beacon(ALICE, journaled(&journal), false)
        .unwrap()
        .unwrap();
    host.start(first).unwrap();

    let same = host.create_beacon(ALICE, BeaconHooks::new(), false).unwrap();
    assert_eq!(same, Some(first));
    assert_eq!(count(&journal, "destroy"), 0);

    let second = host
        .create_beacon(ALICE, BeaconHooks::new(), true)
        .unwrap()
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(count(&journal, "destroy"), 1);
    assert!(host.timer().is_empty());
    assert_eq!(host.registry().len(), 1);
}

#[test]
fn ring_follows_owner() {
    let mut host = host();
    let id = host.create_beacon(ALICE, BeaconHooks::new(), false).unwrap().unwrap();
    host.start(id).unwrap();
    host.world_mut().set_position(ALICE, Vec3::new(1.0, 2.0, 3.0));
    run(&mut host, 1.5);

    let centers: Vec<_> = host
        .sink()
        .calls()
        .iter()
        .filter_map(|c| match c {
            EffectCall::TempEntity { args, .. } => match args.get(1) {
                Some(EffectArg::Vector(v)) => Some(*v),
                _ => None,
            },
            _ => None,
        })
        .collect();
    assert_eq!(
        centers,
        vec![Vec3::new(100.0, 0.0, 5.0), Vec3::new(1.0, 2.0, 8.0)]
    );
}

#[test]
fn dropping_host_destroys_remaining_beacons() {
    let journal = Rc::new(RefCell::new(Vec::new()));
    {
        let mut host = host();
        host.create_beacon(ALICE, journaled(&journal), false).unwrap();
        host.create_beacon(BOB, journaled(&journal), false).unwrap();
    }
    assert_eq!(count(&journal, "destroy"), 2);
}
