//! A short simulated round: three players get beacons, one dies, the
//! round ends.
//!
//! Run with `RUST_LOG=flare=debug,round=info cargo run --example round`.

use std::collections::HashMap;

use flare::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Sink that logs every call instead of rendering it.
struct LogSink;

impl EffectSink for LogSink {
    fn emit(&mut self, call: &EffectCall) -> Result<(), CallError> {
        match call {
            EffectCall::TempEntity { effect, args, .. } => {
                let center = args.get(1).map(|a| format!("{a:?}")).unwrap_or_default();
                info!(%effect, %center, "temp entity");
            }
            EffectCall::EmitSound { owner, sound, .. } | EffectCall::PlaySound { owner, sound, .. } => {
                info!(%owner, %sound, "sound");
            }
        }
        Ok(())
    }
}

/// Players walking in a straight line.
#[derive(Default)]
struct Playground {
    players: HashMap<OwnerId, (Vec3, bool)>,
}

impl Playground {
    fn walk(&mut self, dt: f32) {
        for (pos, alive) in self.players.values_mut() {
            if *alive {
                pos.x += 50.0 * dt;
            }
        }
    }
}

impl OwnerWorld for Playground {
    fn owner_exists(&self, owner: OwnerId) -> bool {
        self.players.contains_key(&owner)
    }

    fn owner_is_removable(&self, owner: OwnerId) -> bool {
        self.players.get(&owner).is_none_or(|(_, alive)| !alive)
    }

    fn current_position(&self, owner: OwnerId) -> Option<Vec3> {
        self.players.get(&owner).map(|(pos, _)| *pos)
    }
}

fn main() -> Result<(), HostError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut playground = Playground::default();
    for i in 1..=3 {
        playground
            .players
            .insert(OwnerId(i), (Vec3::new(0.0, i as f32 * 100.0, 0.0), true));
    }

    let config = HostConfig::from_toml_str(
        r#"
        [queue]
        budget = 33

        [beacon]
        interval = 1.0
        color = { r = 255, g = 64, b = 0 }
        "#,
    )?;
    let mut host = EffectsHost::new(config, LogSink, playground)?;

    for i in 1..=3 {
        let hooks = BeaconHooks::new().on_destroy(|owner, view| {
            info!(%owner, beacon = %view.id, "beacon destroyed");
        });
        if let Some(id) = host.create_beacon(OwnerId(i), hooks, false)? {
            host.start(id)?;
        }
    }

    let events = host.event_sender();
    let dt = 0.25;
    for step in 1..=24 {
        host.world_mut().walk(dt as f32);
        if step == 10 {
            if let Some(p) = host.world_mut().players.get_mut(&OwnerId(2)) {
                p.1 = false;
            }
            events
                .send(HostEvent::OwnerDied(OwnerId(2)))
                .expect("host owns the receiver");
        }
        let report = host.tick(dt)?;
        if report.beacons_fired > 0 || report.events_applied > 0 {
            info!(
                tick = report.tick_id.0,
                fired = report.beacons_fired,
                events = report.events_applied,
                "tick"
            );
        }
    }

    let stopped = host.round_reset();
    info!(stopped, metrics = ?host.queue().metrics(), "round over");
    Ok(())
}
