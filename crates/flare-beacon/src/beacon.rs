//! Per-beacon state and the firing steps.
//!
//! `Beacon` holds one owner's state. The registry drives it; this
//! module only knows how to count down, emit one ring (plus sound), and
//! keep exactly one timer token while running.

use flare_core::{
    BeaconId, CallError, EffectArg, EffectCall, OwnerId, TimerService, TimerToken, Vec3,
};
use tracing::trace;

use crate::config::{BeaconConfig, Lifetime, SoundKind};
use crate::hooks::{BeaconHooks, BeaconView};
use crate::registry::FireContext;

/// Temp-entity effect used for the ring.
pub const RING_EFFECT: &str = "BeamRingPoint";

/// Lifecycle state of a beacon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeaconStatus {
    /// Created but never started, or torn down.
    Stopped,
    /// Firing on a timer. The only state holding a timer token.
    Running,
    /// Timer cancelled; resumable.
    Paused,
}

/// One owner's beacon.
#[derive(Debug)]
pub(crate) struct Beacon {
    pub(crate) id: BeaconId,
    pub(crate) owner: OwnerId,
    pub(crate) config: BeaconConfig,
    pub(crate) hooks: BeaconHooks,
    pub(crate) status: BeaconStatus,
    pub(crate) remaining: Lifetime,
    pub(crate) token: Option<TimerToken>,
}

impl Beacon {
    pub(crate) fn new(
        id: BeaconId,
        owner: OwnerId,
        config: BeaconConfig,
        hooks: BeaconHooks,
    ) -> Self {
        let remaining = config.duration;
        Self {
            id,
            owner,
            config,
            hooks,
            status: BeaconStatus::Stopped,
            remaining,
            token: None,
        }
    }

    pub(crate) fn view(&self) -> BeaconView<'_> {
        BeaconView {
            id: self.id,
            owner: self.owner,
            status: self.status,
            remaining: self.remaining,
            config: &self.config,
        }
    }

    /// Cancel the outstanding timer, if any.
    pub(crate) fn cancel_timer(&mut self, timer: &mut dyn TimerService) {
        if let Some(token) = self.token.take() {
            timer.cancel(token);
        }
    }

    /// Cancel the timer and park in `Paused`.
    pub(crate) fn halt(&mut self, timer: &mut dyn TimerService) {
        self.cancel_timer(timer);
        self.status = BeaconStatus::Paused;
    }

    /// Final transition to `Stopped`. Runs `on_destroy`; the caller has
    /// already cancelled the timer and removed the registry entry.
    pub(crate) fn finish(&mut self) {
        self.status = BeaconStatus::Stopped;
        let view = BeaconView {
            id: self.id,
            owner: self.owner,
            status: self.status,
            remaining: self.remaining,
            config: &self.config,
        };
        self.hooks.run_on_destroy(&view);
    }

    /// Subtract one interval from a finite lifetime. Returns whether the
    /// beacon has run out.
    pub(crate) fn countdown(&mut self) -> bool {
        if let Lifetime::Remaining(secs) = &mut self.remaining {
            *secs -= self.config.interval;
        }
        self.remaining.is_expired()
    }

    /// Hooks, ring and sound for one firing.
    pub(crate) fn emit(&mut self, ctx: &mut FireContext<'_>) -> Result<(), CallError> {
        let view = BeaconView {
            id: self.id,
            owner: self.owner,
            status: self.status,
            remaining: self.remaining,
            config: &self.config,
        };
        self.hooks.run_pre(&view);

        let origin = ctx
            .world
            .current_position(self.owner)
            .unwrap_or(Vec3::ZERO)
            + self.config.offset;
        ctx.queue
            .submit(&mut *ctx.sink, ring_call(&self.config, origin), false)?;

        if let Some(sound) = sound_call(&self.config, self.owner) {
            ctx.queue.submit(&mut *ctx.sink, sound, true)?;
        }

        self.hooks.run_post(&view);
        trace!(owner = %self.owner, beacon = %self.id, %origin, "beacon fired");
        Ok(())
    }

    /// Arrange the next firing, replacing any token still held.
    pub(crate) fn schedule_next(&mut self, timer: &mut dyn TimerService) {
        self.cancel_timer(timer);
        self.token = Some(timer.schedule_once(self.config.interval, self.id));
    }
}

/// Build the ring effect call for `origin`.
///
/// Argument order follows the engine's `BeamRingPoint` signature:
/// delay, center, start radius, end radius, model, halo, start frame,
/// frame rate, life, width, spread, amplitude, r, g, b, a, speed, flags.
pub(crate) fn ring_call(config: &BeaconConfig, origin: Vec3) -> EffectCall {
    let halo = match &config.halo {
        Some(path) => EffectArg::Model(path.clone()),
        None => EffectArg::Index(0),
    };
    let c = config.color;
    EffectCall::temp_entity(
        RING_EFFECT,
        config.recipients.clone(),
        vec![
            EffectArg::Scalar(0.0),
            EffectArg::Vector(origin),
            EffectArg::Scalar(f64::from(config.start_radius)),
            EffectArg::Scalar(f64::from(config.end_radius)),
            EffectArg::Model(config.model.clone()),
            halo,
            EffectArg::Int(i64::from(config.start_frame)),
            EffectArg::Int(i64::from(config.frame_rate)),
            EffectArg::Scalar(config.interval),
            EffectArg::Scalar(f64::from(config.width)),
            EffectArg::Scalar(f64::from(config.spread)),
            EffectArg::Scalar(f64::from(config.amplitude)),
            EffectArg::Int(i64::from(c.r)),
            EffectArg::Int(i64::from(c.g)),
            EffectArg::Int(i64::from(c.b)),
            EffectArg::Int(i64::from(c.a)),
            EffectArg::Int(i64::from(config.speed)),
            EffectArg::Int(i64::from(config.flags)),
        ],
    )
}

/// Build the sound call, if the config has one.
pub(crate) fn sound_call(config: &BeaconConfig, owner: OwnerId) -> Option<EffectCall> {
    let s = &config.sound;
    match s.kind {
        SoundKind::EmitSound => Some(EffectCall::EmitSound {
            owner,
            sound: s.path.clone(),
            volume: s.volume,
            attenuation: s.attenuation,
        }),
        SoundKind::PlaySound => Some(EffectCall::PlaySound {
            owner,
            sound: s.path.clone(),
            volume: s.volume,
        }),
        SoundKind::Silent => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Color, SoundConfig};

    fn beacon(config: BeaconConfig) -> Beacon {
        Beacon::new(BeaconId(1), OwnerId(9), config, BeaconHooks::new())
    }

    #[test]
    fn countdown_indefinite_never_expires() {
        let mut b = beacon(BeaconConfig::default());
        for _ in 0..100 {
            assert!(!b.countdown());
        }
        assert_eq!(b.remaining, Lifetime::Indefinite);
    }

    #[test]
    fn countdown_expires_on_fourth_step() {
        let mut b = beacon(BeaconConfig {
            duration: Lifetime::Remaining(6.0),
            interval: 1.5,
            ..BeaconConfig::default()
        });
        assert!(!b.countdown());
        assert!(!b.countdown());
        assert!(!b.countdown());
        assert!(b.countdown());
        assert_eq!(b.remaining, Lifetime::Remaining(0.0));
    }

    #[test]
    fn ring_call_carries_all_visual_fields() {
        let cfg = BeaconConfig {
            color: Color::rgba(10, 20, 30, 40),
            halo: Some("sprites/halo01.vmt".into()),
            ..BeaconConfig::default()
        };
        let call = ring_call(&cfg, Vec3::new(1.0, 2.0, 3.0));
        let EffectCall::TempEntity { effect, args, .. } = call else {
            panic!("expected temp entity");
        };
        assert_eq!(effect, RING_EFFECT);
        assert_eq!(args.len(), 18);
        assert_eq!(args[1], EffectArg::Vector(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(args[3], EffectArg::Scalar(350.0));
        assert_eq!(args[4], EffectArg::Model("sprites/laserbeam.vmt".into()));
        assert_eq!(args[5], EffectArg::Model("sprites/halo01.vmt".into()));
        assert_eq!(args[8], EffectArg::Scalar(1.5));
        assert_eq!(args[12..16], [
            EffectArg::Int(10),
            EffectArg::Int(20),
            EffectArg::Int(30),
            EffectArg::Int(40),
        ]);
    }

    #[test]
    fn sound_call_variants() {
        let mut cfg = BeaconConfig::default();
        assert!(matches!(
            sound_call(&cfg, OwnerId(1)),
            Some(EffectCall::EmitSound { attenuation, .. }) if attenuation == 0.75
        ));
        cfg.sound.kind = SoundKind::PlaySound;
        assert!(matches!(
            sound_call(&cfg, OwnerId(1)),
            Some(EffectCall::PlaySound { .. })
        ));
        cfg.sound = SoundConfig::silent();
        assert!(sound_call(&cfg, OwnerId(1)).is_none());
    }
}
