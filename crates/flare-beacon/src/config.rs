//! Beacon configuration, defaults, and validation.
//!
//! Every field the beacon understands is enumerated here with its
//! default. Configs deserialize with all fields optional, so a host
//! config file only needs to list what it changes.

use flare_core::{ConfigError, Recipients, Vec3};
use serde::{Deserialize, Serialize};

// ── Lifetime ───────────────────────────────────────────────────────

/// How long a beacon keeps firing.
///
/// Serialized as an optional number of seconds: absent means
/// [`Indefinite`](Lifetime::Indefinite).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Lifetime {
    /// Fire until stopped.
    #[default]
    Indefinite,
    /// Seconds left. Each firing subtracts one interval first; the
    /// beacon stops on the firing that brings this to zero or below.
    Remaining(f64),
}

impl Lifetime {
    /// Whether the beacon has no time left. Never true for
    /// [`Indefinite`](Lifetime::Indefinite).
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Remaining(secs) if *secs <= 0.0)
    }
}

impl From<Option<f64>> for Lifetime {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Self::Indefinite, Self::Remaining)
    }
}

impl From<Lifetime> for Option<f64> {
    fn from(v: Lifetime) -> Self {
        match v {
            Lifetime::Indefinite => None,
            Lifetime::Remaining(secs) => Some(secs),
        }
    }
}

// ── Color ──────────────────────────────────────────────────────────

/// RGBA colour of the ring. Default: opaque white.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Build a colour from its channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgba(255, 255, 255, 255)
    }
}

// ── Sound ──────────────────────────────────────────────────────────

/// How the beacon's sound is played.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundKind {
    /// Emitted from the owner entity, heard by everyone nearby.
    #[default]
    EmitSound,
    /// Played directly to the owner's client.
    PlaySound,
    /// No sound.
    Silent,
}

/// Sound played on every firing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SoundConfig {
    /// Sound path. Default: `buttons/blip1.wav`.
    pub path: String,
    /// Playback variant. Default: [`SoundKind::EmitSound`].
    pub kind: SoundKind,
    /// Volume in `[0, 1]`. Default: 1.0.
    pub volume: f32,
    /// Distance attenuation, only used by `EmitSound`. Default: 0.75.
    pub attenuation: f32,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            path: "buttons/blip1.wav".to_string(),
            kind: SoundKind::EmitSound,
            volume: 1.0,
            attenuation: 0.75,
        }
    }
}

impl SoundConfig {
    /// A config that plays nothing.
    pub fn silent() -> Self {
        Self {
            kind: SoundKind::Silent,
            ..Self::default()
        }
    }
}

// ── BeaconConfig ───────────────────────────────────────────────────

/// Shortest accepted firing interval, in seconds.
///
/// Below this a beacon would fire many times per server update, and the
/// countdown of a finite duration stops making progress in `f64`.
pub const MIN_INTERVAL: f64 = 0.01;

/// Complete configuration of one beacon.
///
/// Immutable for the lifetime of a beacon instance. Use struct update
/// syntax over [`Default`] to change individual fields:
///
/// ```
/// use flare_beacon::{BeaconConfig, Color, Lifetime};
///
/// let cfg = BeaconConfig {
///     color: Color::rgba(255, 0, 0, 255),
///     duration: Lifetime::Remaining(6.0),
///     ..BeaconConfig::default()
/// };
/// assert!(cfg.validate().is_ok());
/// assert_eq!(cfg.interval, 1.5);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BeaconConfig {
    /// Clients that see the ring. Default: all.
    pub recipients: Recipients,
    /// Ring radius at spawn. Default: 0.
    pub start_radius: f32,
    /// Ring radius at end of life. Default: 350.
    pub end_radius: f32,
    /// Beam material. Default: `sprites/laserbeam.vmt`.
    pub model: String,
    /// Halo material, if any. Default: none.
    pub halo: Option<String>,
    /// First animation frame. Default: 0.
    pub start_frame: i32,
    /// Animation frame rate. Default: 255.
    pub frame_rate: i32,
    /// Beam width. Default: 2.
    pub width: f32,
    /// Beam spread. Default: 0.
    pub spread: f32,
    /// Beam noise amplitude. Default: 0.
    pub amplitude: f32,
    /// Ring colour. Default: opaque white.
    pub color: Color,
    /// Beam scroll speed. Default: 1.
    pub speed: i32,
    /// Beam flags. Default: 0.
    pub flags: i32,
    /// Offset added to the owner position. Default: `(0, 0, 5)`.
    pub offset: Vec3,
    /// Sound played on each firing.
    pub sound: SoundConfig,
    /// How long the beacon keeps firing. Default: indefinitely.
    pub duration: Lifetime,
    /// Seconds between firings; also the ring's life. Default: 1.5.
    pub interval: f64,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            recipients: Recipients::All,
            start_radius: 0.0,
            end_radius: 350.0,
            model: "sprites/laserbeam.vmt".to_string(),
            halo: None,
            start_frame: 0,
            frame_rate: 255,
            width: 2.0,
            spread: 0.0,
            amplitude: 0.0,
            color: Color::default(),
            speed: 1,
            flags: 0,
            offset: Vec3::new(0.0, 0.0, 5.0),
            sound: SoundConfig::default(),
            duration: Lifetime::Indefinite,
            interval: 1.5,
        }
    }
}

impl BeaconConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Interval drives both the timer and the countdown.
        if !self.interval.is_finite() || self.interval < MIN_INTERVAL {
            return Err(ConfigError::InvalidInterval {
                value: self.interval,
            });
        }
        // 2. A finite countdown, if any.
        if let Lifetime::Remaining(secs) = self.duration {
            if !secs.is_finite() {
                return Err(ConfigError::InvalidDuration { value: secs });
            }
        }
        // 3. Ring geometry.
        for (name, value) in [
            ("start_radius", self.start_radius),
            ("end_radius", self.end_radius),
            ("width", self.width),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidVisual {
                    reason: format!("{name} must be finite and non-negative, got {value}"),
                });
            }
        }
        for (name, value) in [("spread", self.spread), ("amplitude", self.amplitude)] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidVisual {
                    reason: format!("{name} must be finite, got {value}"),
                });
            }
        }
        if !self.offset.is_finite() {
            return Err(ConfigError::InvalidVisual {
                reason: format!("offset must be finite, got {}", self.offset),
            });
        }
        if self.model.is_empty() {
            return Err(ConfigError::InvalidVisual {
                reason: "model path is empty".to_string(),
            });
        }
        // 4. Sound, unless disabled.
        let s = &self.sound;
        if s.kind != SoundKind::Silent {
            if s.path.is_empty() {
                return Err(ConfigError::InvalidSound {
                    reason: "sound path is empty".to_string(),
                });
            }
            if !s.volume.is_finite() || !(0.0..=1.0).contains(&s.volume) {
                return Err(ConfigError::InvalidSound {
                    reason: format!("volume must be in [0.0, 1.0], got {}", s.volume),
                });
            }
            if !s.attenuation.is_finite() || s.attenuation < 0.0 {
                return Err(ConfigError::InvalidSound {
                    reason: format!(
                        "attenuation must be finite and non-negative, got {}",
                        s.attenuation
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = BeaconConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.end_radius, 350.0);
        assert_eq!(cfg.offset, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(cfg.sound.kind, SoundKind::EmitSound);
        assert_eq!(cfg.duration, Lifetime::Indefinite);
    }

    #[test]
    fn zero_interval_rejected() {
        let cfg = BeaconConfig {
            interval: 0.0,
            ..BeaconConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::InvalidInterval { .. }) => {}
            other => panic!("expected InvalidInterval, got {other:?}"),
        }
    }

    #[test]
    fn tiny_interval_rejected() {
        for interval in [1e-20, f64::MIN_POSITIVE, MIN_INTERVAL / 2.0] {
            let cfg = BeaconConfig {
                interval,
                ..BeaconConfig::default()
            };
            match cfg.validate() {
                Err(ConfigError::InvalidInterval { value }) => assert_eq!(value, interval),
                other => panic!("expected InvalidInterval, got {other:?}"),
            }
        }
        let cfg = BeaconConfig {
            interval: MIN_INTERVAL,
            ..BeaconConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn nan_interval_rejected() {
        let cfg = BeaconConfig {
            interval: f64::NAN,
            ..BeaconConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn infinite_duration_rejected() {
        let cfg = BeaconConfig {
            duration: Lifetime::Remaining(f64::INFINITY),
            ..BeaconConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn negative_radius_rejected() {
        let cfg = BeaconConfig {
            end_radius: -1.0,
            ..BeaconConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::InvalidVisual { reason }) => assert!(reason.contains("end_radius")),
            other => panic!("expected InvalidVisual, got {other:?}"),
        }
    }

    #[test]
    fn loud_volume_rejected_unless_silent() {
        let mut cfg = BeaconConfig::default();
        cfg.sound.volume = 2.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidSound { .. })
        ));
        cfg.sound.kind = SoundKind::Silent;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn lifetime_expiry() {
        assert!(!Lifetime::Indefinite.is_expired());
        assert!(!Lifetime::Remaining(0.5).is_expired());
        assert!(Lifetime::Remaining(0.0).is_expired());
        assert!(Lifetime::Remaining(-1.5).is_expired());
    }

    #[test]
    fn lifetime_option_conversions() {
        assert_eq!(Lifetime::from(None), Lifetime::Indefinite);
        assert_eq!(Lifetime::from(Some(6.0)), Lifetime::Remaining(6.0));
        assert_eq!(Option::<f64>::from(Lifetime::Remaining(2.0)), Some(2.0));
        assert_eq!(Option::<f64>::from(Lifetime::Indefinite), None);
    }
}
