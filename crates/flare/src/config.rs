//! Host configuration and TOML loading.

use flare_beacon::BeaconConfig;
use flare_core::ConfigError;
use flare_dispatch::QueueConfig;
use serde::{Deserialize, Serialize};

/// Complete configuration for an [`EffectsHost`](crate::EffectsHost).
///
/// Every field is optional in TOML; omitted fields take their defaults.
///
/// ```
/// use flare::HostConfig;
///
/// let cfg = HostConfig::from_toml_str(r#"
///     [queue]
///     budget = 16
///
///     [beacon]
///     interval = 2.0
///     duration = 10.0
/// "#).unwrap();
/// assert_eq!(cfg.queue.budget, 16);
/// assert_eq!(cfg.beacon.end_radius, 350.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Dispatch throttling.
    pub queue: QueueConfig,
    /// Template used by [`EffectsHost::create_beacon`](crate::EffectsHost::create_beacon).
    pub beacon: BeaconConfig,
}

impl HostConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed TOML or unknown keys, or the
    /// validation error of the first invalid section.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.queue.validate()?;
        self.beacon.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flare_beacon::{Lifetime, SoundKind};

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = HostConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, HostConfig::default());
    }

    #[test]
    fn nested_fields_override_defaults() {
        let cfg = HostConfig::from_toml_str(
            r#"
            [beacon]
            duration = 6.0
            color = { r = 255, g = 0, b = 0 }
            offset = { z = 10.0 }

            [beacon.sound]
            kind = "play_sound"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.beacon.duration, Lifetime::Remaining(6.0));
        assert_eq!(cfg.beacon.color.g, 0);
        assert_eq!(cfg.beacon.color.a, 255);
        assert_eq!(cfg.beacon.offset.z, 10.0);
        assert_eq!(cfg.beacon.sound.kind, SoundKind::PlaySound);
        assert_eq!(cfg.beacon.sound.path, "buttons/blip1.wav");
    }

    #[test]
    fn unknown_key_is_parse_error() {
        match HostConfig::from_toml_str("[beacon]\nradius = 3\n") {
            Err(ConfigError::Parse { .. }) => {}
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn invalid_values_fail_validation() {
        match HostConfig::from_toml_str("[queue]\nbudget = 0\n") {
            Err(ConfigError::ZeroBudget) => {}
            other => panic!("expected ZeroBudget, got {other:?}"),
        }
        match HostConfig::from_toml_str("[beacon]\ninterval = -2.0\n") {
            Err(ConfigError::InvalidInterval { .. }) => {}
            other => panic!("expected InvalidInterval, got {other:?}"),
        }
    }
}
