//! Effect calls, their arguments, and recipient filters.
//!
//! An [`EffectCall`] is the unit of work handled by the dispatch queue:
//! a call target plus the positional arguments the host's effect
//! call-out expects. Calls are immutable once built and are executed
//! by an [`EffectSink`](crate::EffectSink).

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::id::OwnerId;
use crate::vector::Vec3;

/// One positional argument of a temporary-entity effect.
///
/// The variant is chosen by whoever builds the call. Nothing downstream
/// inspects a value to guess whether it is a vector, an entity index or
/// a model path.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectArg {
    /// A world-space vector (origin, direction, extent).
    Vector(Vec3),
    /// An entity index.
    Index(i32),
    /// A floating-point scalar (radius, life, amplitude).
    Scalar(f64),
    /// An integer scalar (frame, colour channel, flags).
    Int(i64),
    /// A model or material path, precached by the sink before the call.
    Model(String),
}

impl From<Vec3> for EffectArg {
    fn from(v: Vec3) -> Self {
        Self::Vector(v)
    }
}

impl From<f64> for EffectArg {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<i64> for EffectArg {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

/// Who receives an effect.
///
/// # Examples
///
/// ```
/// use flare_core::{OwnerId, Recipients};
///
/// let some = Recipients::only([OwnerId(2), OwnerId(5)]);
/// assert!(some.includes(OwnerId(5)));
/// assert!(!some.includes(OwnerId(3)));
/// assert!(Recipients::All.includes(OwnerId(3)));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipients {
    /// Every connected client.
    #[default]
    All,
    /// An explicit list of owners. Owners that no longer exist are
    /// skipped by the sink.
    Only(SmallVec<[OwnerId; 4]>),
}

impl Recipients {
    /// Build an explicit recipient list.
    pub fn only(owners: impl IntoIterator<Item = OwnerId>) -> Self {
        Self::Only(owners.into_iter().collect())
    }

    /// Whether `owner` is in the filter.
    pub fn includes(&self, owner: OwnerId) -> bool {
        match self {
            Self::All => true,
            Self::Only(list) => list.contains(&owner),
        }
    }
}

/// A pending effect call: target plus positional arguments.
///
/// # Examples
///
/// ```
/// use flare_core::{EffectArg, EffectCall, OwnerId, Recipients, Vec3};
///
/// let ring = EffectCall::temp_entity(
///     "BeamRingPoint",
///     Recipients::All,
///     vec![EffectArg::Scalar(0.0), EffectArg::Vector(Vec3::ZERO)],
/// );
/// assert_eq!(ring.name(), "BeamRingPoint");
///
/// let blip = EffectCall::PlaySound {
///     owner: OwnerId(3),
///     sound: "buttons/blip1.wav".into(),
///     volume: 1.0,
/// };
/// assert_eq!(blip.name(), "playsound");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum EffectCall {
    /// A temporary-entity effect, resolved by name by the sink.
    TempEntity {
        /// Effect name, e.g. `BeamRingPoint`.
        effect: Cow<'static, str>,
        /// Clients that should see the effect.
        recipients: Recipients,
        /// Positional arguments after the recipient filter.
        args: Vec<EffectArg>,
    },
    /// A sound emitted from the owner entity, attenuated with distance.
    EmitSound {
        /// Entity the sound is attached to.
        owner: OwnerId,
        /// Sound path.
        sound: String,
        /// Volume in `[0, 1]`.
        volume: f32,
        /// Distance attenuation factor.
        attenuation: f32,
    },
    /// A sound played directly to the owner's client.
    PlaySound {
        /// Client that hears the sound.
        owner: OwnerId,
        /// Sound path.
        sound: String,
        /// Volume in `[0, 1]`.
        volume: f32,
    },
}

impl EffectCall {
    /// Build a temporary-entity call.
    pub fn temp_entity(
        effect: impl Into<Cow<'static, str>>,
        recipients: Recipients,
        args: Vec<EffectArg>,
    ) -> Self {
        Self::TempEntity {
            effect: effect.into(),
            recipients,
            args,
        }
    }

    /// Short name of the call target, for logs and diagnostics.
    pub fn name(&self) -> &str {
        match self {
            Self::TempEntity { effect, .. } => effect,
            Self::EmitSound { .. } => "emitsound",
            Self::PlaySound { .. } => "playsound",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipients_default_is_all() {
        assert_eq!(Recipients::default(), Recipients::All);
    }

    #[test]
    fn arg_conversions_pick_expected_variant() {
        assert_eq!(EffectArg::from(1.5f64), EffectArg::Scalar(1.5));
        assert_eq!(EffectArg::from(4i64), EffectArg::Int(4));
        assert_eq!(
            EffectArg::from(Vec3::new(1.0, 2.0, 3.0)),
            EffectArg::Vector(Vec3::new(1.0, 2.0, 3.0))
        );
    }

    #[test]
    fn emit_sound_name() {
        let call = EffectCall::EmitSound {
            owner: OwnerId(1),
            sound: "a.wav".into(),
            volume: 1.0,
            attenuation: 0.75,
        };
        assert_eq!(call.name(), "emitsound");
    }
}
