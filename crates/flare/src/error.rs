//! Host-level error type.

use flare_core::{CallError, ConfigError};
use thiserror::Error;

/// Any failure surfaced by [`EffectsHost`](crate::EffectsHost).
#[derive(Clone, Debug, PartialEq, Error)]
pub enum HostError {
    /// An effect or sound call-out failed.
    #[error(transparent)]
    Call(#[from] CallError),
    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
