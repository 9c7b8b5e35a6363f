//! Error types for the Flare effect scheduler.
//!
//! Organized by subsystem: effect call-outs ([`CallError`]) and
//! configuration validation ([`ConfigError`]). Throttling is not an
//! error: over-budget calls are deferred, never rejected.

use thiserror::Error;

/// Failure of the host's effect or sound call-out.
///
/// Propagated synchronously to whoever triggered the call (a direct
/// submit, a queue flush, or a beacon firing). Never retried.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CallError {
    /// The sink does not know the named effect.
    #[error("effect '{name}' does not exist")]
    UnknownEffect {
        /// Requested effect name.
        name: String,
    },
    /// The argument list does not match the effect's signature.
    #[error("invalid number of arguments for '{effect}': given {given}, required {required}")]
    ArgumentCount {
        /// Effect name.
        effect: String,
        /// Number of arguments supplied.
        given: usize,
        /// Number of arguments the effect takes.
        required: usize,
    },
    /// The call-out itself failed.
    #[error("call '{call}' failed: {reason}")]
    Failed {
        /// Name of the failing call target.
        call: String,
        /// Human-readable description of the failure.
        reason: String,
    },
}

/// Errors detected while validating configuration.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Dispatch budget is zero.
    #[error("dispatch budget must be at least 1")]
    ZeroBudget,
    /// Beacon interval is NaN, infinite, or below the minimum.
    #[error("interval must be finite and at least 0.01 s, got {value}")]
    InvalidInterval {
        /// The invalid value.
        value: f64,
    },
    /// Beacon duration is NaN or infinite.
    #[error("duration must be finite, got {value}")]
    InvalidDuration {
        /// The invalid value.
        value: f64,
    },
    /// A visual parameter is out of range.
    #[error("invalid visual parameter: {reason}")]
    InvalidVisual {
        /// Description of which parameter was rejected.
        reason: String,
    },
    /// A sound parameter is out of range.
    #[error("invalid sound parameter: {reason}")]
    InvalidSound {
        /// Description of which parameter was rejected.
        reason: String,
    },
    /// A configuration document could not be parsed.
    #[error("config parse error: {reason}")]
    Parse {
        /// Parser diagnostic.
        reason: String,
    },
}
