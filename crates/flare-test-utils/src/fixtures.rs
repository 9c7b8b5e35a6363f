//! Reusable sink fixtures.
//!
//! - [`RecordingSink`] — records every call in execution order.
//! - [`FailingSink`] — succeeds N times, then fails every call.
//! - [`StrictSink`] — checks temp entities against known signatures.
//! - [`tagged_call`] — a throwaway call carrying an integer tag, for
//!   ordering assertions.

use std::collections::HashMap;

use flare_core::{CallError, EffectArg, EffectCall, EffectSink, Recipients};

/// Effect name used by [`tagged_call`].
pub const TAGGED_EFFECT: &str = "Tagged";

/// Build a temp-entity call whose single argument is `tag`.
pub fn tagged_call(tag: i64) -> EffectCall {
    EffectCall::temp_entity(TAGGED_EFFECT, Recipients::All, vec![EffectArg::Int(tag)])
}

/// Records every executed call.
///
/// Optionally fails calls whose target name matches
/// [`fail_on`](RecordingSink::fail_on). Failed calls are not recorded.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    calls: Vec<EffectCall>,
    fail_on: Option<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call whose [`EffectCall::name`] equals `name`.
    pub fn fail_on(mut self, name: impl Into<String>) -> Self {
        self.fail_on = Some(name.into());
        self
    }

    /// Stop failing calls.
    pub fn heal(&mut self) {
        self.fail_on = None;
    }

    /// Every successfully executed call, in order.
    pub fn calls(&self) -> &[EffectCall] {
        &self.calls
    }

    /// Names of executed calls, in order.
    pub fn names(&self) -> Vec<String> {
        self.calls.iter().map(|c| c.name().to_string()).collect()
    }

    /// Number of executed calls named `name`.
    pub fn count(&self, name: &str) -> usize {
        self.calls.iter().filter(|c| c.name() == name).count()
    }

    /// Tags of executed [`tagged_call`]s, in order.
    pub fn tags(&self) -> Vec<i64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                EffectCall::TempEntity { effect, args, .. } if effect == TAGGED_EFFECT => {
                    match args.first() {
                        Some(EffectArg::Int(tag)) => Some(*tag),
                        _ => None,
                    }
                }
                _ => None,
            })
            .collect()
    }

    /// Forget recorded calls.
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl EffectSink for RecordingSink {
    fn emit(&mut self, call: &EffectCall) -> Result<(), CallError> {
        if self.fail_on.as_deref() == Some(call.name()) {
            return Err(CallError::Failed {
                call: call.name().to_string(),
                reason: "deliberate failure".to_string(),
            });
        }
        self.calls.push(call.clone());
        Ok(())
    }
}

/// Succeeds `succeed_count` times, then fails every call.
#[derive(Clone, Debug)]
pub struct FailingSink {
    pub succeed_count: usize,
    call_count: usize,
    executed: Vec<EffectCall>,
}

impl FailingSink {
    /// Create a sink that succeeds `succeed_count` times then fails.
    pub fn new(succeed_count: usize) -> Self {
        Self {
            succeed_count,
            call_count: 0,
            executed: Vec::new(),
        }
    }

    /// How many times `emit()` has been called, failures included.
    pub fn calls(&self) -> usize {
        self.call_count
    }

    /// Calls that succeeded, in order.
    pub fn executed(&self) -> &[EffectCall] {
        &self.executed
    }
}

impl EffectSink for FailingSink {
    fn emit(&mut self, call: &EffectCall) -> Result<(), CallError> {
        let n = self.call_count;
        self.call_count += 1;
        if n >= self.succeed_count {
            return Err(CallError::Failed {
                call: call.name().to_string(),
                reason: format!(
                    "deliberate failure after {} successful calls",
                    self.succeed_count
                ),
            });
        }
        self.executed.push(call.clone());
        Ok(())
    }
}

/// Rejects temp entities the engine would reject, records the rest.
///
/// Only effects registered with [`with_effect`](StrictSink::with_effect)
/// are accepted, and only with their exact argument count. Sounds are
/// always accepted.
#[derive(Clone, Debug, Default)]
pub struct StrictSink {
    signatures: HashMap<String, usize>,
    recorded: RecordingSink,
}

impl StrictSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `name` with exactly `arity` arguments.
    pub fn with_effect(mut self, name: impl Into<String>, arity: usize) -> Self {
        self.signatures.insert(name.into(), arity);
        self
    }

    /// Calls that passed the signature check.
    pub fn recorded(&self) -> &RecordingSink {
        &self.recorded
    }
}

impl EffectSink for StrictSink {
    fn emit(&mut self, call: &EffectCall) -> Result<(), CallError> {
        if let EffectCall::TempEntity { effect, args, .. } = call {
            let Some(&required) = self.signatures.get(effect.as_ref()) else {
                return Err(CallError::UnknownEffect {
                    name: effect.to_string(),
                });
            };
            if args.len() != required {
                return Err(CallError::ArgumentCount {
                    effect: effect.to_string(),
                    given: args.len(),
                    required,
                });
            }
        }
        self.recorded.emit(call)
    }
}
