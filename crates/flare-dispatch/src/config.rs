//! Dispatch queue configuration and validation.

use flare_core::ConfigError;
use serde::{Deserialize, Serialize};

/// Default number of throttled calls executed immediately per tick.
///
/// The engine's temp-entity limit is 32 per update, checked
/// inclusively, which admits 33.
pub const DEFAULT_BUDGET: usize = 33;

/// Configuration for a [`DispatchQueue`](crate::DispatchQueue).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    /// Throttled calls executed immediately per tick. Default: 33.
    pub budget: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
        }
    }
}

impl QueueConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.budget == 0 {
            return Err(ConfigError::ZeroBudget);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = QueueConfig::default();
        assert_eq!(cfg.budget, DEFAULT_BUDGET);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_budget_rejected() {
        let cfg = QueueConfig { budget: 0 };
        match cfg.validate() {
            Err(ConfigError::ZeroBudget) => {}
            other => panic!("expected ZeroBudget, got {other:?}"),
        }
    }
}
