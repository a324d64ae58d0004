//! Device-level settings shared by every session on an accelerator.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Accelerator configuration
///
/// Loaded once per device (typically deserialized from the platform's
/// configuration) and borrowed by the [`SessionManager`](crate::SessionManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceleratorConfig {
    /// Smallest `ctx_size` the device accepts (128-byte units minus one)
    pub min_context_size: u8,
    /// Engine group that serves record instructions (3 bits)
    pub engine_group: u8,
    /// Permit write sessions to take their IV from the SA (debug only)
    pub allow_sa_iv_source: bool,
    /// Pause before reloading a context whose invalidation write failed
    pub destroy_settle_delay: Duration,
}

impl Default for AcceleratorConfig {
    fn default() -> Self {
        Self {
            min_context_size: 1,
            engine_group: 0,
            allow_sa_iv_source: false,
            destroy_settle_delay: Duration::from_millis(1),
        }
    }
}

impl AcceleratorConfig {
    /// Check that every field fits its hardware encoding.
    ///
    /// # Errors
    ///
    /// - `ConfigError::MinContextSize` if `min_context_size > 15`
    /// - `ConfigError::EngineGroup` if `engine_group > 7`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_context_size > 15 {
            return Err(ConfigError::MinContextSize(self.min_context_size));
        }
        if self.engine_group > 7 {
            return Err(ConfigError::EngineGroup(self.engine_group));
        }
        Ok(())
    }
}
