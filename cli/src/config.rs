//! Configuration management for the Invitely CLI
//!
//! Values come from environment variables with sensible defaults; command
//! line flags override them.

use std::env;

use invitely_core::ActivityPolicy;

/// Centralized configuration for the Invitely CLI
#[derive(Debug, Clone)]
pub struct InvitelyCliConfig {
    /// Default output format for CLI commands
    pub default_output_format: String,

    /// Concurrent workers used by `simulate-quota` when `--workers` is absent
    pub simulation_workers: usize,

    /// Suspicious-activity tunables used by `assess`
    pub activity_policy: ActivityPolicy,
}

impl InvitelyCliConfig {
    /// Create a new configuration instance with values from environment variables
    /// or sensible defaults if not set
    #[must_use]
    pub fn new() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any variable source
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            default_output_format: lookup("INVITELY_DEFAULT_OUTPUT_FORMAT")
                .unwrap_or_else(|| "human".to_string()),

            simulation_workers: lookup("INVITELY_SIMULATION_WORKERS")
                .and_then(|s| s.parse().ok())
                .filter(|workers| *workers > 0)
                .unwrap_or(8),

            activity_policy: ActivityPolicy::from_lookup(&lookup),
        }
    }
}

impl Default for InvitelyCliConfig {
    fn default() -> Self {
        Self::new()
    }
}
