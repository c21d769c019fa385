//! Runtime configuration for the guard
//!
//! The suspicious-activity threshold and window are operator settings, not
//! business constants, so they are read from environment variables with
//! defaults from [`crate::constants`].

use std::env;

use crate::constants::{
    DEFAULT_SUSPICIOUS_THRESHOLD, DEFAULT_SUSPICIOUS_WINDOW_MINUTES, SUSPICIOUS_AGENT_KEYWORDS,
};

/// Tunables for the suspicious-activity heuristic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityPolicy {
    /// Registrations from one IP tolerated inside the window; more is suspicious
    pub max_recent_registrations: u32,

    /// Length of the IP-volume window in minutes
    pub window_minutes: u32,

    /// Lower-case user-agent markers, matched in order
    pub agent_keywords: Vec<String>,
}

impl ActivityPolicy {
    /// Build a policy from environment variables, falling back to defaults
    ///
    /// - `INVITELY_SUSPICIOUS_THRESHOLD`
    /// - `INVITELY_SUSPICIOUS_WINDOW_MINUTES`
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a policy from any variable source; unset or unparsable values
    /// fall back to defaults
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            max_recent_registrations: lookup("INVITELY_SUSPICIOUS_THRESHOLD")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SUSPICIOUS_THRESHOLD),

            window_minutes: lookup("INVITELY_SUSPICIOUS_WINDOW_MINUTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SUSPICIOUS_WINDOW_MINUTES),

            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_threshold(mut self, max_recent_registrations: u32) -> Self {
        self.max_recent_registrations = max_recent_registrations;
        self
    }

    #[must_use]
    pub const fn with_window_minutes(mut self, window_minutes: u32) -> Self {
        self.window_minutes = window_minutes;
        self
    }

    /// Window length as a `chrono` duration
    #[must_use]
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.window_minutes))
    }
}

impl Default for ActivityPolicy {
    fn default() -> Self {
        Self {
            max_recent_registrations: DEFAULT_SUSPICIOUS_THRESHOLD,
            window_minutes: DEFAULT_SUSPICIOUS_WINDOW_MINUTES,
            agent_keywords: SUSPICIOUS_AGENT_KEYWORDS
                .iter()
                .map(|k| (*k).to_string())
                .collect(),
        }
    }
}
