//! Suspicious-activity heuristic
//!
//! Two stateless rules, checked in order:
//!
//! 1. Volume: more than `max_recent_registrations` registrations from the IP
//!    inside the window. The caller supplies the count.
//! 2. Identity: the user agent carries an automation marker.
//!
//! The first rule that fires decides the reason.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ActivityPolicy;

/// Outcome of a suspicious-activity check
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub is_suspicious: bool,
    /// Why the request was flagged; `None` when it was not
    pub reason: Option<String>,
}

impl Assessment {
    #[must_use]
    pub const fn clean() -> Self {
        Self {
            is_suspicious: false,
            reason: None,
        }
    }

    #[must_use]
    pub const fn flagged(reason: String) -> Self {
        Self {
            is_suspicious: true,
            reason: Some(reason),
        }
    }
}

/// Assess one request against a policy
///
/// `recent_count` is the number of registrations already seen from `ip`
/// inside `window_minutes`. `window_minutes` only feeds the reason text; the
/// caller applied it when counting.
#[must_use]
pub fn assess(
    policy: &ActivityPolicy,
    ip: &str,
    user_agent: &str,
    recent_count: u32,
    window_minutes: u32,
) -> Assessment {
    if recent_count > policy.max_recent_registrations {
        debug!(ip, recent_count, window_minutes, "IP volume rule fired");
        return Assessment::flagged(format!(
            "Too many registrations from IP {ip}: {recent_count} in the last {window_minutes} minutes"
        ));
    }

    let agent = user_agent.to_lowercase();
    if let Some(keyword) = policy
        .agent_keywords
        .iter()
        .find(|k| agent.contains(k.as_str()))
    {
        debug!(ip, keyword = keyword.as_str(), "user-agent rule fired");
        return Assessment::flagged(format!(
            "Suspicious user agent: contains \"{keyword}\""
        ));
    }

    Assessment::clean()
}
