//! Assess command implementation

use anyhow::Result;
use invitely_core::{activity, ActivityPolicy};
use tracing::{info, warn};

use super::OutputFormat;

/// Run the suspicious-activity heuristic for one request
///
/// `window_minutes` defaults to the policy window. The command succeeds for
/// both outcomes; a flagged request is reported, not treated as an error.
///
/// # Errors
/// Returns error if JSON serialization of the result fails
pub fn execute(
    policy: &ActivityPolicy,
    ip: &str,
    user_agent: &str,
    recent_count: u32,
    window_minutes: Option<u32>,
    output_format: OutputFormat,
) -> Result<String> {
    let window_minutes = window_minutes.unwrap_or(policy.window_minutes);
    let assessment = activity::assess(policy, ip, user_agent, recent_count, window_minutes);

    if assessment.is_suspicious {
        warn!(ip, reason = ?assessment.reason, "request would be flagged");
    } else {
        info!(ip, "request looks clean");
    }

    match output_format {
        OutputFormat::Human => Ok(assessment.reason.map_or_else(
            || format!("Not suspicious: {ip} ({recent_count} in {window_minutes} min)"),
            |reason| format!("Suspicious: {reason}"),
        )),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
            "ip": ip,
            "user_agent": user_agent,
            "recent_count": recent_count,
            "window_minutes": window_minutes,
            "threshold": policy.max_recent_registrations,
            "assessment": assessment,
        }))?),
    }
}
