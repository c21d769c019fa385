//! Can-access command implementation

use anyhow::Result;
use invitely_core::{accessible_tiers, can_access_plan, PlanTier};
use tracing::{info, warn};

use super::OutputFormat;

/// Check whether a user plan unlocks content gated at a target plan
///
/// # Errors
/// Returns error if JSON serialization of the result fails
pub fn execute(user_plan: &str, target_plan: &str, output_format: OutputFormat) -> Result<String> {
    for code in [user_plan, target_plan] {
        if PlanTier::parse_code(code).is_none() {
            warn!(code, "unknown plan code, ranked as BASIC");
        }
    }

    let user_tier = PlanTier::from_code(user_plan);
    let target_tier = PlanTier::from_code(target_plan);
    let allowed = can_access_plan(user_plan, target_plan);
    let unlocked = accessible_tiers(user_plan);
    info!(%user_tier, %target_tier, allowed, "plan access checked");

    match output_format {
        OutputFormat::Human => {
            let unlocked: Vec<&str> = unlocked.iter().map(|tier| tier.code()).collect();
            Ok(format!(
                "{user_tier} (rank {}) -> {target_tier} (rank {}): {}\nUnlocked tiers: {}",
                user_tier.rank(),
                target_tier.rank(),
                if allowed { "allowed" } else { "denied" },
                unlocked.join(", ")
            ))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
            "user_plan": user_tier,
            "user_rank": user_tier.rank(),
            "target_plan": target_tier,
            "target_rank": target_tier.rank(),
            "allowed": allowed,
            "accessible_tiers": unlocked,
        }))?),
    }
}
