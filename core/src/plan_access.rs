//! Plan-tier access control
//!
//! Tiers form a total order (`BASIC < PREMIUM < LUXURY`). A user may use any
//! template or feature gated at their own tier or below.

use crate::state::PlanTier;

/// Numeric rank of a plan code; unrecognised codes rank as `BASIC` (1)
#[must_use]
pub fn tier_of(code: &str) -> u8 {
    PlanTier::from_code(code).rank()
}

/// Whether a user on `user_code` may access content gated at `target_code`
///
/// # Example
/// ```
/// use invitely_core::plan_access::can_access;
///
/// assert!(!can_access("BASIC", "PREMIUM"));
/// assert!(can_access("LUXURY", "BASIC"));
/// assert!(can_access("PREMIUM", "PREMIUM"));
/// ```
#[must_use]
pub fn can_access(user_code: &str, target_code: &str) -> bool {
    PlanTier::from_code(user_code).grants(PlanTier::from_code(target_code))
}

/// Tiers a user on `user_code` can access, lowest first
#[must_use]
pub fn accessible_tiers(user_code: &str) -> Vec<PlanTier> {
    let user = PlanTier::from_code(user_code);
    PlanTier::ALL
        .into_iter()
        .filter(|tier| user.grants(*tier))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_of() {
        assert_eq!(tier_of("BASIC"), 1);
        assert_eq!(tier_of("PREMIUM"), 2);
        assert_eq!(tier_of("LUXURY"), 3);
        assert_eq!(tier_of("GOLD"), 1);
        assert_eq!(tier_of(""), 1);
    }

    #[test]
    fn test_unknown_user_plan_is_most_restrictive() {
        assert!(can_access("GOLD", "BASIC"));
        assert!(!can_access("GOLD", "PREMIUM"));
        // Unknown target resolves to BASIC, so everyone can access it
        assert!(can_access("BASIC", "GOLD"));
    }

    #[test]
    fn test_access_matrix() {
        for user in PlanTier::ALL {
            for target in PlanTier::ALL {
                assert_eq!(
                    can_access(user.code(), target.code()),
                    target.rank() <= user.rank(),
                    "{user} -> {target}"
                );
            }
        }
    }

    #[test]
    fn test_accessible_tiers() {
        assert_eq!(accessible_tiers("BASIC"), vec![PlanTier::Basic]);
        assert_eq!(accessible_tiers("LUXURY"), PlanTier::ALL.to_vec());
    }
}
