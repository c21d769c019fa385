//! Integration tests for the suspicious-activity heuristic
//!
//! Test coverage:
//! - IP volume rule and its threshold boundary
//! - User-agent keyword rule, case-insensitive
//! - Rule precedence (volume before user agent)
//! - Clean traffic yields no reason
//! - Policy built from configuration variables

use invitely_core::{activity::assess, assess_suspicious, ActivityPolicy, Assessment};

const IP: &str = "192.0.2.44";

#[test]
fn test_volume_over_threshold() {
    let result = assess_suspicious(IP, "Mozilla/5.0", 11, 60);
    assert!(result.is_suspicious);
    assert!(
        result.reason.as_deref().unwrap_or_default().contains("11"),
        "reason should mention the registration count"
    );
}

#[test]
fn test_headless_user_agent() {
    let result = assess_suspicious(IP, "Googlebot/2.1 headless-something", 0, 60);
    assert!(result.is_suspicious);
    assert!(
        result.reason.as_deref().unwrap_or_default().contains("headless"),
        "reason should mention the matched keyword"
    );
}

#[test]
fn test_keywords_case_insensitive() {
    for agent in ["Baiduspider", "AhrefsBot/7.0", "WebCrawler 1.0", "ScrapeKit", "HEADLESS"] {
        assert!(
            assess_suspicious(IP, agent, 0, 60).is_suspicious,
            "{agent} should be flagged"
        );
    }
}

#[test]
fn test_normal_browser() {
    assert_eq!(
        assess_suspicious(IP, "Mozilla/5.0 normal browser", 3, 60),
        Assessment::clean()
    );
}

#[test]
fn test_volume_reason_wins_over_agent_reason() {
    let result = assess_suspicious(IP, "evil-crawler", 25, 30);
    let reason = result.reason.unwrap_or_default();
    assert!(reason.contains("25"));
    assert!(reason.contains("30 minutes"));
    assert!(!reason.contains("crawler"));
}

#[test]
fn test_configured_policy() {
    let policy = ActivityPolicy::from_lookup(|key| match key {
        "INVITELY_SUSPICIOUS_THRESHOLD" => Some("2".to_string()),
        "INVITELY_SUSPICIOUS_WINDOW_MINUTES" => Some("5".to_string()),
        _ => None,
    });

    assert_eq!(policy.max_recent_registrations, 2);
    assert_eq!(policy.window_minutes, 5);
    assert!(assess(&policy, IP, "Mozilla/5.0", 3, policy.window_minutes).is_suspicious);
    assert!(!assess(&policy, IP, "Mozilla/5.0", 2, policy.window_minutes).is_suspicious);
}
