//! Guard constants
//!
//! Fixed bounds and defaults shared by the fingerprint, heuristic and quota
//! components. Thresholds that operators tune at runtime live in
//! [`crate::config::ActivityPolicy`]; the values here are its defaults.

/// Minimum accepted fingerprint length in characters
pub const MIN_FINGERPRINT_LEN: usize = 32;

/// Maximum accepted fingerprint length in characters
///
/// A SHA-256 digest rendered as hex is exactly this long, so generated
/// fingerprints always sit on the upper bound.
pub const MAX_FINGERPRINT_LEN: usize = 64;

/// Default number of registrations from one IP tolerated inside the window
///
/// Traffic is flagged once the recent count is strictly greater than this.
pub const DEFAULT_SUSPICIOUS_THRESHOLD: u32 = 10;

/// Default size of the IP-volume window in minutes
pub const DEFAULT_SUSPICIOUS_WINDOW_MINUTES: u32 = 60;

/// User-agent markers that identify automated clients, in scan order
///
/// Automation-framework markers come before the generic `bot` suffix so the
/// reason names the most specific marker present.
pub const SUSPICIOUS_AGENT_KEYWORDS: [&str; 5] = ["headless", "scrape", "spider", "crawler", "bot"];
