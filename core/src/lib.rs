//! Invitely Guard - guest identity, anti-fraud and link-quota core
//!
//! The request-independent core behind invitation views and RSVP tracking on
//! the Invitely platform. It provides:
//!
//! - Device fingerprints derived from browser signals (SHA-256 over a canonical encoding)
//! - Fingerprint validation before a client-supplied value is trusted
//! - A suspicious-activity heuristic over IP volume and user-agent markers
//! - Link-quota accounting with atomic "consume if below ceiling" semantics
//! - Plan-tier access control over the `BASIC < PREMIUM < LUXURY` order
//! - Order approval, guest de-duplication and explicit change events
//!
//! Transport, persistence and authentication belong to the caller. Stores
//! are traits with in-memory implementations for single-process use.
//!
//! # Example Usage
//!
//! ```
//! use invitely_core::{
//!     can_access_plan, consume_quota, generate_fingerprint, grant_quota, remaining_quota,
//!     validate_fingerprint, FingerprintInputs, InMemoryQuotaStore, InvitationId, LinkKind,
//! };
//!
//! # fn main() -> invitely_core::Result<()> {
//! let inputs = FingerprintInputs::new("Mozilla/5.0", "1920x1080", "-60", "en-GB,en");
//! let fingerprint = generate_fingerprint(&inputs);
//! validate_fingerprint(fingerprint.as_str())?;
//!
//! let store = InMemoryQuotaStore::new();
//! let invitation = InvitationId::from("wedding-ana-and-luis");
//! grant_quota(&store, &invitation, 100, 5)?;
//! consume_quota(&store, &invitation, LinkKind::Regular)?;
//! assert_eq!(remaining_quota(&store, &invitation, LinkKind::Regular), 99);
//!
//! assert!(can_access_plan("LUXURY", "PREMIUM"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod activity;
pub mod admission;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod errors;
pub mod events;
pub mod fingerprint;
pub mod guest_log;
pub mod guest_records;
pub mod orders;
pub mod plan_access;
pub mod quota;
pub mod state;
pub mod validation;

// Re-export commonly used items
pub use activity::Assessment;
pub use admission::{Admission, FingerprintSource, GuestGate, GuestRequest};
pub use config::ActivityPolicy;
pub use dispatch::EventDispatcher;
pub use errors::{InvitelyError, OrderError, QuotaError, Result, ValidationError};
pub use events::{
    GuardEvent, OrderApproved, QuotaConsumed, QuotaGranted, QuotaRegranted,
    SuspiciousActivityFlagged,
};
pub use fingerprint::{Fingerprint, FingerprintInputs};
pub use guest_log::{GuestEventStore, InMemoryGuestLog};
pub use guest_records::{GuestRecord, GuestRecordStore, InMemoryGuestRecords};
pub use orders::{approve_order, reject_order};
pub use plan_access::{accessible_tiers, can_access, tier_of};
pub use quota::{InMemoryQuotaStore, QuotaStore};
pub use state::{
    GuestViewEvent, InvitationId, LinkGrant, LinkKind, LinkQuota, Order, OrderId, OrderStatus,
    Plan, PlanTier,
};
pub use validation::{parse_fingerprint, validate_fingerprint};

/// Derive the fingerprint for a set of browser signals
#[must_use]
pub fn generate_fingerprint(inputs: &FingerprintInputs) -> Fingerprint {
    fingerprint::generate(inputs)
}

/// Assess a request with the default threshold (10 registrations)
///
/// Use [`activity::assess`] with an [`ActivityPolicy`] to change the threshold
/// or keyword list.
#[must_use]
pub fn assess_suspicious(
    ip: &str,
    user_agent: &str,
    recent_count: u32,
    window_minutes: u32,
) -> Assessment {
    activity::assess(
        &ActivityPolicy::default(),
        ip,
        user_agent,
        recent_count,
        window_minutes,
    )
}

/// Grant an invitation its regular and test links, once
pub fn grant_quota<S: QuotaStore + ?Sized>(
    store: &S,
    invitation: &InvitationId,
    regular: u32,
    test: u32,
) -> std::result::Result<QuotaGranted, QuotaError> {
    store.grant(invitation, LinkGrant::new(regular, test))
}

/// Consume one link of `kind`, failing with `QuotaExceeded` at the ceiling
pub fn consume_quota<S: QuotaStore + ?Sized>(
    store: &S,
    invitation: &InvitationId,
    kind: LinkKind,
) -> std::result::Result<QuotaConsumed, QuotaError> {
    store.consume(invitation, kind)
}

/// Links of `kind` still available, never negative
pub fn remaining_quota<S: QuotaStore + ?Sized>(
    store: &S,
    invitation: &InvitationId,
    kind: LinkKind,
) -> u32 {
    store.remaining(invitation, kind)
}

/// Whether a user on `user_tier_code` may access `target_tier_code` content
#[must_use]
pub fn can_access_plan(user_tier_code: &str, target_tier_code: &str) -> bool {
    plan_access::can_access(user_tier_code, target_tier_code)
}
