//! Change events produced by guard mutations
//!
//! Mutations return these values instead of firing hidden post-save hooks.
//! The caller decides whether to forward them to an [`crate::EventDispatcher`]
//! (admin dashboard broadcast, audit log, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{InvitationId, LinkGrant, LinkKind, OrderId};

/// Event emitted when an invitation receives its first link grant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaGranted {
    /// Invitation receiving the links
    pub invitation: InvitationId,
    /// Links granted
    pub grant: LinkGrant,
    /// When the grant was recorded
    pub timestamp: DateTime<Utc>,
}

/// Event emitted when an admin changes an existing grant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRegranted {
    pub invitation: InvitationId,
    /// Grant before the change
    pub previous: LinkGrant,
    /// Grant after the change
    pub grant: LinkGrant,
    pub timestamp: DateTime<Utc>,
}

/// Event emitted for every link successfully counted against a quota
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaConsumed {
    pub invitation: InvitationId,
    pub kind: LinkKind,
    /// Used count after this consumption
    pub used: u32,
    pub granted: u32,
    pub timestamp: DateTime<Utc>,
}

impl QuotaConsumed {
    /// Links of this kind left after the consumption
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.granted.saturating_sub(self.used)
    }
}

/// Event emitted when an order is approved and its plan's links granted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderApproved {
    pub order: OrderId,
    pub invitation: InvitationId,
    pub plan_code: String,
    pub grant: LinkGrant,
    /// Whether an admin override replaced the plan's allowance
    pub overridden: bool,
    pub timestamp: DateTime<Utc>,
}

/// Event emitted when guest traffic is flagged by the activity heuristic
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousActivityFlagged {
    pub invitation: InvitationId,
    pub ip: String,
    pub user_agent: String,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Any event the guard can emit, tagged for JSON consumers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GuardEvent {
    QuotaGranted(QuotaGranted),
    QuotaRegranted(QuotaRegranted),
    QuotaConsumed(QuotaConsumed),
    OrderApproved(OrderApproved),
    SuspiciousActivityFlagged(SuspiciousActivityFlagged),
}

impl GuardEvent {
    /// Invitation the event concerns
    #[must_use]
    pub const fn invitation(&self) -> &InvitationId {
        match self {
            Self::QuotaGranted(e) => &e.invitation,
            Self::QuotaRegranted(e) => &e.invitation,
            Self::QuotaConsumed(e) => &e.invitation,
            Self::OrderApproved(e) => &e.invitation,
            Self::SuspiciousActivityFlagged(e) => &e.invitation,
        }
    }

    /// Event type name as used in the JSON tag
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::QuotaGranted(_) => "quota_granted",
            Self::QuotaRegranted(_) => "quota_regranted",
            Self::QuotaConsumed(_) => "quota_consumed",
            Self::OrderApproved(_) => "order_approved",
            Self::SuspiciousActivityFlagged(_) => "suspicious_activity_flagged",
        }
    }
}

impl From<QuotaGranted> for GuardEvent {
    fn from(event: QuotaGranted) -> Self {
        Self::QuotaGranted(event)
    }
}

impl From<QuotaRegranted> for GuardEvent {
    fn from(event: QuotaRegranted) -> Self {
        Self::QuotaRegranted(event)
    }
}

impl From<QuotaConsumed> for GuardEvent {
    fn from(event: QuotaConsumed) -> Self {
        Self::QuotaConsumed(event)
    }
}

impl From<OrderApproved> for GuardEvent {
    fn from(event: OrderApproved) -> Self {
        Self::OrderApproved(event)
    }
}

impl From<SuspiciousActivityFlagged> for GuardEvent {
    fn from(event: SuspiciousActivityFlagged) -> Self {
        Self::SuspiciousActivityFlagged(event)
    }
}
