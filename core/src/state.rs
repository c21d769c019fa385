use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of an invitation page, the unit quotas are tracked against
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvitationId(String);

impl InvitationId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InvitationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for InvitationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for InvitationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a purchase order
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which allowance a guest view or link counts against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Links sent to real guests
    Regular,
    /// Preview links the host uses to check the page before sending it out
    Test,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => f.write_str("regular"),
            Self::Test => f.write_str("test"),
        }
    }
}

/// Subscription tier, ordered from most to least restrictive
///
/// The derived `Ord` follows declaration order, which matches the numeric
/// rank, so `Basic < Premium < Luxury`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum PlanTier {
    Basic = 1,
    Premium = 2,
    Luxury = 3,
}

impl PlanTier {
    /// All tiers in ascending order
    pub const ALL: [Self; 3] = [Self::Basic, Self::Premium, Self::Luxury];

    /// Numeric rank of the tier (1-3)
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Basic => 1,
            Self::Premium => 2,
            Self::Luxury => 3,
        }
    }

    /// Canonical plan code
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Premium => "PREMIUM",
            Self::Luxury => "LUXURY",
        }
    }

    /// Resolve a plan code, treating anything unrecognised as `Basic`
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        Self::parse_code(code).unwrap_or(Self::Basic)
    }

    /// Resolve a plan code, `None` when it is not one of the known tiers
    #[must_use]
    pub fn parse_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|tier| tier.code().eq_ignore_ascii_case(code))
    }

    /// Whether a holder of this tier may use something gated at `target`
    #[must_use]
    pub fn grants(self, target: Self) -> bool {
        target <= self
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Number of regular and test links handed to an invitation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkGrant {
    pub regular: u32,
    pub test: u32,
}

impl LinkGrant {
    #[must_use]
    pub const fn new(regular: u32, test: u32) -> Self {
        Self { regular, test }
    }

    #[must_use]
    pub const fn of(self, kind: LinkKind) -> u32 {
        match kind {
            LinkKind::Regular => self.regular,
            LinkKind::Test => self.test,
        }
    }
}

/// Subscription plan a host purchases for an invitation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan code, also the tier code (e.g. `PREMIUM`)
    pub code: String,
    /// Display name
    pub name: String,
    /// Template/feature access level
    pub tier: PlanTier,
    /// Guest links included with the plan
    pub regular_links: u32,
    /// Preview links included with the plan
    pub test_links: u32,
}

impl Plan {
    #[must_use]
    pub fn new(tier: PlanTier, name: &str, regular_links: u32, test_links: u32) -> Self {
        Self {
            code: tier.code().to_string(),
            name: name.to_string(),
            tier,
            regular_links,
            test_links,
        }
    }

    /// Links copied into the invitation when an order for this plan is approved
    #[must_use]
    pub const fn link_grant(&self) -> LinkGrant {
        LinkGrant::new(self.regular_links, self.test_links)
    }
}

/// Lifecycle of an order; only pending orders can be approved or rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Approved => f.write_str("approved"),
            Self::Rejected => f.write_str("rejected"),
        }
    }
}

/// Purchase of a plan for one invitation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Invitation the purchased links are granted to
    pub invitation: InvitationId,
    /// Code of the plan the host paid for
    pub plan_code: String,
    pub status: OrderStatus,
}

impl Order {
    #[must_use]
    pub fn new(id: &str, invitation: &str, plan_code: &str) -> Self {
        Self {
            id: OrderId::from(id),
            invitation: InvitationId::from(invitation),
            plan_code: plan_code.to_string(),
            status: OrderStatus::Pending,
        }
    }
}

/// Point-in-time copy of an invitation's link counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkQuota {
    pub granted_regular: u32,
    pub granted_test: u32,
    pub used_regular: u32,
    pub used_test: u32,
}

impl LinkQuota {
    #[must_use]
    pub const fn granted(&self, kind: LinkKind) -> u32 {
        match kind {
            LinkKind::Regular => self.granted_regular,
            LinkKind::Test => self.granted_test,
        }
    }

    #[must_use]
    pub const fn used(&self, kind: LinkKind) -> u32 {
        match kind {
            LinkKind::Regular => self.used_regular,
            LinkKind::Test => self.used_test,
        }
    }

    /// Links of `kind` still available; never negative
    #[must_use]
    pub const fn remaining(&self, kind: LinkKind) -> u32 {
        self.granted(kind).saturating_sub(self.used(kind))
    }
}

/// One guest page view, kept append-only for analytics and fraud windows
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestViewEvent {
    pub invitation: InvitationId,
    pub ip: String,
    pub user_agent: String,
    pub timestamp: DateTime<Utc>,
}
