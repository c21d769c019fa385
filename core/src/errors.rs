//! Error types for the guard core
//!
//! Every failure crosses component boundaries as a value. The three families
//! map onto how a request handler should react:
//!
//! - [`ValidationError`]: malformed fingerprint, the client should re-collect signals
//! - [`QuotaError::QuotaExceeded`]: business limit, shown to the guest as "link limit reached"
//! - [`QuotaError::AlreadyGranted`] and [`OrderError`]: ordering mistakes in the approval
//!   workflow, surfaced as internal errors
//!
//! None of them are transient, so nothing in this crate retries.
//!
//! # Example
//!
//! ```rust
//! use invitely_core::{validate_fingerprint, ValidationError};
//!
//! match validate_fingerprint("not-a-fingerprint") {
//!     Ok(()) => println!("accepted"),
//!     Err(ValidationError::TooShort { len, .. }) => println!("only {len} characters"),
//!     Err(other) => println!("rejected: {other}"),
//! }
//! ```

use thiserror::Error;

use crate::state::{InvitationId, LinkKind, OrderStatus};

/// Result type for guard operations
pub type Result<T> = std::result::Result<T, InvitelyError>;

/// Fingerprint rejected before it is trusted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Fingerprint is empty")]
    EmptyFingerprint,

    #[error("Fingerprint too short: {len} characters, minimum is {min}")]
    TooShort { len: usize, min: usize },

    #[error("Fingerprint too long: {len} characters, maximum is {max}")]
    TooLong { len: usize, max: usize },

    /// The string is not a base-16 number
    #[error("Fingerprint is not hexadecimal: unexpected character {found:?} at position {position}")]
    InvalidFormat { found: char, position: usize },
}

/// Link-quota accounting failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuotaError {
    /// The invitation has used every granted link of this kind
    #[error("Link limit reached for invitation {invitation}: {used}/{granted} {kind} links used")]
    QuotaExceeded {
        invitation: InvitationId,
        kind: LinkKind,
        used: u32,
        granted: u32,
    },

    /// A grant already exists; only the admin re-grant path may change it
    #[error("Quota already granted for invitation {0}. Use the admin re-grant path to change it.")]
    AlreadyGranted(InvitationId),

    /// No grant exists yet, the order behind this invitation was never approved
    #[error("No quota granted for invitation {0}. Ensure the owning order has been approved.")]
    NotGranted(InvitationId),

    /// A re-grant would put the ceiling below links that were already handed out
    #[error("Cannot lower {kind} links for invitation {invitation} to {requested}: {used} already used")]
    GrantBelowUsage {
        invitation: InvitationId,
        kind: LinkKind,
        requested: u32,
        used: u32,
    },
}

/// Order approval workflow failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Order {order} cannot be approved from status {status}")]
    InvalidOrderState { order: String, status: OrderStatus },

    #[error("Order {order} was placed for plan {expected}, not {found}")]
    PlanMismatch {
        order: String,
        expected: String,
        found: String,
    },
}

/// Umbrella error returned by the admission gate and other composite flows
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvitelyError {
    #[error("Invalid fingerprint: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error(transparent)]
    Order(#[from] OrderError),
}

impl InvitelyError {
    /// Whether the client can fix the problem by resubmitting signals
    #[must_use]
    pub const fn is_client_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether this is a plan limit the guest should see, rather than a fault
    #[must_use]
    pub const fn is_business_limit(&self) -> bool {
        matches!(self, Self::Quota(QuotaError::QuotaExceeded { .. }))
    }
}
