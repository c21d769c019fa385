//! Admitted guest devices per invitation
//!
//! A record exists only once a device's first visit has consumed a link, so
//! "already recorded" always means "already paid for". Records are keyed by
//! `(invitation, fingerprint)` and never removed.

use std::collections::{hash_map, HashMap};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::{
    fingerprint::Fingerprint,
    state::{InvitationId, LinkKind},
};

/// One admitted device
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestRecord {
    pub invitation: InvitationId,
    pub fingerprint: Fingerprint,
    /// Which allowance paid for the first visit
    pub kind: LinkKind,
    pub admitted_at: DateTime<Utc>,
}

/// Storage of admitted devices
///
/// A database-backed implementation maps `insert_if_absent` onto an insert
/// guarded by a unique `(invitation, fingerprint)` key.
pub trait GuestRecordStore: Send + Sync {
    /// Whether the device was already admitted to the invitation
    fn is_admitted(&self, invitation: &InvitationId, fingerprint: &Fingerprint) -> bool;

    /// Store a record unless one exists for the same device
    ///
    /// Returns `false` when a record was already present; it is left untouched.
    fn insert_if_absent(&self, record: GuestRecord) -> bool;

    /// Number of devices admitted to an invitation
    fn count_for(&self, invitation: &InvitationId) -> usize;
}

/// Guest records kept in process memory, grouped by invitation
#[derive(Debug, Default)]
pub struct InMemoryGuestRecords {
    by_invitation: DashMap<InvitationId, HashMap<Fingerprint, GuestRecord>>,
}

impl InMemoryGuestRecords {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record of one device, if admitted
    #[must_use]
    pub fn get(&self, invitation: &InvitationId, fingerprint: &Fingerprint) -> Option<GuestRecord> {
        self.by_invitation
            .get(invitation)
            .and_then(|records| records.get(fingerprint).cloned())
    }
}

impl GuestRecordStore for InMemoryGuestRecords {
    fn is_admitted(&self, invitation: &InvitationId, fingerprint: &Fingerprint) -> bool {
        self.by_invitation
            .get(invitation)
            .is_some_and(|records| records.contains_key(fingerprint))
    }

    fn insert_if_absent(&self, record: GuestRecord) -> bool {
        let mut records = self
            .by_invitation
            .entry(record.invitation.clone())
            .or_default();
        match records.entry(record.fingerprint.clone()) {
            hash_map::Entry::Occupied(_) => false,
            hash_map::Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    fn count_for(&self, invitation: &InvitationId) -> usize {
        self.by_invitation
            .get(invitation)
            .map_or(0, |records| records.len())
    }
}
