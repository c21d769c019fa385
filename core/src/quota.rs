//! Link-quota accounting
//!
//! Each invitation carries two allowances (regular and test links) copied from
//! its plan when the owning order is approved. Guest views consume them one at
//! a time. The invariant `0 <= used <= granted` holds for both counters at all
//! times, including under concurrent consumption.
//!
//! [`QuotaStore`] is the persistence seam. A database-backed implementation
//! must make `consume` a single conditional update
//! (`UPDATE ... SET used = used + 1 WHERE used < granted`), because requests
//! for one invitation may be served by different processes.
//! [`InMemoryQuotaStore`] is the in-process equivalent.

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use tracing::{debug, info, warn};

use crate::{
    errors::QuotaError,
    events::{QuotaConsumed, QuotaGranted, QuotaRegranted},
    state::{InvitationId, LinkGrant, LinkKind, LinkQuota},
};

/// Storage of per-invitation link counters
pub trait QuotaStore: Send + Sync {
    /// Record the initial grant for an invitation
    ///
    /// Fails with [`QuotaError::AlreadyGranted`] if a grant already exists.
    fn grant(&self, invitation: &InvitationId, grant: LinkGrant)
        -> Result<QuotaGranted, QuotaError>;

    /// Admin path: replace the ceilings of an existing grant, keeping usage
    fn regrant(
        &self,
        invitation: &InvitationId,
        grant: LinkGrant,
    ) -> Result<QuotaRegranted, QuotaError>;

    /// Count one link of `kind`, atomically, only if one is left
    fn consume(&self, invitation: &InvitationId, kind: LinkKind)
        -> Result<QuotaConsumed, QuotaError>;

    /// Current counters, `None` if the invitation was never granted
    fn snapshot(&self, invitation: &InvitationId) -> Option<LinkQuota>;

    /// Links of `kind` still available; 0 for unknown invitations
    fn remaining(&self, invitation: &InvitationId, kind: LinkKind) -> u32 {
        self.snapshot(invitation)
            .map_or(0, |quota| quota.remaining(kind))
    }
}

#[derive(Debug)]
struct Counters {
    granted_regular: AtomicU32,
    granted_test: AtomicU32,
    used_regular: AtomicU32,
    used_test: AtomicU32,
}

impl Counters {
    const fn new(grant: LinkGrant) -> Self {
        Self {
            granted_regular: AtomicU32::new(grant.regular),
            granted_test: AtomicU32::new(grant.test),
            used_regular: AtomicU32::new(0),
            used_test: AtomicU32::new(0),
        }
    }

    /// `(granted, used)` counters for a link kind
    const fn slots(&self, kind: LinkKind) -> (&AtomicU32, &AtomicU32) {
        match kind {
            LinkKind::Regular => (&self.granted_regular, &self.used_regular),
            LinkKind::Test => (&self.granted_test, &self.used_test),
        }
    }

    fn snapshot(&self) -> LinkQuota {
        LinkQuota {
            granted_regular: self.granted_regular.load(Ordering::Acquire),
            granted_test: self.granted_test.load(Ordering::Acquire),
            used_regular: self.used_regular.load(Ordering::Acquire),
            used_test: self.used_test.load(Ordering::Acquire),
        }
    }
}

/// Quota store kept in process memory
///
/// Consumers hold a shard read guard and bump the used counter with a
/// compare-and-swap loop, so any number of them proceed in parallel. Ceilings
/// only change under the shard write guard taken by [`QuotaStore::regrant`],
/// so a consumer never compares against a ceiling that is being replaced.
#[derive(Debug, Default)]
pub struct InMemoryQuotaStore {
    quotas: DashMap<InvitationId, Counters>,
}

impl InMemoryQuotaStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of invitations with a grant
    #[must_use]
    pub fn len(&self) -> usize {
        self.quotas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotas.is_empty()
    }
}

impl QuotaStore for InMemoryQuotaStore {
    fn grant(
        &self,
        invitation: &InvitationId,
        grant: LinkGrant,
    ) -> Result<QuotaGranted, QuotaError> {
        match self.quotas.entry(invitation.clone()) {
            Entry::Occupied(_) => {
                warn!(%invitation, "rejected second quota grant");
                Err(QuotaError::AlreadyGranted(invitation.clone()))
            }
            Entry::Vacant(slot) => {
                slot.insert(Counters::new(grant));
                info!(
                    %invitation,
                    regular = grant.regular,
                    test = grant.test,
                    "quota granted"
                );
                Ok(QuotaGranted {
                    invitation: invitation.clone(),
                    grant,
                    timestamp: Utc::now(),
                })
            }
        }
    }

    fn regrant(
        &self,
        invitation: &InvitationId,
        grant: LinkGrant,
    ) -> Result<QuotaRegranted, QuotaError> {
        let Some(mut counters) = self.quotas.get_mut(invitation) else {
            return Err(QuotaError::NotGranted(invitation.clone()));
        };

        let current = counters.snapshot();
        for kind in [LinkKind::Regular, LinkKind::Test] {
            let used = current.used(kind);
            if grant.of(kind) < used {
                return Err(QuotaError::GrantBelowUsage {
                    invitation: invitation.clone(),
                    kind,
                    requested: grant.of(kind),
                    used,
                });
            }
        }

        *counters.granted_regular.get_mut() = grant.regular;
        *counters.granted_test.get_mut() = grant.test;

        let previous = LinkGrant::new(current.granted_regular, current.granted_test);
        info!(
            %invitation,
            regular = grant.regular,
            test = grant.test,
            previous_regular = previous.regular,
            previous_test = previous.test,
            "quota re-granted"
        );

        Ok(QuotaRegranted {
            invitation: invitation.clone(),
            previous,
            grant,
            timestamp: Utc::now(),
        })
    }

    fn consume(
        &self,
        invitation: &InvitationId,
        kind: LinkKind,
    ) -> Result<QuotaConsumed, QuotaError> {
        let Some(counters) = self.quotas.get(invitation) else {
            return Err(QuotaError::NotGranted(invitation.clone()));
        };

        let (granted, used) = counters.slots(kind);
        let ceiling = granted.load(Ordering::Acquire);

        match used.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
            if current < ceiling {
                current.checked_add(1)
            } else {
                None
            }
        }) {
            Ok(previous) => {
                let used = previous.saturating_add(1);
                debug!(%invitation, %kind, used, granted = ceiling, "link consumed");
                Ok(QuotaConsumed {
                    invitation: invitation.clone(),
                    kind,
                    used,
                    granted: ceiling,
                    timestamp: Utc::now(),
                })
            }
            Err(current) => {
                warn!(%invitation, %kind, used = current, granted = ceiling, "link limit reached");
                Err(QuotaError::QuotaExceeded {
                    invitation: invitation.clone(),
                    kind,
                    used: current,
                    granted: ceiling,
                })
            }
        }
    }

    fn snapshot(&self, invitation: &InvitationId) -> Option<LinkQuota> {
        self.quotas.get(invitation).map(|counters| counters.snapshot())
    }
}
