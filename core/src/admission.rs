//! Guest admission pipeline
//!
//! Runs one guest request through the whole guard:
//!
//! 1. derive (or accept) and validate the device fingerprint
//! 2. count recent views from the IP and assess the request
//! 3. append the view to the guest log
//! 4. recognise returning devices so they do not consume quota twice
//! 5. consume one link of the requested kind, then record the device
//!
//! A device counts as returning only once its record exists, and the record
//! is written after the link was consumed. Two simultaneous first visits from
//! one device may therefore both consume; neither can get past the ceiling.
//!
//! The gate owns no transport. Change events go to an optional
//! [`EventDispatcher`], and the caller maps [`Admission`] or the error onto its
//! HTTP response.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    activity::assess,
    config::ActivityPolicy,
    dispatch::EventDispatcher,
    errors::Result,
    events::{GuardEvent, SuspiciousActivityFlagged},
    fingerprint::{generate, Fingerprint, FingerprintInputs},
    guest_log::GuestEventStore,
    guest_records::{GuestRecord, GuestRecordStore},
    quota::QuotaStore,
    state::{GuestViewEvent, InvitationId, LinkKind},
    validation::{parse_fingerprint, validate_fingerprint},
};

/// Where the request's fingerprint comes from
#[derive(Clone, Debug)]
pub enum FingerprintSource {
    /// Raw signals; the fingerprint is derived server-side
    Signals(FingerprintInputs),
    /// Fingerprint computed by the guest's browser
    Supplied(String),
}

/// One guest view or RSVP registration, with headers already extracted
#[derive(Clone, Debug)]
pub struct GuestRequest {
    pub invitation: InvitationId,
    pub source: FingerprintSource,
    pub ip: String,
    pub user_agent: String,
    pub kind: LinkKind,
}

/// How the gate disposed of a request that passed validation
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Admission {
    /// First visit from this device; one link was consumed
    Admitted {
        fingerprint: Fingerprint,
        remaining: u32,
    },
    /// Device already admitted to this invitation; nothing consumed
    Returning { fingerprint: Fingerprint },
    /// Heuristic flagged the request; nothing consumed
    Flagged {
        fingerprint: Fingerprint,
        reason: String,
    },
}

impl Admission {
    #[must_use]
    pub const fn fingerprint(&self) -> &Fingerprint {
        match self {
            Self::Admitted { fingerprint, .. }
            | Self::Returning { fingerprint }
            | Self::Flagged { fingerprint, .. } => fingerprint,
        }
    }

    /// Whether the guest should be shown the invitation
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        !matches!(self, Self::Flagged { .. })
    }
}

/// Admission gate over a quota store, a guest log and the admitted devices
pub struct GuestGate<Q: QuotaStore, L: GuestEventStore, R: GuestRecordStore> {
    quotas: Arc<Q>,
    log: Arc<L>,
    records: Arc<R>,
    policy: ActivityPolicy,
    dispatcher: Option<EventDispatcher>,
}

impl<Q: QuotaStore, L: GuestEventStore, R: GuestRecordStore> GuestGate<Q, L, R> {
    pub fn new(quotas: Arc<Q>, log: Arc<L>, records: Arc<R>, policy: ActivityPolicy) -> Self {
        Self {
            quotas,
            log,
            records,
            policy,
            dispatcher: None,
        }
    }

    /// Forward change events produced by the gate to `dispatcher`
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: EventDispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn quotas(&self) -> &Q {
        &self.quotas
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub const fn policy(&self) -> &ActivityPolicy {
        &self.policy
    }

    /// Distinct devices admitted to an invitation
    pub fn known_guests(&self, invitation: &InvitationId) -> usize {
        self.records.count_for(invitation)
    }

    /// Admit a request at the current time
    pub fn admit(&self, request: GuestRequest) -> Result<Admission> {
        self.admit_at(request, Utc::now())
    }

    /// Admit a request as if it arrived at `now`
    ///
    /// # Errors
    /// Returns an error if:
    /// - The fingerprint is malformed (`Validation`)
    /// - The invitation has no grant or no links left (`Quota`)
    pub fn admit_at(&self, request: GuestRequest, now: DateTime<Utc>) -> Result<Admission> {
        let GuestRequest {
            invitation,
            source,
            ip,
            user_agent,
            kind,
        } = request;

        let fingerprint = match source {
            FingerprintSource::Signals(inputs) => {
                let fingerprint = generate(&inputs);
                validate_fingerprint(fingerprint.as_str())?;
                fingerprint
            }
            FingerprintSource::Supplied(raw) => parse_fingerprint(&raw)?,
        };

        let since = now
            .checked_sub_signed(self.policy.window())
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let recent = self.log.count_from_ip_since(&ip, since);
        let assessment = assess(
            &self.policy,
            &ip,
            &user_agent,
            recent,
            self.policy.window_minutes,
        );

        self.log.record(GuestViewEvent {
            invitation: invitation.clone(),
            ip: ip.clone(),
            user_agent: user_agent.clone(),
            timestamp: now,
        });

        if assessment.is_suspicious {
            let reason = assessment.reason.unwrap_or_default();
            warn!(%invitation, ip = ip.as_str(), reason = reason.as_str(), "guest request flagged");
            self.notify(SuspiciousActivityFlagged {
                invitation,
                ip,
                user_agent,
                reason: reason.clone(),
                timestamp: now,
            });
            return Ok(Admission::Flagged {
                fingerprint,
                reason,
            });
        }

        if self.records.is_admitted(&invitation, &fingerprint) {
            debug!(%invitation, %fingerprint, "returning guest");
            return Ok(Admission::Returning { fingerprint });
        }

        let consumed = self.quotas.consume(&invitation, kind)?;
        let remaining = consumed.remaining();
        let inserted = self.records.insert_if_absent(GuestRecord {
            invitation: invitation.clone(),
            fingerprint: fingerprint.clone(),
            kind,
            admitted_at: now,
        });
        if !inserted {
            warn!(%invitation, %fingerprint, "device admitted concurrently, link consumed twice");
        }
        self.notify(consumed);

        Ok(Admission::Admitted {
            fingerprint,
            remaining,
        })
    }

    fn notify(&self, event: impl Into<GuardEvent>) {
        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.forward(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{InvitelyError, QuotaError, ValidationError};
    use crate::guest_log::InMemoryGuestLog;
    use crate::guest_records::InMemoryGuestRecords;
    use crate::quota::InMemoryQuotaStore;
    use crate::state::LinkGrant;

    type TestGate = GuestGate<InMemoryQuotaStore, InMemoryGuestLog, InMemoryGuestRecords>;

    fn gate(regular: u32) -> TestGate {
        let quotas = Arc::new(InMemoryQuotaStore::new());
        quotas
            .grant(&InvitationId::from("inv-1"), LinkGrant::new(regular, 1))
            .unwrap();
        GuestGate::new(
            quotas,
            Arc::new(InMemoryGuestLog::new()),
            Arc::new(InMemoryGuestRecords::new()),
            ActivityPolicy::default(),
        )
    }

    fn request(user_agent: &str, ip: &str, screen: &str) -> GuestRequest {
        GuestRequest {
            invitation: InvitationId::from("inv-1"),
            source: FingerprintSource::Signals(FingerprintInputs::new(
                user_agent, screen, "-60", "en-GB",
            )),
            ip: ip.to_string(),
            user_agent: user_agent.to_string(),
            kind: LinkKind::Regular,
        }
    }

    #[test]
    fn test_admit_consumes_once_per_device() {
        let gate = gate(5);

        let first = gate
            .admit(request("Mozilla/5.0", "198.51.100.1", "1920x1080"))
            .unwrap();
        assert!(matches!(first, Admission::Admitted { remaining: 4, .. }));

        let again = gate
            .admit(request("Mozilla/5.0", "198.51.100.1", "1920x1080"))
            .unwrap();
        assert_eq!(
            again,
            Admission::Returning {
                fingerprint: first.fingerprint().clone()
            }
        );
        assert_eq!(
            gate.quotas()
                .remaining(&InvitationId::from("inv-1"), LinkKind::Regular),
            4
        );
        assert_eq!(gate.known_guests(&InvitationId::from("inv-1")), 1);
        // Both views are logged
        assert_eq!(gate.log().len(), 2);
    }

    #[test]
    fn test_bot_is_flagged_without_consuming() {
        let gate = gate(5);

        let outcome = gate
            .admit(request("HeadlessChrome/120.0", "198.51.100.1", "800x600"))
            .unwrap();

        assert!(!outcome.is_allowed());
        assert_eq!(
            gate.quotas()
                .remaining(&InvitationId::from("inv-1"), LinkKind::Regular),
            5
        );
    }

    #[test]
    fn test_ip_volume_flagged_after_threshold() {
        let gate = gate(100);
        let now = Utc::now();

        for i in 0..11 {
            let outcome = gate
                .admit_at(
                    request("Mozilla/5.0", "203.0.113.9", &format!("{i}x{i}")),
                    now,
                )
                .unwrap();
            assert!(outcome.is_allowed(), "request {i} should pass");
        }

        let outcome = gate
            .admit_at(request("Mozilla/5.0", "203.0.113.9", "12x12"), now)
            .unwrap();
        match outcome {
            Admission::Flagged { reason, .. } => assert!(reason.contains("11")),
            other => panic!("expected flag, got {other:?}"),
        }
    }

    #[test]
    fn test_ip_window_expires() {
        let gate = gate(100);
        let earlier = Utc::now() - chrono::Duration::minutes(120);

        for i in 0..20 {
            gate.admit_at(
                request("Mozilla/5.0", "203.0.113.9", &format!("{i}x{i}")),
                earlier,
            )
            .unwrap();
        }

        let outcome = gate
            .admit(request("Mozilla/5.0", "203.0.113.9", "new-device"))
            .unwrap();
        assert!(outcome.is_allowed());
    }

    #[test]
    fn test_quota_exhausted_allows_retry_later() {
        let gate = gate(1);
        gate.admit(request("Mozilla/5.0", "198.51.100.1", "a"))
            .unwrap();

        let err = gate
            .admit(request("Mozilla/5.0", "198.51.100.2", "b"))
            .unwrap_err();
        assert!(err.is_business_limit());

        // Raising the ceiling lets the same device in as a first visit
        gate.quotas()
            .regrant(&InvitationId::from("inv-1"), LinkGrant::new(2, 1))
            .unwrap();
        let outcome = gate
            .admit(request("Mozilla/5.0", "198.51.100.2", "b"))
            .unwrap();
        assert!(matches!(outcome, Admission::Admitted { remaining: 0, .. }));
    }

    #[test]
    fn test_supplied_fingerprint_validated() {
        let gate = gate(5);
        let mut bad = request("Mozilla/5.0", "198.51.100.1", "a");
        bad.source = FingerprintSource::Supplied("xyz".to_string());

        let err = gate.admit(bad).unwrap_err();
        assert!(matches!(
            err,
            InvitelyError::Validation(ValidationError::TooShort { .. })
        ));
        // Rejected before anything was logged
        assert!(gate.log().is_empty());

        let mut good = request("Mozilla/5.0", "198.51.100.1", "a");
        good.source = FingerprintSource::Supplied("ABCDEF0123456789".repeat(2));
        let outcome = gate.admit(good).unwrap();
        assert_eq!(
            outcome.fingerprint().as_str(),
            "abcdef0123456789".repeat(2)
        );
    }

    #[test]
    fn test_ungranted_invitation() {
        let gate = gate(5);
        let mut req = request("Mozilla/5.0", "198.51.100.1", "a");
        req.invitation = InvitationId::from("inv-unknown");

        assert!(matches!(
            gate.admit(req).unwrap_err(),
            InvitelyError::Quota(QuotaError::NotGranted(_))
        ));
    }

    #[test]
    fn test_failed_first_visit_leaves_no_record() {
        let gate = gate(0);

        let err = gate
            .admit(request("Mozilla/5.0", "198.51.100.1", "a"))
            .unwrap_err();
        assert!(err.is_business_limit());
        assert_eq!(gate.known_guests(&InvitationId::from("inv-1")), 0);

        // The same device is refused again, never waved through as returning
        assert!(gate
            .admit(request("Mozilla/5.0", "198.51.100.2", "a"))
            .is_err());
    }

    #[test]
    fn test_record_written_after_consume() {
        let gate = gate(3);
        let outcome = gate
            .admit(request("Mozilla/5.0", "198.51.100.1", "a"))
            .unwrap();

        let record = gate
            .records()
            .get(&InvitationId::from("inv-1"), outcome.fingerprint())
            .unwrap();
        assert_eq!(record.kind, LinkKind::Regular);
    }

    #[tokio::test]
    async fn test_events_forwarded() {
        let (dispatcher, mut receiver) = EventDispatcher::channel();
        let gate = gate(5).with_dispatcher(dispatcher);

        gate.admit(request("Mozilla/5.0", "198.51.100.1", "a"))
            .unwrap();
        gate.admit(request("python-scraper/1.0", "198.51.100.3", "b"))
            .unwrap();

        assert_eq!(receiver.recv().await.unwrap().name(), "quota_consumed");
        assert_eq!(
            receiver.recv().await.unwrap().name(),
            "suspicious_activity_flagged"
        );
    }
}
