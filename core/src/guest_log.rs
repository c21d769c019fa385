//! Append-only log of guest views
//!
//! Feeds the IP-volume rule of the activity heuristic and invitation
//! analytics. Events are never mutated or removed once recorded.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::state::{GuestViewEvent, InvitationId};

/// Storage of guest view events
pub trait GuestEventStore: Send + Sync {
    /// Append one event
    fn record(&self, event: GuestViewEvent);

    /// Number of events from `ip` at or after `since`
    fn count_from_ip_since(&self, ip: &str, since: DateTime<Utc>) -> u32;

    /// Every event recorded for an invitation, oldest first
    fn events_for(&self, invitation: &InvitationId) -> Vec<GuestViewEvent>;
}

/// Guest log kept in process memory, indexed by IP
#[derive(Debug, Default)]
pub struct InMemoryGuestLog {
    by_ip: DashMap<String, Vec<GuestViewEvent>>,
}

impl InMemoryGuestLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of events recorded
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_ip.iter().map(|entry| entry.value().len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GuestEventStore for InMemoryGuestLog {
    fn record(&self, event: GuestViewEvent) {
        self.by_ip.entry(event.ip.clone()).or_default().push(event);
    }

    fn count_from_ip_since(&self, ip: &str, since: DateTime<Utc>) -> u32 {
        self.by_ip.get(ip).map_or(0, |events| {
            let count = events.iter().filter(|e| e.timestamp >= since).count();
            u32::try_from(count).unwrap_or(u32::MAX)
        })
    }

    fn events_for(&self, invitation: &InvitationId) -> Vec<GuestViewEvent> {
        let mut events: Vec<GuestViewEvent> = self
            .by_ip
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|e| &e.invitation == invitation)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        events.sort_by_key(|e| e.timestamp);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn view(invitation: &str, ip: &str, at: DateTime<Utc>) -> GuestViewEvent {
        GuestViewEvent {
            invitation: InvitationId::from(invitation),
            ip: ip.to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            timestamp: at,
        }
    }

    #[test]
    fn test_count_respects_window() {
        let log = InMemoryGuestLog::new();
        let now = Utc::now();

        log.record(view("inv-1", "198.51.100.1", now - Duration::minutes(90)));
        log.record(view("inv-1", "198.51.100.1", now - Duration::minutes(30)));
        log.record(view("inv-2", "198.51.100.1", now - Duration::minutes(5)));
        log.record(view("inv-1", "198.51.100.2", now));

        let since = now - Duration::minutes(60);
        assert_eq!(log.count_from_ip_since("198.51.100.1", since), 2);
        assert_eq!(log.count_from_ip_since("198.51.100.2", since), 1);
        assert_eq!(log.count_from_ip_since("192.0.2.1", since), 0);
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn test_events_for_invitation_sorted() {
        let log = InMemoryGuestLog::new();
        let now = Utc::now();

        log.record(view("inv-1", "198.51.100.2", now));
        log.record(view("inv-1", "198.51.100.1", now - Duration::minutes(10)));
        log.record(view("inv-2", "198.51.100.1", now));

        let events = log.events_for(&InvitationId::from("inv-1"));
        assert_eq!(events.len(), 2);
        assert!(events[0].timestamp < events[1].timestamp);
        assert_eq!(events[0].ip, "198.51.100.1");
    }
}
