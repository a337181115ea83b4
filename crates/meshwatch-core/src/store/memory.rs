use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

use super::{DeviceHistory, EventQuery, EventStore, StoredEvent};
use crate::config::DEFAULT_RETENTION;
use crate::error::CoreError;
use crate::model::{Event, MacAddress};

struct Entry {
    seq: u64,
    stored: StoredEvent,
}

/// Process-local event store.
///
/// Entries are keyed by id; an insertion sequence number breaks
/// timestamp ties so batches come back in a stable order.
pub struct MemoryEventStore {
    entries: DashMap<String, Entry>,
    next_seq: AtomicU64,
    ttl: TimeDelta,
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_RETENTION)
    }
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: TimeDelta) -> Self {
        Self {
            entries: DashMap::new(),
            next_seq: AtomicU64::new(0),
            ttl,
        }
    }

    /// Insert an already-stored event (e.g. one loaded from disk).
    pub fn insert(&self, stored: StoredEvent) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(stored.id.clone(), Entry { seq, stored });
    }

    /// Every entry in insertion order.
    pub fn all(&self) -> Vec<StoredEvent> {
        let mut entries: Vec<(u64, StoredEvent)> = self
            .entries
            .iter()
            .map(|e| (e.seq, e.stored.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, stored)| stored).collect()
    }

    fn remove_where(&self, mut doomed: impl FnMut(&StoredEvent) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !doomed(&entry.stored));
        before.saturating_sub(self.entries.len())
    }
}

impl DeviceHistory for MemoryEventStore {
    fn has_been_seen(&self, mac: &MacAddress) -> Result<bool, CoreError> {
        Ok(self
            .entries
            .iter()
            .any(|e| e.stored.event.device_mac() == Some(mac)))
    }
}

impl EventStore for MemoryEventStore {
    fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    fn append(&self, event: Event) -> Result<StoredEvent, CoreError> {
        let stored = StoredEvent::new(event, Utc::now(), self.ttl);
        self.insert(stored.clone());
        Ok(stored)
    }

    fn recent(&self, query: &EventQuery) -> Result<Vec<StoredEvent>, CoreError> {
        let mut hits: Vec<(u64, StoredEvent)> = self
            .entries
            .iter()
            .filter(|e| query.matches(&e.stored))
            .map(|e| (e.seq, e.stored.clone()))
            .collect();
        hits.sort_by(|(a_seq, a), (b_seq, b)| {
            b.event
                .timestamp()
                .cmp(&a.event.timestamp())
                .then(b_seq.cmp(a_seq))
        });
        hits.truncate(query.limit);
        Ok(hits.into_iter().map(|(_, stored)| stored).collect())
    }

    fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, CoreError> {
        Ok(self.remove_where(|s| s.event.timestamp() < cutoff))
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, CoreError> {
        Ok(self.remove_where(|s| s.is_expired(now)))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::NetworkId;
    use crate::store::tests::disconnect;

    #[test]
    fn recent_is_newest_first_and_bounded() {
        let store = MemoryEventStore::new();
        let now = Utc::now();
        for (i, mins) in [30_i64, 10, 20].into_iter().enumerate() {
            store
                .append(disconnect(
                    &format!("aa:00:00:00:00:0{i}"),
                    now - TimeDelta::minutes(mins),
                ))
                .unwrap();
        }

        let hits = store
            .recent(&EventQuery::within(TimeDelta::hours(1), now).limit(2))
            .unwrap();
        let macs: Vec<String> = hits
            .iter()
            .map(|s| s.event.device_mac().unwrap().to_string())
            .collect();
        assert_eq!(macs, vec!["aa:00:00:00:00:01", "aa:00:00:00:00:02"]);
    }

    #[test]
    fn batch_ties_come_back_latest_insert_first() {
        let store = MemoryEventStore::new();
        let at = Utc::now();
        store
            .append_all(&[
                disconnect("aa:00:00:00:00:01", at),
                disconnect("aa:00:00:00:00:02", at),
            ])
            .unwrap();
        let hits = store
            .recent(&EventQuery::within(TimeDelta::hours(1), at + TimeDelta::seconds(1)))
            .unwrap();
        assert_eq!(
            hits[0].event.device_mac().unwrap().as_str(),
            "aa:00:00:00:00:02"
        );
    }

    #[test]
    fn expired_events_are_hidden_then_purged() {
        let store = MemoryEventStore::with_ttl(TimeDelta::minutes(5));
        let now = Utc::now();
        store.append(disconnect("aa:00:00:00:00:01", now)).unwrap();

        let later = now + TimeDelta::minutes(10);
        let query = EventQuery::within(TimeDelta::hours(1), later);
        assert!(store.recent(&query).unwrap().is_empty());
        assert_eq!(store.purge_expired(later).unwrap(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn purge_older_than_uses_event_time() {
        let store = MemoryEventStore::new();
        let now = Utc::now();
        store
            .append(disconnect("aa:00:00:00:00:01", now - TimeDelta::days(40)))
            .unwrap();
        store.append(disconnect("aa:00:00:00:00:02", now)).unwrap();

        assert_eq!(store.purge_older_than(now - TimeDelta::days(30)).unwrap(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn stored_device_events_feed_history() {
        let store = MemoryEventStore::new();
        let mac = MacAddress::new("aa:00:00:00:00:07");
        assert!(!store.has_been_seen(&mac).unwrap());

        store.append(disconnect(mac.as_str(), Utc::now())).unwrap();
        assert!(store.has_been_seen(&mac).unwrap());
        assert!(!store.has_been_seen(&MacAddress::new("aa:00:00:00:00:08")).unwrap());
    }

    #[test]
    fn network_filter_applies() {
        let store = MemoryEventStore::new();
        let now = Utc::now();
        store.append(disconnect("aa:00:00:00:00:01", now)).unwrap();
        let query = EventQuery::within(TimeDelta::hours(1), now + TimeDelta::seconds(1))
            .network(NetworkId::from("elsewhere"));
        assert!(store.recent(&query).unwrap().is_empty());
    }
}
