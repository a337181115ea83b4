// ── Event persistence ──
//
// `EventStore` is the seam between the monitor and wherever events live.
// Two implementations ship: a DashMap-backed in-memory store and a SQLite
// store that several processes can share. Every store doubles as the
// device history the detector consults for `is_new_device`.

mod memory;
mod sqlite;

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{DEFAULT_RECENT_LIMIT, DEFAULT_RETENTION};
use crate::error::CoreError;
use crate::model::{Event, EventKind, MacAddress, NetworkId};

pub use memory::MemoryEventStore;
pub use sqlite::SqliteEventStore;

// ── DeviceHistory ───────────────────────────────────────────────────

/// "Has this MAC ever been recorded?"
pub trait DeviceHistory {
    fn has_been_seen(&self, mac: &MacAddress) -> Result<bool, CoreError>;
}

/// History with no memory: every device is new.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl DeviceHistory for NoHistory {
    fn has_been_seen(&self, _mac: &MacAddress) -> Result<bool, CoreError> {
        Ok(false)
    }
}

impl DeviceHistory for HashSet<MacAddress> {
    fn has_been_seen(&self, mac: &MacAddress) -> Result<bool, CoreError> {
        Ok(self.contains(mac))
    }
}

// ── StoredEvent ─────────────────────────────────────────────────────

/// An event as persisted, with its store id and expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// `"{kind}_{unix_millis}_{9 random alphanumerics}"`.
    pub id: String,
    pub event: Event,
    pub stored_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StoredEvent {
    pub fn new(event: Event, stored_at: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            id: event_id(event.kind(), stored_at),
            expires_at: stored_at + ttl,
            stored_at,
            event,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

fn event_id(kind: EventKind, at: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("{kind}_{}_{suffix}", at.timestamp_millis())
}

// ── EventQuery ──────────────────────────────────────────────────────

/// Bounded recent-window query.
#[derive(Debug, Clone)]
pub struct EventQuery {
    /// Only events with a timestamp after this instant.
    pub since: DateTime<Utc>,
    /// Reference time for expiry.
    pub now: DateTime<Utc>,
    pub limit: usize,
    pub kind: Option<EventKind>,
    pub network: Option<NetworkId>,
}

impl EventQuery {
    /// Events from the last `window`, newest first, at most 50.
    pub fn within(window: TimeDelta, now: DateTime<Utc>) -> Self {
        Self {
            since: now - window,
            now,
            limit: DEFAULT_RECENT_LIMIT,
            kind: None,
            network: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn kind(mut self, kind: EventKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn network(mut self, network: NetworkId) -> Self {
        self.network = Some(network);
        self
    }

    pub(crate) fn matches(&self, stored: &StoredEvent) -> bool {
        stored.event.timestamp() > self.since
            && !stored.is_expired(self.now)
            && self.kind.is_none_or(|k| stored.event.kind() == k)
            && self
                .network
                .as_ref()
                .is_none_or(|n| stored.event.network_id() == n)
    }
}

// ── EventStore ──────────────────────────────────────────────────────

/// Append-only event log with a recent-window query and TTL purge.
pub trait EventStore: DeviceHistory + Send + Sync {
    /// Default lifetime of new entries.
    fn ttl(&self) -> TimeDelta {
        DEFAULT_RETENTION
    }

    fn append(&self, event: Event) -> Result<StoredEvent, CoreError>;

    /// Append a batch; returns how many were stored.
    fn append_all(&self, events: &[Event]) -> Result<usize, CoreError> {
        for event in events {
            self.append(event.clone())?;
        }
        Ok(events.len())
    }

    /// Matching events, newest first, at most `query.limit`.
    fn recent(&self, query: &EventQuery) -> Result<Vec<StoredEvent>, CoreError>;

    /// Drop events whose timestamp is older than `cutoff`.
    fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, CoreError>;

    /// Drop events whose TTL has run out.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, CoreError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
