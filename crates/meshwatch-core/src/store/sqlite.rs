// SQLite event store
//
// Every operation goes straight to the database, so several processes
// (a long-running `watch` next to one-shot `poll` or `events purge`) can
// share one log. WAL mode plus a busy timeout serializes their writers.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, TimeDelta, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, warn};

use super::{DeviceHistory, EventQuery, EventStore, StoredEvent};
use crate::config::DEFAULT_RETENTION;
use crate::error::CoreError;
use crate::model::{Event, EventKind, MacAddress, NetworkId};

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS events (
        seq          INTEGER PRIMARY KEY AUTOINCREMENT,
        id           TEXT    NOT NULL UNIQUE,
        kind         TEXT    NOT NULL,
        network_id   TEXT    NOT NULL,
        device_mac   TEXT,
        timestamp_ns INTEGER NOT NULL,
        expires_ns   INTEGER NOT NULL,
        payload      TEXT    NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events (timestamp_ns);
    CREATE INDEX IF NOT EXISTS idx_events_device_mac ON events (device_mac);
";

/// Event store backed by a SQLite database file.
///
/// Rows carry the filter columns; the full [`StoredEvent`] is kept as JSON
/// in `payload` so it reads back exactly as written.
pub struct SqliteEventStore {
    conn: Mutex<Connection>,
    path: PathBuf,
    ttl: TimeDelta,
}

impl SqliteEventStore {
    /// Open (or create) the database at `path` with the default TTL.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        Self::open_with_ttl(path, DEFAULT_RETENTION)
    }

    pub fn open_with_ttl(path: impl Into<PathBuf>, ttl: TimeDelta) -> Result<Self, CoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        configure(&conn);
        conn.execute_batch(SCHEMA)?;
        debug!(path = %path.display(), "opened event database");

        Ok(Self {
            conn: Mutex::new(conn),
            path,
            ttl,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("event database mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

/// WAL for concurrent readers, and a busy timeout so a second writer
/// waits instead of failing with `SQLITE_BUSY`.
fn configure(conn: &Connection) {
    // journal_mode returns a row; failures here only cost concurrency
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    let _ = conn.pragma_update(None, "busy_timeout", 5000);
}

/// Nanoseconds since the epoch, saturating outside chrono's i64 range.
fn nanos(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_nanos_opt()
        .unwrap_or(if ts.timestamp() < 0 { i64::MIN } else { i64::MAX })
}

fn insert(conn: &Connection, stored: &StoredEvent) -> Result<(), CoreError> {
    let payload = serde_json::to_string(stored)?;
    conn.execute(
        "INSERT INTO events (id, kind, network_id, device_mac, timestamp_ns, expires_ns, payload)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            stored.id,
            stored.event.kind().as_str(),
            stored.event.network_id().as_str(),
            stored.event.device_mac().map(MacAddress::as_str),
            nanos(stored.event.timestamp()),
            nanos(stored.expires_at),
            payload,
        ],
    )?;
    Ok(())
}

impl DeviceHistory for SqliteEventStore {
    fn has_been_seen(&self, mac: &MacAddress) -> Result<bool, CoreError> {
        let seen = self
            .conn()
            .query_row(
                "SELECT 1 FROM events WHERE device_mac = ?1 LIMIT 1",
                params![mac.as_str()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(seen.is_some())
    }
}

impl EventStore for SqliteEventStore {
    fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    fn append(&self, event: Event) -> Result<StoredEvent, CoreError> {
        let stored = StoredEvent::new(event, Utc::now(), self.ttl);
        insert(&self.conn(), &stored)?;
        Ok(stored)
    }

    fn append_all(&self, events: &[Event]) -> Result<usize, CoreError> {
        if events.is_empty() {
            return Ok(0);
        }
        let now = Utc::now();
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        for event in events {
            insert(&tx, &StoredEvent::new(event.clone(), now, self.ttl))?;
        }
        tx.commit()?;
        Ok(events.len())
    }

    fn recent(&self, query: &EventQuery) -> Result<Vec<StoredEvent>, CoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare_cached(
            "SELECT payload FROM events
             WHERE timestamp_ns > ?1
               AND expires_ns > ?2
               AND (?3 IS NULL OR kind = ?3)
               AND (?4 IS NULL OR network_id = ?4)
             ORDER BY timestamp_ns DESC, seq DESC
             LIMIT ?5",
        )?;
        let rows = stmt.query_map(
            params![
                nanos(query.since),
                nanos(query.now),
                query.kind.map(EventKind::as_str),
                query.network.as_ref().map(NetworkId::as_str),
                i64::try_from(query.limit).unwrap_or(i64::MAX),
            ],
            |row| row.get::<_, String>(0),
        )?;

        let mut hits = Vec::new();
        for payload in rows {
            hits.push(serde_json::from_str(&payload?)?);
        }
        Ok(hits)
    }

    fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, CoreError> {
        Ok(self.conn().execute(
            "DELETE FROM events WHERE timestamp_ns < ?1",
            params![nanos(cutoff)],
        )?)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, CoreError> {
        Ok(self.conn().execute(
            "DELETE FROM events WHERE expires_ns <= ?1",
            params![nanos(now)],
        )?)
    }

    fn len(&self) -> usize {
        let count = self
            .conn()
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get::<_, i64>(0));
        match count {
            Ok(n) => usize::try_from(n).unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "counting stored events failed");
                0
            }
        }
    }
}
