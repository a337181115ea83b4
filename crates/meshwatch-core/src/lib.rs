//! Monitoring layer between `meshwatch-api` and the CLI.
//!
//! - **[`Monitor`]**: polls every configured network on an interval, diffs
//!   each fetch against the previous one, persists what changed, and
//!   broadcasts events to subscribers. [`Monitor::poll_once`] runs a single
//!   cycle for one-shot CLI use.
//!
//! - **Detection** ([`detect`]): pure functions from two snapshot sets to an
//!   ordered list of [`Event`]s: connects and disconnects, significant
//!   device-count swings, access point load imbalance, and per-AP count
//!   changes.
//!
//! - **[`EventStore`]**: append, recent-window queries and TTL purging, with
//!   in-memory and SQLite implementations.
//!
//! - **[`Assistant`]**: answers voice-style [`Intent`]s from cached snapshots
//!   and the event store, phrased by [`speech`].

pub mod categorize;
pub mod config;
pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod monitor;
pub mod provider;
pub mod query;
pub mod speech;
pub mod store;
pub mod summary;

// ── Primary re-exports ──────────────────────────────────────────────
pub use categorize::categorize_device;
pub use config::{MonitorConfig, NetworkTarget};
pub use detect::{
    DetectionThresholds, EventDetector, detect_events, detect_load_imbalance,
    detect_load_imbalance_with,
};
pub use error::CoreError;
pub use monitor::{Monitor, PollOutcome};
pub use provider::{
    FetchReport, MeshSnapshotSource, NetworkFailure, SnapshotSource, StaticSnapshotSource,
};
pub use query::{Assistant, Intent, Response};
pub use store::{
    DeviceHistory, EventQuery, EventStore, MemoryEventStore, NoHistory, SqliteEventStore,
    StoredEvent,
};
pub use summary::EventSummary;

pub use model::{
    AccessPoint, ApDeviceChange, ApLoadImbalance, Band, BandCounts, Device, DeviceCategory,
    DeviceConnected, DeviceDisconnected, DeviceOs, DeviceTypeCounts, Event, EventKind,
    ImbalanceReport, MacAddress, Medium, NetworkId, NetworkSnapshot, SignalQuality,
    SignificantDeviceChange, UNKNOWN_DEVICE,
};
