// ── Monitor ──
//
// The polling loop: fetch snapshots, diff them against the baseline,
// persist and broadcast the resulting events, then roll the baseline
// forward. Networks that failed this cycle are excluded from the diff and
// keep their previous snapshot as next cycle's baseline.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::detect::EventDetector;
use crate::model::{Event, NetworkId, NetworkSnapshot};
use crate::provider::{NetworkFailure, SnapshotSource};
use crate::store::EventStore;
use crate::summary::EventSummary;

const EVENT_CHANNEL_SIZE: usize = 256;
const PURGE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// What one poll cycle did.
#[derive(Debug, Clone, Serialize)]
pub struct PollOutcome {
    pub polled_at: DateTime<Utc>,
    /// No baseline existed, so nothing was compared.
    pub first_poll: bool,
    pub events: Vec<Event>,
    pub summary: EventSummary,
    pub snapshots: Vec<NetworkSnapshot>,
    pub failures: Vec<NetworkFailure>,
    /// Events written to the store (0 when persistence failed).
    pub persisted: usize,
}

// ── Monitor ──────────────────────────────────────────────────────────

/// Snapshot poller and event dispatcher.
///
/// Cheaply cloneable via `Arc<MonitorInner>`.
pub struct Monitor<S> {
    inner: Arc<MonitorInner<S>>,
}

impl<S> Clone for Monitor<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct MonitorInner<S> {
    config: MonitorConfig,
    source: S,
    store: Arc<dyn EventStore>,
    detector: EventDetector,
    baseline: Mutex<Option<Vec<NetworkSnapshot>>>,
    event_tx: broadcast::Sender<Arc<Event>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl<S: SnapshotSource + 'static> Monitor<S> {
    /// Create a monitor. Does NOT start polling: call
    /// [`poll_once()`](Self::poll_once) or [`start()`](Self::start).
    pub fn new(config: MonitorConfig, source: S, store: Arc<dyn EventStore>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            inner: Arc::new(MonitorInner {
                detector: EventDetector::new(config.thresholds),
                config,
                source,
                store,
                baseline: Mutex::new(None),
                event_tx,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Seed the baseline, e.g. from a snapshot persisted by an earlier run.
    pub async fn set_baseline(&self, snapshots: Vec<NetworkSnapshot>) {
        *self.inner.baseline.lock().await = Some(snapshots);
    }

    /// The snapshots the next poll will compare against.
    pub async fn baseline(&self) -> Option<Vec<NetworkSnapshot>> {
        self.inner.baseline.lock().await.clone()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.inner.store
    }

    /// Subscribe to detected events.
    pub fn events(&self) -> broadcast::Receiver<Arc<Event>> {
        self.inner.event_tx.subscribe()
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Run one fetch → detect → persist → broadcast cycle.
    pub async fn poll_once(&self) -> PollOutcome {
        let report = self.inner.source.fetch_snapshots().await;
        let now = Utc::now();

        let mut baseline = self.inner.baseline.lock().await;
        let failed: HashSet<&NetworkId> = report.failed_ids();

        let comparable: Option<Vec<NetworkSnapshot>> = baseline.as_ref().map(|prev| {
            prev.iter()
                .filter(|s| !failed.contains(&s.id))
                .cloned()
                .collect()
        });
        let first_poll = comparable.is_none();

        let events = self.inner.detector.detect(
            comparable.as_deref(),
            Some(&report.snapshots),
            self.inner.store.as_ref(),
            now,
        );

        // Roll forward; failed networks keep their last good snapshot.
        let mut next = report.snapshots.clone();
        if let Some(prev) = baseline.as_ref() {
            next.extend(prev.iter().filter(|s| failed.contains(&s.id)).cloned());
        }
        if !(next.is_empty() && baseline.is_none()) {
            *baseline = Some(next);
        }
        drop(baseline);

        let persisted = self.persist(&events).await;
        for event in &events {
            // No receivers is fine.
            let _ = self.inner.event_tx.send(Arc::new(event.clone()));
        }

        let summary = EventSummary::from_events(&events);
        info!(
            networks = report.snapshots.len(),
            failed = report.failures.len(),
            events = summary.total_events,
            "poll cycle complete"
        );

        PollOutcome {
            polled_at: now,
            first_poll,
            summary,
            events,
            snapshots: report.snapshots,
            failures: report.failures,
            persisted,
        }
    }

    /// Store errors are logged, never propagated.
    async fn persist(&self, events: &[Event]) -> usize {
        if events.is_empty() {
            return 0;
        }
        let store = Arc::clone(&self.inner.store);
        let batch = events.to_vec();
        match tokio::task::spawn_blocking(move || store.append_all(&batch)).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                warn!(error = %e, "failed to persist events");
                0
            }
            Err(e) => {
                warn!(error = %e, "event persistence task failed");
                0
            }
        }
    }

    /// Drop events past their TTL. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let store = Arc::clone(&self.inner.store);
        match tokio::task::spawn_blocking(move || store.purge_expired(Utc::now())).await {
            Ok(Ok(n)) => {
                debug!(removed = n, "expired events purged");
                n
            }
            Ok(Err(e)) => {
                warn!(error = %e, "event purge failed");
                0
            }
            Err(e) => {
                warn!(error = %e, "event purge task failed");
                0
            }
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the periodic poll loop and the daily retention purge.
    ///
    /// The first poll runs immediately.
    pub async fn start(&self) {
        let mut handles = self.inner.task_handles.lock().await;
        handles.push(tokio::spawn(poll_task(
            self.clone(),
            self.inner.config.poll_interval,
            self.inner.cancel.clone(),
        )));
        handles.push(tokio::spawn(purge_task(
            self.clone(),
            self.inner.cancel.clone(),
        )));
        info!(
            interval_secs = self.inner.config.poll_interval.as_secs(),
            networks = self.inner.config.networks.len(),
            "monitor started"
        );
    }

    /// Cancel background tasks and wait for them to finish.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("monitor stopped");
    }
}

// ── Background tasks ─────────────────────────────────────────────────

async fn poll_task<S: SnapshotSource + 'static>(
    monitor: Monitor<S>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                monitor.poll_once().await;
            }
        }
    }
}

async fn purge_task<S: SnapshotSource + 'static>(monitor: Monitor<S>, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(PURGE_INTERVAL);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                monitor.purge_expired().await;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use url::Url;

    use super::*;
    use crate::config::NetworkTarget;
    use crate::model::{Device, DeviceCategory, EventKind, MacAddress, Medium};
    use crate::provider::{FetchReport, StaticSnapshotSource};
    use crate::store::{EventQuery, MemoryEventStore};

    fn config() -> MonitorConfig {
        let mut config = MonitorConfig::new(
            Url::parse("https://example.com/2.2").unwrap(),
            vec![NetworkTarget::new("n1", "Home"), NetworkTarget::new("n2", "Cabin")],
        );
        config.poll_interval = Duration::from_millis(10);
        config
    }

    fn snapshot(id: &str, macs: &[&str]) -> NetworkSnapshot {
        let devices = macs
            .iter()
            .map(|mac| Device {
                mac: MacAddress::new(mac),
                nickname: None,
                hostname: Some(format!("host-{mac}")),
                manufacturer: None,
                ip: None,
                connected: true,
                medium: Medium::Wired,
                ap_url: None,
                category: DeviceCategory::Other,
                band: None,
                signal_dbm: None,
            })
            .collect();
        NetworkSnapshot::new(NetworkId::from(id), id.to_uppercase(), devices, Vec::new())
    }

    fn failure(id: &str) -> NetworkFailure {
        NetworkFailure {
            network_id: NetworkId::from(id),
            network_name: id.to_uppercase(),
            error: "timed out".into(),
            transient: true,
        }
    }

    fn monitor(
        source: Arc<StaticSnapshotSource>,
    ) -> (Monitor<Arc<StaticSnapshotSource>>, Arc<MemoryEventStore>) {
        let store = Arc::new(MemoryEventStore::new());
        let monitor = Monitor::new(config(), source, store.clone());
        (monitor, store)
    }

    #[tokio::test]
    async fn first_poll_sets_baseline_without_events() {
        let source = Arc::new(StaticSnapshotSource::new(vec![snapshot(
            "n1",
            &["aa:00:00:00:00:01"],
        )]));
        let (monitor, store) = monitor(source);

        let outcome = monitor.poll_once().await;
        assert!(outcome.first_poll);
        assert!(outcome.events.is_empty());
        assert_eq!(monitor.baseline().await.unwrap().len(), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn second_poll_detects_persists_and_broadcasts() {
        let source = Arc::new(StaticSnapshotSource::new(vec![snapshot(
            "n1",
            &["aa:00:00:00:00:01"],
        )]));
        let (monitor, store) = monitor(source.clone());
        let mut rx = monitor.events();

        monitor.poll_once().await;
        source.set(FetchReport {
            snapshots: vec![snapshot("n1", &["aa:00:00:00:00:01", "aa:00:00:00:00:02"])],
            failures: Vec::new(),
        });
        let outcome = monitor.poll_once().await;

        assert!(!outcome.first_poll);
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.persisted, 1);
        assert_eq!(outcome.summary.device_connections, 1);
        assert_eq!(outcome.summary.new_devices, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.kind(), EventKind::DeviceConnected);

        let stored = store
            .recent(&EventQuery::within(
                chrono::TimeDelta::hours(1),
                Utc::now() + chrono::TimeDelta::seconds(1),
            ))
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn failed_network_does_not_emit_disconnects() {
        let source = Arc::new(StaticSnapshotSource::new(vec![
            snapshot("n1", &["aa:00:00:00:00:01"]),
            snapshot("n2", &["bb:00:00:00:00:01", "bb:00:00:00:00:02"]),
        ]));
        let (monitor, _store) = monitor(source.clone());
        monitor.poll_once().await;

        // n2 goes dark for a cycle.
        source.set(FetchReport {
            snapshots: vec![snapshot("n1", &["aa:00:00:00:00:01"])],
            failures: vec![failure("n2")],
        });
        let outcome = monitor.poll_once().await;
        assert!(outcome.events.is_empty(), "unexpected: {:?}", outcome.events);
        assert_eq!(outcome.failures.len(), 1);

        // Its last good snapshot is carried forward.
        let baseline = monitor.baseline().await.unwrap();
        let n2 = baseline.iter().find(|s| s.id.as_str() == "n2").unwrap();
        assert_eq!(n2.total_devices, 2);

        // When it comes back, only the real change is reported.
        source.set(FetchReport {
            snapshots: vec![
                snapshot("n1", &["aa:00:00:00:00:01"]),
                snapshot("n2", &["bb:00:00:00:00:01"]),
            ],
            failures: Vec::new(),
        });
        let outcome = monitor.poll_once().await;
        let kinds: Vec<EventKind> = outcome.events.iter().map(Event::kind).collect();
        assert_eq!(kinds, vec![EventKind::DeviceDisconnected]);
    }

    #[tokio::test]
    async fn reconnect_of_known_device_is_not_new() {
        let source = Arc::new(StaticSnapshotSource::new(vec![snapshot(
            "n1",
            &["aa:00:00:00:00:01"],
        )]));
        let (monitor, _store) = monitor(source.clone());
        monitor.poll_once().await;

        source.set(FetchReport {
            snapshots: vec![snapshot("n1", &[])],
            failures: Vec::new(),
        });
        monitor.poll_once().await;

        source.set(FetchReport {
            snapshots: vec![snapshot("n1", &["aa:00:00:00:00:01"])],
            failures: Vec::new(),
        });
        let outcome = monitor.poll_once().await;
        assert_eq!(outcome.events.len(), 1);
        assert!(!outcome.events[0].is_new_device());
    }

    #[tokio::test]
    async fn start_and_stop_run_the_loop() {
        let source = Arc::new(StaticSnapshotSource::new(vec![snapshot(
            "n1",
            &["aa:00:00:00:00:01"],
        )]));
        let (monitor, _store) = monitor(source);

        monitor.start().await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        monitor.stop().await;

        assert!(monitor.baseline().await.is_some());
    }
}
