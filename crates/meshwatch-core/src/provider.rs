// ── Snapshot providers ──
//
// A `SnapshotSource` produces the current snapshot of every configured
// network. Per-network failures are reported alongside the snapshots that
// did arrive; one network going dark never hides the others.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use meshwatch_api::MeshClient;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::NetworkTarget;
use crate::convert::build_snapshot;
use crate::error::CoreError;
use crate::model::{NetworkId, NetworkSnapshot};

/// A network that produced no data this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkFailure {
    pub network_id: NetworkId,
    pub network_name: String,
    pub error: String,
    /// Timeouts, dropped connections, 429 and 5xx: likely to clear by the
    /// next cycle.
    pub transient: bool,
}

/// Result of one fan-out fetch: what arrived and what didn't.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub snapshots: Vec<NetworkSnapshot>,
    pub failures: Vec<NetworkFailure>,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Nothing arrived and at least one network failed.
    pub fn is_total_failure(&self) -> bool {
        self.snapshots.is_empty() && !self.failures.is_empty()
    }

    pub fn failed_ids(&self) -> HashSet<&NetworkId> {
        self.failures.iter().map(|f| &f.network_id).collect()
    }

    /// Networks attempted this cycle.
    pub fn network_count(&self) -> usize {
        self.snapshots.len() + self.failures.len()
    }
}

/// Why one network's fetch failed.
struct FetchFailure {
    error: CoreError,
    transient: bool,
}

impl From<meshwatch_api::Error> for FetchFailure {
    fn from(err: meshwatch_api::Error) -> Self {
        Self {
            transient: err.is_transient(),
            error: err.into(),
        }
    }
}

/// Anything that can produce current network snapshots.
pub trait SnapshotSource: Send + Sync {
    fn fetch_snapshots(&self) -> impl Future<Output = FetchReport> + Send;
}

impl<S: SnapshotSource> SnapshotSource for Arc<S> {
    fn fetch_snapshots(&self) -> impl Future<Output = FetchReport> + Send {
        (**self).fetch_snapshots()
    }
}

// ── MeshSnapshotSource ──────────────────────────────────────────────

/// Live source backed by the controller API.
///
/// Networks are fetched concurrently, each under its own timeout. Within a
/// network, devices and access points are requested together; a failed
/// access point listing degrades to an empty list, a failed device listing
/// fails the network.
pub struct MeshSnapshotSource {
    client: Arc<MeshClient>,
    networks: Vec<NetworkTarget>,
    timeout: Duration,
}

impl MeshSnapshotSource {
    pub fn new(client: Arc<MeshClient>, networks: Vec<NetworkTarget>, timeout: Duration) -> Self {
        Self {
            client,
            networks,
            timeout,
        }
    }

    pub fn networks(&self) -> &[NetworkTarget] {
        &self.networks
    }

    async fn fetch_network(&self, network: &NetworkTarget) -> Result<NetworkSnapshot, FetchFailure> {
        let id = network.id.as_str();
        let (devices, access_points) = tokio::join!(
            self.client.list_devices(id),
            self.client.list_access_points(id),
        );

        let devices = devices?;
        let access_points = access_points.unwrap_or_else(|e| {
            warn!(
                network_id = id,
                error = %e,
                transient = e.is_transient(),
                "access point listing failed; continuing without APs"
            );
            Vec::new()
        });

        Ok(build_snapshot(network, devices, access_points))
    }
}

impl SnapshotSource for MeshSnapshotSource {
    async fn fetch_snapshots(&self) -> FetchReport {
        let fetches = self.networks.iter().map(|network| async move {
            let result = tokio::time::timeout(self.timeout, self.fetch_network(network))
                .await
                .unwrap_or_else(|_| {
                    Err(FetchFailure {
                        error: CoreError::Timeout {
                            timeout_secs: self.timeout.as_secs(),
                        },
                        transient: true,
                    })
                });
            (network, result)
        });

        let mut report = FetchReport::default();
        for (network, result) in join_all(fetches).await {
            match result {
                Ok(snapshot) => {
                    debug!(
                        network_id = %network.id,
                        devices = snapshot.total_devices,
                        access_points = snapshot.access_points.len(),
                        "network fetched"
                    );
                    report.snapshots.push(snapshot);
                }
                Err(failure) => {
                    warn!(
                        network_id = %network.id,
                        error = %failure.error,
                        transient = failure.transient,
                        "network fetch failed"
                    );
                    report.failures.push(NetworkFailure {
                        network_id: network.id.clone(),
                        network_name: network.name.clone(),
                        error: failure.error.to_string(),
                        transient: failure.transient,
                    });
                }
            }
        }
        report
    }
}

// ── StaticSnapshotSource ────────────────────────────────────────────

/// Source that replays a fixed report. Used for offline runs and tests.
#[derive(Debug, Default)]
pub struct StaticSnapshotSource {
    report: std::sync::Mutex<FetchReport>,
}

impl StaticSnapshotSource {
    pub fn new(snapshots: Vec<NetworkSnapshot>) -> Self {
        Self::from_report(FetchReport {
            snapshots,
            failures: Vec::new(),
        })
    }

    pub fn from_report(report: FetchReport) -> Self {
        Self {
            report: std::sync::Mutex::new(report),
        }
    }

    /// Replace what the next fetch returns.
    pub fn set(&self, report: FetchReport) {
        if let Ok(mut guard) = self.report.lock() {
            *guard = report;
        }
    }
}

impl SnapshotSource for StaticSnapshotSource {
    async fn fetch_snapshots(&self) -> FetchReport {
        self.report
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}
