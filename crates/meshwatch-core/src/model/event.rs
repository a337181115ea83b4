// ── Detected event domain types ──
//
// One variant per event kind, each carrying its own required fields plus
// the common timestamp / network pair. Serialized with a `type` tag so
// stored events stay readable.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::entity_id::{MacAddress, NetworkId};

/// Discriminant of [`Event`], usable as a filter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    DeviceConnected,
    DeviceDisconnected,
    SignificantDeviceChange,
    ApLoadImbalance,
    ApDeviceChange,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Load alerts. Device-count swings are reported as their own kind
    /// and are not counted here.
    pub fn is_performance_alert(self) -> bool {
        matches!(self, Self::ApLoadImbalance)
    }

    /// Kinds about access points (`ap_*`).
    pub fn is_access_point(self) -> bool {
        self.as_str().starts_with("ap_")
    }
}

// ── Variants ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConnected {
    pub device_mac: MacAddress,
    pub device_name: String,
    pub network_id: NetworkId,
    pub network_name: String,
    pub timestamp: DateTime<Utc>,
    /// The MAC had never been recorded before this connect.
    pub is_new_device: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDisconnected {
    pub device_mac: MacAddress,
    pub device_name: String,
    pub network_id: NetworkId,
    pub network_name: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificantDeviceChange {
    pub network_id: NetworkId,
    pub network_name: String,
    pub previous_count: u32,
    pub current_count: u32,
    pub delta: i64,
    pub timestamp: DateTime<Utc>,
}

/// Busiest versus lightest access point of one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImbalanceReport {
    pub busiest_ap: String,
    pub busiest_count: u32,
    pub lightest_ap: String,
    pub lightest_count: u32,
    /// `busiest_count / max(lightest_count, 1)`.
    pub imbalance_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApLoadImbalance {
    pub network_id: NetworkId,
    pub network_name: String,
    pub report: ImbalanceReport,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApDeviceChange {
    pub network_id: NetworkId,
    pub network_name: String,
    pub ap_name: String,
    pub previous_devices: u32,
    pub current_devices: u32,
    pub change: i64,
    pub timestamp: DateTime<Utc>,
}

// ── Event ───────────────────────────────────────────────────────────

/// A discrete change detected between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    DeviceConnected(DeviceConnected),
    DeviceDisconnected(DeviceDisconnected),
    SignificantDeviceChange(SignificantDeviceChange),
    ApLoadImbalance(ApLoadImbalance),
    ApDeviceChange(ApDeviceChange),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::DeviceConnected(_) => EventKind::DeviceConnected,
            Self::DeviceDisconnected(_) => EventKind::DeviceDisconnected,
            Self::SignificantDeviceChange(_) => EventKind::SignificantDeviceChange,
            Self::ApLoadImbalance(_) => EventKind::ApLoadImbalance,
            Self::ApDeviceChange(_) => EventKind::ApDeviceChange,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::DeviceConnected(e) => e.timestamp,
            Self::DeviceDisconnected(e) => e.timestamp,
            Self::SignificantDeviceChange(e) => e.timestamp,
            Self::ApLoadImbalance(e) => e.timestamp,
            Self::ApDeviceChange(e) => e.timestamp,
        }
    }

    pub fn network_id(&self) -> &NetworkId {
        match self {
            Self::DeviceConnected(e) => &e.network_id,
            Self::DeviceDisconnected(e) => &e.network_id,
            Self::SignificantDeviceChange(e) => &e.network_id,
            Self::ApLoadImbalance(e) => &e.network_id,
            Self::ApDeviceChange(e) => &e.network_id,
        }
    }

    pub fn network_name(&self) -> &str {
        match self {
            Self::DeviceConnected(e) => &e.network_name,
            Self::DeviceDisconnected(e) => &e.network_name,
            Self::SignificantDeviceChange(e) => &e.network_name,
            Self::ApLoadImbalance(e) => &e.network_name,
            Self::ApDeviceChange(e) => &e.network_name,
        }
    }

    /// The device a connect/disconnect event is about.
    pub fn device_mac(&self) -> Option<&MacAddress> {
        match self {
            Self::DeviceConnected(e) => Some(&e.device_mac),
            Self::DeviceDisconnected(e) => Some(&e.device_mac),
            Self::SignificantDeviceChange(_) | Self::ApLoadImbalance(_) | Self::ApDeviceChange(_) => {
                None
            }
        }
    }

    /// A connect of a MAC never recorded before.
    pub fn is_new_device(&self) -> bool {
        matches!(self, Self::DeviceConnected(e) if e.is_new_device)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceConnected(e) if e.is_new_device => write!(
                f,
                "New device {} joined {}",
                e.device_name, e.network_name
            ),
            Self::DeviceConnected(e) => {
                write!(f, "{} connected to {}", e.device_name, e.network_name)
            }
            Self::DeviceDisconnected(e) => {
                write!(f, "{} disconnected from {}", e.device_name, e.network_name)
            }
            Self::SignificantDeviceChange(e) => write!(
                f,
                "{} went from {} to {} devices ({:+})",
                e.network_name, e.previous_count, e.current_count, e.delta
            ),
            Self::ApLoadImbalance(e) => write!(
                f,
                "{} is unbalanced: {} has {} devices, {} has {} ({:.1}x)",
                e.network_name,
                e.report.busiest_ap,
                e.report.busiest_count,
                e.report.lightest_ap,
                e.report.lightest_count,
                e.report.imbalance_ratio
            ),
            Self::ApDeviceChange(e) => write!(
                f,
                "{} on {} went from {} to {} devices ({:+})",
                e.ap_name, e.network_name, e.previous_devices, e.current_devices, e.change
            ),
        }
    }
}
