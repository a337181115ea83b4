// ── Event summary ──

use serde::{Deserialize, Serialize};

use crate::model::{Event, EventKind};

/// Counts over a window of events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub total_events: usize,
    pub device_connections: usize,
    pub device_disconnections: usize,
    pub new_devices: usize,
    /// Load imbalances.
    pub performance_alerts: usize,
    /// Every `ap_*` kind.
    pub ap_events: usize,
}

impl EventSummary {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        events.into_iter().fold(Self::default(), |mut s, event| {
            let kind = event.kind();
            s.total_events += 1;
            match kind {
                EventKind::DeviceConnected => s.device_connections += 1,
                EventKind::DeviceDisconnected => s.device_disconnections += 1,
                EventKind::SignificantDeviceChange
                | EventKind::ApLoadImbalance
                | EventKind::ApDeviceChange => {}
            }
            if event.is_new_device() {
                s.new_devices += 1;
            }
            if kind.is_performance_alert() {
                s.performance_alerts += 1;
            }
            if kind.is_access_point() {
                s.ap_events += 1;
            }
            s
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{
        ApDeviceChange, ApLoadImbalance, DeviceConnected, ImbalanceReport, MacAddress, NetworkId,
        SignificantDeviceChange,
    };

    #[test]
    fn summary_counts_each_bucket() {
        let now = Utc::now();
        let net = NetworkId::from("n1");
        let connect = |mac: &str, is_new_device| {
            Event::DeviceConnected(DeviceConnected {
                device_mac: MacAddress::new(mac),
                device_name: "x".into(),
                network_id: net.clone(),
                network_name: "Home".into(),
                timestamp: now,
                is_new_device,
            })
        };
        let events = vec![
            connect("aa:00:00:00:00:01", true),
            connect("aa:00:00:00:00:02", false),
            Event::SignificantDeviceChange(SignificantDeviceChange {
                network_id: net.clone(),
                network_name: "Home".into(),
                previous_count: 10,
                current_count: 16,
                delta: 6,
                timestamp: now,
            }),
            Event::ApLoadImbalance(ApLoadImbalance {
                network_id: net.clone(),
                network_name: "Home".into(),
                report: ImbalanceReport {
                    busiest_ap: "Hall".into(),
                    busiest_count: 40,
                    lightest_ap: "Den".into(),
                    lightest_count: 0,
                    imbalance_ratio: 40.0,
                },
                timestamp: now,
            }),
            Event::ApDeviceChange(ApDeviceChange {
                network_id: net.clone(),
                network_name: "Home".into(),
                ap_name: "Hall".into(),
                previous_devices: 10,
                current_devices: 16,
                change: 6,
                timestamp: now,
            }),
        ];

        assert_eq!(
            EventSummary::from_events(&events),
            EventSummary {
                total_events: 5,
                device_connections: 2,
                device_disconnections: 0,
                new_devices: 1,
                performance_alerts: 1,
                ap_events: 2,
            }
        );
    }

    #[test]
    fn empty_window_is_all_zero() {
        assert_eq!(EventSummary::from_events(&[]), EventSummary::default());
    }
}
