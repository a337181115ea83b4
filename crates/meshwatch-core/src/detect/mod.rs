// ── Event detection engine ──
//
// Compares two snapshot sets and emits an ordered list of typed events.
// Pure computation: no I/O apart from the injected device-history lookup,
// no errors, no state kept between calls.
//
// Output order is fixed:
//   1. device connects, then device disconnects
//   2. per current network: significant count change, then load imbalance
//   3. per-access-point count changes

mod access_points;
mod devices;
mod performance;
mod thresholds;

use chrono::{DateTime, Utc};

use crate::model::{Event, NetworkSnapshot};
use crate::store::DeviceHistory;

pub use performance::{detect_load_imbalance, detect_load_imbalance_with};
pub use thresholds::DetectionThresholds;

/// Event detector bound to a set of thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventDetector {
    thresholds: DetectionThresholds,
}

impl EventDetector {
    pub fn new(thresholds: DetectionThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &DetectionThresholds {
        &self.thresholds
    }

    /// Diff `previous` against `current`.
    ///
    /// Returns nothing when either side is absent or empty. Network-level
    /// and AP rules only run for current networks that also appear in
    /// `previous` (first match by id).
    pub fn detect<H: DeviceHistory + ?Sized>(
        &self,
        previous: Option<&[NetworkSnapshot]>,
        current: Option<&[NetworkSnapshot]>,
        history: &H,
        now: DateTime<Utc>,
    ) -> Vec<Event> {
        let (Some(previous), Some(current)) = (previous, current) else {
            return Vec::new();
        };
        if previous.is_empty() || current.is_empty() {
            return Vec::new();
        }

        let mut events = devices::detect_device_events(previous, current, history, now);

        let pairs: Vec<(&NetworkSnapshot, &NetworkSnapshot)> = current
            .iter()
            .filter_map(|cur| {
                previous
                    .iter()
                    .find(|prev| prev.id == cur.id)
                    .map(|prev| (prev, cur))
            })
            .collect();

        for (prev, cur) in &pairs {
            events.extend(performance::significant_change(prev, cur, &self.thresholds, now));
            events.extend(performance::load_imbalance(cur, &self.thresholds, now));
        }

        for (prev, cur) in &pairs {
            events.extend(access_points::detect_ap_events(prev, cur, &self.thresholds, now));
        }

        events
    }
}

/// [`EventDetector::detect`] with the stock thresholds.
pub fn detect_events<H: DeviceHistory + ?Sized>(
    previous: Option<&[NetworkSnapshot]>,
    current: Option<&[NetworkSnapshot]>,
    history: &H,
    now: DateTime<Utc>,
) -> Vec<Event> {
    EventDetector::default().detect(previous, current, history, now)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::CoreError;
    use crate::model::{
        AccessPoint, Device, DeviceCategory, EventKind, MacAddress, Medium, NetworkId,
    };
    use crate::store::NoHistory;

    // ── Fixtures ────────────────────────────────────────────────────

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap()
    }

    fn device(mac: &str, name: &str) -> Device {
        Device {
            mac: MacAddress::new(mac),
            nickname: Some(name.into()),
            hostname: None,
            manufacturer: None,
            ip: None,
            connected: true,
            medium: Medium::Wireless,
            ap_url: None,
            category: DeviceCategory::Other,
            band: None,
            signal_dbm: None,
        }
    }

    fn ap(url: &str, name: &str, count: u32) -> AccessPoint {
        AccessPoint {
            url: url.into(),
            nickname: Some(name.into()),
            model: None,
            location: None,
            device_count: count,
            network_id: NetworkId::from("n1"),
        }
    }

    fn network(id: &str, macs: &[&str], aps: Vec<AccessPoint>) -> NetworkSnapshot {
        let devices = macs
            .iter()
            .enumerate()
            .map(|(i, mac)| device(mac, &format!("dev-{i}")))
            .collect();
        NetworkSnapshot::new(NetworkId::from(id), format!("Net {id}"), devices, aps)
    }

    fn macs(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("02:00:00:00:00:{i:02x}")).collect()
    }

    fn network_with(id: &str, count: usize) -> NetworkSnapshot {
        let list = macs(count);
        let refs: Vec<&str> = list.iter().map(String::as_str).collect();
        network(id, &refs, Vec::new())
    }

    fn kinds(events: &[Event]) -> Vec<EventKind> {
        events.iter().map(Event::kind).collect()
    }

    struct FailingHistory;

    impl DeviceHistory for FailingHistory {
        fn has_been_seen(&self, _mac: &MacAddress) -> Result<bool, CoreError> {
            Err(CoreError::Store {
                message: "unavailable".into(),
            })
        }
    }

    // ── Absent input ────────────────────────────────────────────────

    #[test]
    fn absent_or_empty_inputs_yield_nothing() {
        let snap = vec![network("n1", &["aa:00:00:00:00:01"], Vec::new())];
        assert!(detect_events(None, Some(&snap), &NoHistory, now()).is_empty());
        assert!(detect_events(Some(&snap), None, &NoHistory, now()).is_empty());
        assert!(detect_events(Some(&[]), Some(&snap), &NoHistory, now()).is_empty());
        assert!(detect_events(Some(&snap), Some(&[]), &NoHistory, now()).is_empty());
    }

    #[test]
    fn identical_snapshots_yield_nothing() {
        let snap = vec![network(
            "n1",
            &["aa:00:00:00:00:01", "aa:00:00:00:00:02"],
            vec![ap("/eeros/1", "Hall", 2), ap("/eeros/2", "Den", 1)],
        )];
        assert!(detect_events(Some(&snap), Some(&snap), &NoHistory, now()).is_empty());
    }

    #[test]
    fn standing_imbalance_reports_without_any_change() {
        let snap = vec![network(
            "n1",
            &[],
            vec![
                ap("/eeros/1", "Hall", 40),
                ap("/eeros/2", "Den", 0),
                ap("/eeros/3", "Attic", 0),
                ap("/eeros/4", "Garage", 0),
            ],
        )];
        let events = detect_events(Some(&snap), Some(&snap), &NoHistory, now());
        assert_eq!(kinds(&events), vec![EventKind::ApLoadImbalance]);
    }

    // ── Devices ─────────────────────────────────────────────────────

    #[test]
    fn connects_and_disconnects_partition_the_symmetric_difference() {
        let prev = vec![network(
            "n1",
            &["aa:00:00:00:00:01", "aa:00:00:00:00:02", "aa:00:00:00:00:03"],
            Vec::new(),
        )];
        let cur = vec![network(
            "n1",
            &["aa:00:00:00:00:02", "aa:00:00:00:00:04", "aa:00:00:00:00:05"],
            Vec::new(),
        )];

        let events = detect_events(Some(&prev), Some(&cur), &NoHistory, now());
        let summary: Vec<(EventKind, String)> = events
            .iter()
            .map(|e| (e.kind(), e.device_mac().unwrap().to_string()))
            .collect();

        assert_eq!(
            summary,
            vec![
                (EventKind::DeviceConnected, "aa:00:00:00:00:04".to_owned()),
                (EventKind::DeviceConnected, "aa:00:00:00:00:05".to_owned()),
                (EventKind::DeviceDisconnected, "aa:00:00:00:00:01".to_owned()),
                (EventKind::DeviceDisconnected, "aa:00:00:00:00:03".to_owned()),
            ]
        );
        assert!(events.iter().all(|e| e.timestamp() == now()));
    }

    #[test]
    fn device_moving_between_networks_emits_nothing() {
        let prev = vec![
            network("n1", &["aa:00:00:00:00:01"], Vec::new()),
            network("n2", &[], Vec::new()),
        ];
        let cur = vec![
            network("n1", &[], Vec::new()),
            network("n2", &["aa:00:00:00:00:01"], Vec::new()),
        ];
        assert!(detect_events(Some(&prev), Some(&cur), &NoHistory, now()).is_empty());
    }

    #[test]
    fn connect_carries_device_and_network_names() {
        let prev = vec![network("n1", &[], Vec::new())];
        let cur = vec![network("n1", &["AA:00:00:00:00:09"], Vec::new())];

        let events = detect_events(Some(&prev), Some(&cur), &NoHistory, now());
        let Event::DeviceConnected(e) = &events[0] else {
            panic!("expected connect, got {events:?}");
        };
        assert_eq!(e.device_mac.as_str(), "aa:00:00:00:00:09");
        assert_eq!(e.device_name, "dev-0");
        assert_eq!(e.network_id.as_str(), "n1");
        assert_eq!(e.network_name, "Net n1");
        assert!(e.is_new_device);
    }

    #[test]
    fn new_device_flag_follows_history() {
        let prev = vec![network("n1", &[], Vec::new())];
        let cur = vec![network(
            "n1",
            &["aa:00:00:00:00:01", "aa:00:00:00:00:02"],
            Vec::new(),
        )];
        let seen: HashSet<MacAddress> = [MacAddress::new("aa:00:00:00:00:01")].into();

        let events = detect_events(Some(&prev), Some(&cur), &seen, now());
        let flags: Vec<bool> = events.iter().map(Event::is_new_device).collect();
        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn history_failure_means_not_new() {
        let prev = vec![network("n1", &[], Vec::new())];
        let cur = vec![network("n1", &["aa:00:00:00:00:01"], Vec::new())];

        let events = detect_events(Some(&prev), Some(&cur), &FailingHistory, now());
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_new_device());
    }

    // ── Significant change ──────────────────────────────────────────

    #[test]
    fn ten_to_fourteen_is_not_significant() {
        let prev = vec![network_with("n1", 10)];
        let cur = vec![network_with("n1", 14)];
        let events = detect_events(Some(&prev), Some(&cur), &NoHistory, now());
        assert!(!kinds(&events).contains(&EventKind::SignificantDeviceChange));
    }

    #[test]
    fn ten_to_sixteen_is_significant() {
        let prev = vec![network_with("n1", 10)];
        let cur = vec![network_with("n1", 16)];
        let events = detect_events(Some(&prev), Some(&cur), &NoHistory, now());

        let change = events
            .iter()
            .find_map(|e| match e {
                Event::SignificantDeviceChange(c) => Some(c),
                _ => None,
            })
            .expect("significant change");
        assert_eq!(change.previous_count, 10);
        assert_eq!(change.current_count, 16);
        assert_eq!(change.delta, 6);
    }

    #[test]
    fn drops_are_significant_too() {
        let prev = vec![network_with("n1", 12)];
        let cur = vec![network_with("n1", 2)];
        let events = detect_events(Some(&prev), Some(&cur), &NoHistory, now());
        let delta = events.iter().find_map(|e| match e {
            Event::SignificantDeviceChange(c) => Some(c.delta),
            _ => None,
        });
        assert_eq!(delta, Some(-10));
    }

    #[test]
    fn growth_from_empty_uses_a_floor_of_one() {
        // pct = 4 / max(0, 1) = 4, delta 4 > 3
        let prev = vec![network_with("n1", 0)];
        let cur = vec![network_with("n1", 4)];
        let events = detect_events(Some(&prev), Some(&cur), &NoHistory, now());
        assert!(kinds(&events).contains(&EventKind::SignificantDeviceChange));
    }

    #[test]
    fn networks_missing_from_baseline_are_skipped() {
        let prev = vec![network_with("n1", 1)];
        let cur = vec![
            network_with("n1", 1),
            network(
                "n2",
                &[],
                vec![
                    ap("/eeros/1", "Hall", 40),
                    ap("/eeros/2", "Den", 0),
                    ap("/eeros/3", "Attic", 0),
                    ap("/eeros/4", "Garage", 0),
                ],
            ),
        ];
        let events = detect_events(Some(&prev), Some(&cur), &NoHistory, now());
        assert!(events.is_empty(), "unexpected: {events:?}");
    }

    // ── Access points ───────────────────────────────────────────────

    #[test]
    fn ap_change_above_five_is_reported() {
        let prev = vec![network("n1", &[], vec![ap("/eeros/1", "Hall", 10)])];
        let cur = vec![network("n1", &[], vec![ap("/eeros/1", "Hall", 16)])];
        let events = detect_events(Some(&prev), Some(&cur), &NoHistory, now());

        let Some(Event::ApDeviceChange(e)) = events.first() else {
            panic!("expected AP change, got {events:?}");
        };
        assert_eq!(e.ap_name, "Hall");
        assert_eq!(e.previous_devices, 10);
        assert_eq!(e.current_devices, 16);
        assert_eq!(e.change, 6);
    }

    #[test]
    fn ap_change_of_five_is_not_reported() {
        let prev = vec![network("n1", &[], vec![ap("/eeros/1", "Hall", 10)])];
        let cur = vec![network("n1", &[], vec![ap("/eeros/1", "Hall", 15)])];
        assert!(detect_events(Some(&prev), Some(&cur), &NoHistory, now()).is_empty());
    }

    #[test]
    fn new_or_removed_aps_are_silent() {
        let prev = vec![network("n1", &[], vec![ap("/eeros/1", "Hall", 0)])];
        let cur = vec![network("n1", &[], vec![ap("/eeros/2", "Den", 30)])];
        assert!(detect_events(Some(&prev), Some(&cur), &NoHistory, now()).is_empty());
    }

    #[test]
    fn unnamed_ap_uses_generic_name() {
        let mut before = ap("/eeros/1", "", 0);
        before.nickname = None;
        let mut after = before.clone();
        after.device_count = 9;
        let prev = vec![network("n1", &[], vec![before])];
        let cur = vec![network("n1", &[], vec![after])];

        let events = detect_events(Some(&prev), Some(&cur), &NoHistory, now());
        let Some(Event::ApDeviceChange(e)) = events.first() else {
            panic!("expected AP change, got {events:?}");
        };
        assert_eq!(e.ap_name, "Access Point");
    }

    // ── Ordering & thresholds ───────────────────────────────────────

    #[test]
    fn events_follow_fixed_group_order() {
        let prev = vec![network_with("n1", 10)];

        let mut cur_net = network_with("n1", 16);
        cur_net.access_points = vec![
            ap("/eeros/1", "Hall", 40),
            ap("/eeros/2", "Den", 0),
            ap("/eeros/3", "Attic", 0),
            ap("/eeros/4", "Garage", 0),
        ];
        let mut prev_net = prev[0].clone();
        prev_net.access_points = vec![
            ap("/eeros/1", "Hall", 20),
            ap("/eeros/2", "Den", 0),
            ap("/eeros/3", "Attic", 0),
            ap("/eeros/4", "Garage", 0),
        ];
        let prev = vec![prev_net];
        let cur = vec![cur_net];

        let events = detect_events(Some(&prev), Some(&cur), &NoHistory, now());
        let mut expected = vec![EventKind::DeviceConnected; 6];
        expected.extend([
            EventKind::SignificantDeviceChange,
            EventKind::ApLoadImbalance,
            EventKind::ApDeviceChange,
        ]);
        assert_eq!(kinds(&events), expected);
    }

    #[test]
    fn custom_thresholds_are_honoured() {
        let detector = EventDetector::new(DetectionThresholds {
            ap_change_min_delta: 1,
            ..DetectionThresholds::default()
        });
        let prev = vec![network("n1", &[], vec![ap("/eeros/1", "Hall", 10)])];
        let cur = vec![network("n1", &[], vec![ap("/eeros/1", "Hall", 12)])];
        let events = detector.detect(Some(&prev), Some(&cur), &NoHistory, now());
        assert_eq!(kinds(&events), vec![EventKind::ApDeviceChange]);
    }
}
