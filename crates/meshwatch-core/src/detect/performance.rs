// Network-level performance rules: device-count swings and AP load imbalance.

use chrono::{DateTime, Utc};

use crate::model::{
    AccessPoint, ApLoadImbalance, Event, ImbalanceReport, NetworkSnapshot,
    SignificantDeviceChange,
};

use super::thresholds::DetectionThresholds;

const UNKNOWN_AP: &str = "Unknown AP";

pub(crate) fn significant_change(
    previous: &NetworkSnapshot,
    current: &NetworkSnapshot,
    thresholds: &DetectionThresholds,
    now: DateTime<Utc>,
) -> Option<Event> {
    let delta = i64::from(current.total_devices) - i64::from(previous.total_devices);
    let magnitude = delta.unsigned_abs();
    let pct = f64::from(u32::try_from(magnitude).unwrap_or(u32::MAX))
        / f64::from(previous.total_devices.max(1));

    (pct > thresholds.significant_change_ratio
        && magnitude > u64::from(thresholds.significant_change_min_delta))
    .then(|| {
        Event::SignificantDeviceChange(SignificantDeviceChange {
            network_id: current.id.clone(),
            network_name: current.name.clone(),
            previous_count: previous.total_devices,
            current_count: current.total_devices,
            delta,
            timestamp: now,
        })
    })
}

pub(crate) fn load_imbalance(
    current: &NetworkSnapshot,
    thresholds: &DetectionThresholds,
    now: DateTime<Utc>,
) -> Option<Event> {
    detect_load_imbalance_with(&current.access_points, thresholds).map(|report| {
        Event::ApLoadImbalance(ApLoadImbalance {
            network_id: current.id.clone(),
            network_name: current.name.clone(),
            report,
            timestamp: now,
        })
    })
}

/// Check a set of access points for lopsided load with the stock thresholds.
///
/// Needs at least two APs. Flags when the busiest carries more than three
/// times the mean and more than ten devices over the lightest.
pub fn detect_load_imbalance(access_points: &[AccessPoint]) -> Option<ImbalanceReport> {
    detect_load_imbalance_with(access_points, &DetectionThresholds::default())
}

/// [`detect_load_imbalance`] with explicit thresholds.
pub fn detect_load_imbalance_with(
    access_points: &[AccessPoint],
    thresholds: &DetectionThresholds,
) -> Option<ImbalanceReport> {
    if access_points.len() < 2 {
        return None;
    }

    // First AP wins ties on both ends.
    let mut busiest = &access_points[0];
    let mut lightest = &access_points[0];
    let mut sum = 0_u64;
    for ap in access_points {
        if ap.device_count > busiest.device_count {
            busiest = ap;
        }
        if ap.device_count < lightest.device_count {
            lightest = ap;
        }
        sum += u64::from(ap.device_count);
    }

    let max = busiest.device_count;
    let min = lightest.device_count;
    let n = u32::try_from(access_points.len()).unwrap_or(u32::MAX);
    let avg = f64::from(u32::try_from(sum).unwrap_or(u32::MAX)) / f64::from(n);

    let lopsided = f64::from(max) > avg * thresholds.imbalance_load_factor
        && max - min > thresholds.imbalance_min_spread;

    lopsided.then(|| ImbalanceReport {
        busiest_ap: busiest.name_or(UNKNOWN_AP).to_owned(),
        busiest_count: max,
        lightest_ap: lightest.name_or(UNKNOWN_AP).to_owned(),
        lightest_count: min,
        imbalance_ratio: f64::from(max) / f64::from(min.max(1)),
    })
}
