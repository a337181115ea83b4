// Per-access-point device count swings. APs are matched by endpoint URL;
// appearing or vanishing APs produce nothing.

use chrono::{DateTime, Utc};

use crate::model::{ApDeviceChange, Event, NetworkSnapshot};

use super::thresholds::DetectionThresholds;

const FALLBACK_AP_NAME: &str = "Access Point";

pub(crate) fn detect_ap_events(
    previous: &NetworkSnapshot,
    current: &NetworkSnapshot,
    thresholds: &DetectionThresholds,
    now: DateTime<Utc>,
) -> Vec<Event> {
    current
        .access_points
        .iter()
        .filter_map(|ap| {
            let before = previous.access_points.iter().find(|p| p.url == ap.url)?;
            let change = i64::from(ap.device_count) - i64::from(before.device_count);
            (change.unsigned_abs() > u64::from(thresholds.ap_change_min_delta)).then(|| {
                Event::ApDeviceChange(ApDeviceChange {
                    network_id: current.id.clone(),
                    network_name: current.name.clone(),
                    ap_name: ap.name_or(FALLBACK_AP_NAME).to_owned(),
                    previous_devices: before.device_count,
                    current_devices: ap.device_count,
                    change,
                    timestamp: now,
                })
            })
        })
        .collect()
}
