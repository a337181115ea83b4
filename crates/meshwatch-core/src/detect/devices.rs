// Connect / disconnect detection
//
// Devices are keyed by MAC across every network in a snapshot set, so a
// device roaming between two monitored networks emits nothing.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::warn;

use crate::model::{
    Device, DeviceConnected, DeviceDisconnected, Event, MacAddress, NetworkSnapshot,
};
use crate::store::DeviceHistory;

struct Sighting<'a> {
    device: &'a Device,
    network: &'a NetworkSnapshot,
}

/// MAC → (device, network), in first-seen order. A later duplicate
/// replaces the value but keeps the original position.
fn flatten(snapshots: &[NetworkSnapshot]) -> IndexMap<&MacAddress, Sighting<'_>> {
    let mut map = IndexMap::new();
    for network in snapshots {
        for device in &network.devices {
            map.insert(&device.mac, Sighting { device, network });
        }
    }
    map
}

fn is_new<H: DeviceHistory + ?Sized>(history: &H, mac: &MacAddress) -> bool {
    match history.has_been_seen(mac) {
        Ok(seen) => !seen,
        Err(e) => {
            warn!(%mac, error = %e, "device history lookup failed");
            false
        }
    }
}

/// All connects (in current order), then all disconnects (in previous order).
pub(crate) fn detect_device_events<H: DeviceHistory + ?Sized>(
    previous: &[NetworkSnapshot],
    current: &[NetworkSnapshot],
    history: &H,
    now: DateTime<Utc>,
) -> Vec<Event> {
    let before = flatten(previous);
    let after = flatten(current);

    let connects = after
        .iter()
        .filter(|(mac, _)| !before.contains_key(*mac))
        .map(|(mac, seen)| {
            Event::DeviceConnected(DeviceConnected {
                device_mac: (*mac).clone(),
                device_name: seen.device.display_name().to_owned(),
                network_id: seen.network.id.clone(),
                network_name: seen.network.name.clone(),
                timestamp: now,
                is_new_device: is_new(history, mac),
            })
        });

    let disconnects = before
        .iter()
        .filter(|(mac, _)| !after.contains_key(*mac))
        .map(|(mac, seen)| {
            Event::DeviceDisconnected(DeviceDisconnected {
                device_mac: (*mac).clone(),
                device_name: seen.device.display_name().to_owned(),
                network_id: seen.network.id.clone(),
                network_name: seen.network.name.clone(),
                timestamp: now,
            })
        });

    connects.chain(disconnects).collect()
}
