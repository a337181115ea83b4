// ── API-to-domain type conversions ──
//
// Bridges raw `meshwatch_api` payloads into canonical `model` types and
// assembles per-network snapshots.

use meshwatch_api::models::{RawAccessPoint, RawDevice, Reading};
use tracing::debug;

use crate::categorize::categorize_device;
use crate::config::NetworkTarget;
use crate::model::{AccessPoint, Band, Device, MacAddress, Medium, NetworkId, NetworkSnapshot};
use crate::model::snapshot::count;

// ── Device ───────────────────────────────────────────────────────────

fn parse_medium(raw: &RawDevice) -> Medium {
    match raw.connection_type.as_deref() {
        Some(t) if t.eq_ignore_ascii_case("wired") => Medium::Wired,
        Some(t) if t.eq_ignore_ascii_case("wireless") => Medium::Wireless,
        _ if raw.wireless => Medium::Wireless,
        _ => Medium::Wired,
    }
}

impl From<RawDevice> for Device {
    fn from(raw: RawDevice) -> Self {
        let medium = parse_medium(&raw);
        let category = categorize_device(raw.manufacturer.as_deref(), raw.hostname.as_deref());
        let interface = raw.interface.unwrap_or_default();
        let band = interface
            .frequency
            .as_ref()
            .and_then(Reading::value)
            .and_then(Band::from_ghz);
        let signal_dbm = interface.signal_dbm.as_ref().and_then(Reading::value);
        Device {
            mac: MacAddress::new(&raw.mac),
            nickname: raw.nickname,
            hostname: raw.hostname,
            manufacturer: raw.manufacturer,
            ip: raw.ip,
            connected: raw.connected,
            medium,
            ap_url: interface.ap_url,
            category,
            band,
            signal_dbm,
        }
    }
}

// ── Access point ─────────────────────────────────────────────────────

/// Connected wireless devices whose reported AP endpoint equals `url`.
///
/// Endpoint-URL equality is an approximation of radio association.
pub fn attributed_devices<'a>(devices: &'a [Device], url: &'a str) -> impl Iterator<Item = &'a Device> {
    devices
        .iter()
        .filter(move |d| d.connected && d.is_wireless() && d.ap_url.as_deref() == Some(url))
}

/// Convert a raw access point, deriving its device count from `devices`.
pub fn access_point_from_raw(
    raw: RawAccessPoint,
    network_id: &NetworkId,
    devices: &[Device],
) -> AccessPoint {
    let device_count = count(attributed_devices(devices, &raw.url).count());
    AccessPoint {
        location: raw
            .location
            .as_ref()
            .and_then(|l| l.name())
            .map(str::to_owned),
        url: raw.url,
        nickname: raw.nickname,
        model: raw.model,
        device_count,
        network_id: network_id.clone(),
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────

/// Build one network's snapshot from raw device and access point lists.
///
/// Devices without a MAC cannot be tracked between snapshots and are
/// dropped.
pub fn build_snapshot(
    network: &NetworkTarget,
    raw_devices: Vec<RawDevice>,
    raw_access_points: Vec<RawAccessPoint>,
) -> NetworkSnapshot {
    let devices: Vec<Device> = raw_devices
        .into_iter()
        .filter(|d| {
            let keep = !d.mac.trim().is_empty();
            if !keep {
                debug!(network_id = %network.id, "skipping device without MAC");
            }
            keep
        })
        .map(Device::from)
        .collect();

    let access_points = raw_access_points
        .into_iter()
        .map(|ap| access_point_from_raw(ap, &network.id, &devices))
        .collect();

    NetworkSnapshot::new(network.id.clone(), network.name.clone(), devices, access_points)
}
