// ── Network snapshot ──

use serde::{Deserialize, Serialize};

use super::access_point::AccessPoint;
use super::category::DeviceTypeCounts;
use super::device::Device;
use super::entity_id::NetworkId;
use super::radio::BandCounts;

/// State of one network at one point in time.
///
/// Snapshots are compared, never merged. Missing collections deserialize
/// as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub id: NetworkId,
    pub name: String,
    /// Connected devices only.
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub access_points: Vec<AccessPoint>,
    #[serde(default)]
    pub total_devices: u32,
    #[serde(default)]
    pub wireless_devices: u32,
    #[serde(default)]
    pub wired_devices: u32,
    #[serde(default)]
    pub device_types: DeviceTypeCounts,
    /// Connected wireless devices per radio band.
    #[serde(default)]
    pub bands: BandCounts,
    /// Mean signal over connected wireless devices that report one.
    #[serde(default)]
    pub average_signal_dbm: Option<f64>,
}

impl NetworkSnapshot {
    /// Assemble a snapshot, keeping connected devices only and deriving
    /// the aggregate counts from them.
    pub fn new(
        id: NetworkId,
        name: impl Into<String>,
        devices: Vec<Device>,
        access_points: Vec<AccessPoint>,
    ) -> Self {
        let devices: Vec<Device> = devices.into_iter().filter(|d| d.connected).collect();
        let wireless = devices.iter().filter(|d| d.is_wireless()).count();
        let device_types = devices.iter().map(|d| d.category).collect();
        let bands = devices
            .iter()
            .filter(|d| d.is_wireless())
            .filter_map(|d| d.band)
            .collect();
        let average_signal_dbm = average(
            devices
                .iter()
                .filter(|d| d.is_wireless())
                .filter_map(|d| d.signal_dbm),
        );

        Self {
            id,
            name: name.into(),
            total_devices: count(devices.len()),
            wireless_devices: count(wireless),
            wired_devices: count(devices.len() - wireless),
            device_types,
            bands,
            average_signal_dbm,
            devices,
            access_points,
        }
    }
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0_usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

pub(crate) fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Band, DeviceCategory, MacAddress, Medium};

    fn device(mac: &str, connected: bool, medium: Medium) -> Device {
        Device {
            mac: MacAddress::new(mac),
            nickname: None,
            hostname: None,
            manufacturer: None,
            ip: None,
            connected,
            medium,
            ap_url: None,
            category: DeviceCategory::Phones,
            band: None,
            signal_dbm: None,
        }
    }

    #[test]
    fn counts_cover_connected_devices_only() {
        let snap = NetworkSnapshot::new(
            NetworkId::from("n1"),
            "Home",
            vec![
                device("aa:00:00:00:00:01", true, Medium::Wireless),
                device("aa:00:00:00:00:02", true, Medium::Wired),
                device("aa:00:00:00:00:03", false, Medium::Wireless),
            ],
            Vec::new(),
        );
        assert_eq!(snap.devices.len(), 2);
        assert_eq!(snap.total_devices, 2);
        assert_eq!(snap.wireless_devices, 1);
        assert_eq!(snap.wired_devices, 1);
        assert_eq!(snap.device_types.phones, 2);
    }

    #[test]
    fn band_mix_and_average_signal_cover_wireless_devices() {
        let radio = |mac: &str, medium, band, dbm| Device {
            band,
            signal_dbm: dbm,
            ..device(mac, true, medium)
        };
        let snap = NetworkSnapshot::new(
            NetworkId::from("n1"),
            "Home",
            vec![
                radio("aa:00:00:00:00:01", Medium::Wireless, Some(Band::Ghz5), Some(-50.0)),
                radio("aa:00:00:00:00:02", Medium::Wireless, Some(Band::Ghz5), Some(-70.0)),
                radio("aa:00:00:00:00:03", Medium::Wireless, Some(Band::Ghz2_4), None),
                radio("aa:00:00:00:00:04", Medium::Wired, Some(Band::Ghz6), Some(-30.0)),
            ],
            Vec::new(),
        );
        assert_eq!(snap.bands.ghz_5, 2);
        assert_eq!(snap.bands.ghz_2_4, 1);
        assert_eq!(snap.bands.ghz_6, 0);
        assert!(
            snap.average_signal_dbm
                .is_some_and(|avg| (avg + 60.0).abs() < 1e-9)
        );
    }

    #[test]
    fn no_signal_readings_means_no_average() {
        let snap = NetworkSnapshot::new(
            NetworkId::from("n1"),
            "Home",
            vec![device("aa:00:00:00:00:01", true, Medium::Wireless)],
            Vec::new(),
        );
        assert_eq!(snap.average_signal_dbm, None);
        assert_eq!(snap.bands.total(), 0);
    }

    #[test]
    fn missing_collections_deserialize_empty() {
        let snap: NetworkSnapshot =
            serde_json::from_str(r#"{ "id": "n1", "name": "Home" }"#).unwrap();
        assert!(snap.devices.is_empty());
        assert!(snap.access_points.is_empty());
        assert_eq!(snap.total_devices, 0);
    }
}
