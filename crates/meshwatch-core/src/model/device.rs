// ── Client device domain type ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::category::DeviceCategory;
use super::entity_id::MacAddress;
use super::radio::{Band, DeviceOs, SignalQuality, signal_percent};

/// Fallback display name when a device has neither nickname nor hostname.
pub const UNKNOWN_DEVICE: &str = "Unknown Device";

/// Physical link medium.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Medium {
    #[default]
    Wireless,
    Wired,
}

/// A device as seen in one snapshot.
///
/// Materialized fresh on every fetch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub mac: MacAddress,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub medium: Medium,
    /// Endpoint URL of the access point the device reports.
    #[serde(default)]
    pub ap_url: Option<String>,
    #[serde(default)]
    pub category: DeviceCategory,
    #[serde(default)]
    pub band: Option<Band>,
    #[serde(default)]
    pub signal_dbm: Option<f64>,
}

impl Device {
    /// Nickname, else hostname, else [`UNKNOWN_DEVICE`]. Empty strings count as absent.
    pub fn display_name(&self) -> &str {
        non_empty(self.nickname.as_deref())
            .or_else(|| non_empty(self.hostname.as_deref()))
            .unwrap_or(UNKNOWN_DEVICE)
    }

    pub fn is_wireless(&self) -> bool {
        self.medium == Medium::Wireless
    }

    pub fn signal_percent(&self) -> Option<u8> {
        self.signal_dbm.map(signal_percent)
    }

    pub fn signal_quality(&self) -> Option<SignalQuality> {
        self.signal_dbm.map(SignalQuality::from_dbm)
    }

    pub fn os(&self) -> DeviceOs {
        DeviceOs::guess(self.manufacturer.as_deref(), self.hostname.as_deref())
    }
}

/// `Some(s)` only when `s` is a non-empty string.
pub(crate) fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn device(nickname: Option<&str>, hostname: Option<&str>) -> Device {
        Device {
            mac: MacAddress::new("aa:bb:cc:dd:ee:ff"),
            nickname: nickname.map(str::to_owned),
            hostname: hostname.map(str::to_owned),
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

    #[test]
    fn display_name_prefers_nickname() {
        assert_eq!(device(Some("Den TV"), Some("roku")).display_name(), "Den TV");
        assert_eq!(device(None, Some("roku")).display_name(), "roku");
        assert_eq!(device(None, None).display_name(), UNKNOWN_DEVICE);
    }

    #[test]
    fn empty_names_count_as_absent() {
        assert_eq!(device(Some(""), Some("roku")).display_name(), "roku");
        assert_eq!(device(Some(""), Some("")).display_name(), UNKNOWN_DEVICE);
    }

    #[test]
    fn older_records_without_category_or_radio_fields_load() {
        let device: Device = serde_json::from_str(
            r#"{ "mac": "aa:bb:cc:dd:ee:ff", "connected": true, "medium": "wired" }"#,
        )
        .unwrap();
        assert_eq!(device.category, DeviceCategory::Other);
        assert_eq!(device.band, None);
        assert_eq!(device.signal_percent(), None);
    }

    #[test]
    fn signal_helpers_follow_the_reading() {
        let mut d = device(None, Some("Pixel-7"));
        d.signal_dbm = Some(-65.0);
        assert_eq!(d.signal_percent(), Some(70));
        assert_eq!(d.signal_quality(), Some(SignalQuality::Good));
        assert_eq!(d.os(), DeviceOs::Android);
    }
}
