// ── Radio band, signal strength and OS guess ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Wi-Fi frequency band a device is associated on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Band {
    #[serde(rename = "2.4GHz")]
    #[strum(to_string = "2.4 GHz", serialize = "2.4GHz")]
    Ghz2_4,
    #[serde(rename = "5GHz")]
    #[strum(to_string = "5 GHz", serialize = "5GHz")]
    Ghz5,
    #[serde(rename = "6GHz")]
    #[strum(to_string = "6 GHz", serialize = "6GHz")]
    Ghz6,
}

impl Band {
    /// Band for a reported frequency in GHz. Values outside
    /// `[2.4, 2.5)`, `[5, 6)` and `[6, 7)` have no band.
    pub fn from_ghz(ghz: f64) -> Option<Self> {
        if (2.4..2.5).contains(&ghz) {
            Some(Self::Ghz2_4)
        } else if (5.0..6.0).contains(&ghz) {
            Some(Self::Ghz5)
        } else if (6.0..7.0).contains(&ghz) {
            Some(Self::Ghz6)
        } else {
            None
        }
    }
}

/// Connected wireless devices per band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandCounts {
    #[serde(default, rename = "2.4GHz")]
    pub ghz_2_4: u32,
    #[serde(default, rename = "5GHz")]
    pub ghz_5: u32,
    #[serde(default, rename = "6GHz")]
    pub ghz_6: u32,
}

impl BandCounts {
    pub fn get(&self, band: Band) -> u32 {
        match band {
            Band::Ghz2_4 => self.ghz_2_4,
            Band::Ghz5 => self.ghz_5,
            Band::Ghz6 => self.ghz_6,
        }
    }

    pub fn total(&self) -> u32 {
        self.ghz_2_4 + self.ghz_5 + self.ghz_6
    }

    /// `(band, count)` from lowest to highest band.
    pub fn by_band(&self) -> impl Iterator<Item = (Band, u32)> + '_ {
        Band::iter().map(|band| (band, self.get(band)))
    }
}

impl FromIterator<Band> for BandCounts {
    fn from_iter<I: IntoIterator<Item = Band>>(iter: I) -> Self {
        let mut counts = Self::default();
        for band in iter {
            let slot = match band {
                Band::Ghz2_4 => &mut counts.ghz_2_4,
                Band::Ghz5 => &mut counts.ghz_5,
                Band::Ghz6 => &mut counts.ghz_6,
            };
            *slot += 1;
        }
        counts
    }
}

/// Coarse label for a signal strength reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum SignalQuality {
    Excellent,
    #[serde(rename = "Very Good")]
    #[strum(to_string = "Very Good")]
    VeryGood,
    Good,
    Fair,
    Poor,
}

impl SignalQuality {
    pub fn from_dbm(dbm: f64) -> Self {
        if dbm >= -50.0 {
            Self::Excellent
        } else if dbm >= -60.0 {
            Self::VeryGood
        } else if dbm >= -70.0 {
            Self::Good
        } else if dbm >= -80.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// Signal strength as a percentage: -50 dBm and stronger is 100, -100 dBm
/// and weaker is 0, linear (truncated) in between.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn signal_percent(dbm: f64) -> u8 {
    if dbm >= -50.0 {
        100
    } else if dbm <= -100.0 || dbm.is_nan() {
        0
    } else {
        (2.0 * (dbm + 100.0)) as u8
    }
}

/// Operating system guessed from manufacturer and hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum DeviceOs {
    #[serde(rename = "iOS")]
    #[strum(to_string = "iOS")]
    Ios,
    Android,
    Windows,
    Other,
}

const APPLE: &[&str] = &["apple", "iphone", "ipad", "mac", "ios"];
const ANDROID: &[&str] = &["android", "samsung", "google", "pixel", "lg", "htc"];
const WINDOWS: &[&str] = &["windows", "microsoft", "dell", "hp", "lenovo", "asus"];

impl DeviceOs {
    /// Keyword match over the lowercased "{manufacturer} {hostname}" text,
    /// checked Apple, then Android, then Windows.
    pub fn guess(manufacturer: Option<&str>, hostname: Option<&str>) -> Self {
        let text = format!(
            "{} {}",
            manufacturer.unwrap_or_default(),
            hostname.unwrap_or_default()
        )
        .to_lowercase();
        let any = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

        if any(APPLE) {
            Self::Ios
        } else if any(ANDROID) {
            Self::Android
        } else if any(WINDOWS) {
            Self::Windows
        } else {
            Self::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges() {
        assert_eq!(Band::from_ghz(2.4), Some(Band::Ghz2_4));
        assert_eq!(Band::from_ghz(2.5), None);
        assert_eq!(Band::from_ghz(5.0), Some(Band::Ghz5));
        assert_eq!(Band::from_ghz(5.8), Some(Band::Ghz5));
        assert_eq!(Band::from_ghz(6.0), Some(Band::Ghz6));
        assert_eq!(Band::from_ghz(7.0), None);
        assert_eq!(Band::from_ghz(0.0), None);
    }

    #[test]
    fn percent_clamps_and_scales() {
        assert_eq!(signal_percent(-40.0), 100);
        assert_eq!(signal_percent(-50.0), 100);
        assert_eq!(signal_percent(-50.5), 99);
        assert_eq!(signal_percent(-75.0), 50);
        assert_eq!(signal_percent(-99.9), 0);
        assert_eq!(signal_percent(-100.0), 0);
        assert_eq!(signal_percent(-120.0), 0);
    }

    #[test]
    fn quality_thresholds_are_inclusive() {
        let cases = [
            (-50.0, SignalQuality::Excellent),
            (-50.1, SignalQuality::VeryGood),
            (-60.0, SignalQuality::VeryGood),
            (-60.1, SignalQuality::Good),
            (-70.0, SignalQuality::Good),
            (-70.1, SignalQuality::Fair),
            (-80.0, SignalQuality::Fair),
            (-80.1, SignalQuality::Poor),
        ];
        for (dbm, quality) in cases {
            assert_eq!(SignalQuality::from_dbm(dbm), quality, "{dbm} dBm");
        }
        assert_eq!(SignalQuality::VeryGood.to_string(), "Very Good");
    }

    #[test]
    fn os_guess_checks_apple_first() {
        assert_eq!(DeviceOs::guess(Some("Apple"), None), DeviceOs::Ios);
        assert_eq!(DeviceOs::guess(None, Some("Pixel-7")), DeviceOs::Android);
        assert_eq!(DeviceOs::guess(Some("Dell Inc."), None), DeviceOs::Windows);
        assert_eq!(DeviceOs::guess(Some("Roku"), Some("den")), DeviceOs::Other);
        // "google" is Android, but an Apple hostname wins
        assert_eq!(DeviceOs::guess(Some("Google"), Some("macbook")), DeviceOs::Ios);
        assert_eq!(DeviceOs::Ios.to_string(), "iOS");
    }

    #[test]
    fn band_counts_tally() {
        let counts: BandCounts = [Band::Ghz5, Band::Ghz5, Band::Ghz2_4].into_iter().collect();
        assert_eq!(counts.get(Band::Ghz5), 2);
        assert_eq!(counts.get(Band::Ghz6), 0);
        assert_eq!(counts.total(), 3);
        assert_eq!(
            counts.by_band().collect::<Vec<_>>(),
            vec![(Band::Ghz2_4, 1), (Band::Ghz5, 2), (Band::Ghz6, 0)]
        );
        assert_eq!(Band::Ghz2_4.to_string(), "2.4 GHz");
    }
}
