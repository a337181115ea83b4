// ── Device categories ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Coarse device category guessed from manufacturer and hostname.
///
/// Variant order is the order categories are reported in, not the order
/// they are matched in (see [`categorize_device`](crate::categorize_device)).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum DeviceCategory {
    Phones,
    Laptops,
    Tablets,
    #[strum(to_string = "smartHome", serialize = "smart-home")]
    SmartHome,
    Gaming,
    Streaming,
    #[default]
    Other,
}

impl DeviceCategory {
    /// Singular spoken noun, e.g. "smart home device".
    pub fn noun(self) -> &'static str {
        match self {
            Self::Phones => "phone",
            Self::Laptops => "laptop",
            Self::Tablets => "tablet",
            Self::SmartHome => "smart home device",
            Self::Gaming => "gaming device",
            Self::Streaming => "streaming device",
            Self::Other => "other device",
        }
    }
}

/// Per-category device counts for one snapshot (or a sum of several).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceTypeCounts {
    pub phones: u32,
    pub laptops: u32,
    pub tablets: u32,
    pub smart_home: u32,
    pub gaming: u32,
    pub streaming: u32,
    pub other: u32,
}

impl DeviceTypeCounts {
    pub fn get(&self, category: DeviceCategory) -> u32 {
        match category {
            DeviceCategory::Phones => self.phones,
            DeviceCategory::Laptops => self.laptops,
            DeviceCategory::Tablets => self.tablets,
            DeviceCategory::SmartHome => self.smart_home,
            DeviceCategory::Gaming => self.gaming,
            DeviceCategory::Streaming => self.streaming,
            DeviceCategory::Other => self.other,
        }
    }

    fn slot(&mut self, category: DeviceCategory) -> &mut u32 {
        match category {
            DeviceCategory::Phones => &mut self.phones,
            DeviceCategory::Laptops => &mut self.laptops,
            DeviceCategory::Tablets => &mut self.tablets,
            DeviceCategory::SmartHome => &mut self.smart_home,
            DeviceCategory::Gaming => &mut self.gaming,
            DeviceCategory::Streaming => &mut self.streaming,
            DeviceCategory::Other => &mut self.other,
        }
    }

    pub fn increment(&mut self, category: DeviceCategory) {
        *self.slot(category) += 1;
    }

    /// Add another set of counts into this one.
    pub fn merge(&mut self, other: &Self) {
        for (category, count) in other.iter() {
            *self.slot(category) += count;
        }
    }

    /// Categories with their counts, in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (DeviceCategory, u32)> + '_ {
        DeviceCategory::iter().map(|c| (c, self.get(c)))
    }

    pub fn total(&self) -> u32 {
        self.iter().map(|(_, n)| n).sum()
    }
}

impl FromIterator<DeviceCategory> for DeviceTypeCounts {
    fn from_iter<I: IntoIterator<Item = DeviceCategory>>(iter: I) -> Self {
        let mut counts = Self::default();
        for category in iter {
            counts.increment(category);
        }
        counts
    }
}
