// ── Access point domain type ──

use serde::{Deserialize, Serialize};

use super::device::non_empty;
use super::entity_id::NetworkId;

/// A mesh access point as seen in one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPoint {
    /// Endpoint URL; the identity of the access point.
    pub url: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Connected wireless devices attributed to this access point.
    #[serde(default)]
    pub device_count: u32,
    pub network_id: NetworkId,
}

impl AccessPoint {
    /// Nickname, else model, else `fallback`. Empty strings count as absent.
    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_empty(self.nickname.as_deref())
            .or_else(|| non_empty(self.model.as_deref()))
            .unwrap_or(fallback)
    }
}
