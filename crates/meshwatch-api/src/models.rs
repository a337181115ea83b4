// Controller API response types
//
// Every response is wrapped in the `Envelope<T>` shape. Fields use
// `#[serde(default)]` liberally because the controller omits keys freely
// across firmware versions; anything not modelled lands in `extra`.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard controller response envelope.
///
/// ```json
/// { "meta": { "code": 200, "server_time": "..." }, "data": [...] }
/// ```
///
/// A missing or `null` `data` field means an empty collection.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub meta: Option<Meta>,
    pub data: Option<Vec<T>>,
}

/// Metadata from the envelope. `error` is set on failures.
#[derive(Debug, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Device ───────────────────────────────────────────────────────────

/// Client device from `GET /networks/{id}/devices`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDevice {
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub url: Option<String>,
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
    pub wireless: bool,
    /// `"wired"` or `"wireless"` on newer firmware.
    #[serde(default)]
    pub connection_type: Option<String>,
    #[serde(default)]
    pub interface: Option<DeviceInterface>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Radio interface details nested inside `RawDevice`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceInterface {
    /// Endpoint URL of the access point the device reports.
    #[serde(default, rename = "eero_url")]
    pub ap_url: Option<String>,
    /// Radio frequency in GHz, e.g. `"5"` or `2.4`.
    #[serde(default)]
    pub frequency: Option<Reading>,
    /// Received signal strength, e.g. `-61` or `"-61 dBm"`.
    #[serde(default)]
    pub signal_dbm: Option<Reading>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A measurement the controller sends as a number or as text with a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Number(f64),
    Text(String),
}

impl Reading {
    /// The numeric value, ignoring a trailing unit. `"N/A"` and other
    /// non-numeric text yield `None`.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s
                .trim()
                .trim_end_matches(|c: char| c.is_ascii_alphabetic())
                .trim()
                .parse()
                .ok(),
        }
    }
}

// ── Access point ─────────────────────────────────────────────────────

/// Mesh node from `GET /networks/{id}/eeros`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAccessPoint {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub location: Option<ApLocation>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub gateway: bool,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Location is a bare string on some firmware and an object on others.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApLocation {
    Plain(String),
    Named {
        #[serde(default)]
        name: Option<String>,
    },
}

impl ApLocation {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Plain(s) => Some(s.as_str()),
            Self::Named { name } => name.as_deref(),
        }
    }
}
