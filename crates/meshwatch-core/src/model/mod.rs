// ── Domain model ──
//
// Canonical representation of mesh-network state. Raw API payloads are
// converted into these types in `crate::convert`; everything downstream
// (detection, storage, phrasing, CLI) depends only on this module.

pub mod access_point;
pub mod category;
pub mod device;
pub mod entity_id;
pub mod event;
pub mod radio;
pub mod snapshot;

// ── Re-exports ──────────────────────────────────────────────────────

pub use access_point::AccessPoint;
pub use category::{DeviceCategory, DeviceTypeCounts};
pub use device::{Device, Medium, UNKNOWN_DEVICE};
pub use entity_id::{MacAddress, NetworkId};
pub use event::{
    ApDeviceChange, ApLoadImbalance, DeviceConnected, DeviceDisconnected, Event, EventKind,
    ImbalanceReport, SignificantDeviceChange,
};
pub use radio::{Band, BandCounts, DeviceOs, SignalQuality, signal_percent};
pub use snapshot::NetworkSnapshot;
