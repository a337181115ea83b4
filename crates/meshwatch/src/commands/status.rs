//! Per-network overview.

use meshwatch_core::{BandCounts, DeviceTypeCounts, NetworkSnapshot};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::{Session, util};

// ── View ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct NetworkStatus {
    id: String,
    name: String,
    online: bool,
    total_devices: u32,
    wireless_devices: u32,
    wired_devices: u32,
    access_points: usize,
    device_types: DeviceTypeCounts,
    bands: BandCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    average_signal_dbm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<&NetworkSnapshot> for NetworkStatus {
    fn from(s: &NetworkSnapshot) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            online: true,
            total_devices: s.total_devices,
            wireless_devices: s.wireless_devices,
            wired_devices: s.wired_devices,
            access_points: s.access_points.len(),
            device_types: s.device_types,
            bands: s.bands,
            average_signal_dbm: s.average_signal_dbm,
            error: None,
        }
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Network")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Devices")]
    devices: String,
    #[tabled(rename = "Wireless")]
    wireless: String,
    #[tabled(rename = "Wired")]
    wired: String,
    #[tabled(rename = "APs")]
    aps: String,
    #[tabled(rename = "Bands")]
    bands: String,
    #[tabled(rename = "Avg signal")]
    signal: String,
}

/// "2.4 GHz: 1, 5 GHz: 4, 6 GHz: 0"
fn band_mix(bands: &BandCounts) -> String {
    bands
        .by_band()
        .map(|(band, n)| format!("{band}: {n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn average_signal(dbm: Option<f64>) -> String {
    dbm.map_or_else(|| "-".into(), |v| format!("{v:.0} dBm"))
}

fn row(n: &NetworkStatus, color: bool) -> StatusRow {
    let blank = |v: String| if n.online { v } else { "-".into() };
    StatusRow {
        name: n.name.clone(),
        id: n.id.clone(),
        status: output::status_text(if n.online { "online" } else { "unreachable" }, n.online, color),
        devices: blank(n.total_devices.to_string()),
        wireless: blank(n.wireless_devices.to_string()),
        wired: blank(n.wired_devices.to_string()),
        aps: blank(n.access_points.to_string()),
        bands: blank(band_mix(&n.bands)),
        signal: blank(average_signal(n.average_signal_dbm)),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let report = util::fetch(session.source.as_ref(), global).await?;

    let mut networks: Vec<NetworkStatus> = report.snapshots.iter().map(NetworkStatus::from).collect();
    networks.extend(report.failures.iter().map(|f| NetworkStatus {
        id: f.network_id.to_string(),
        name: f.network_name.clone(),
        online: false,
        total_devices: 0,
        wireless_devices: 0,
        wired_devices: 0,
        access_points: 0,
        device_types: DeviceTypeCounts::default(),
        bands: BandCounts::default(),
        average_signal_dbm: None,
        error: Some(f.error.clone()),
    }));

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &networks,
        |n| row(n, color),
        |n| n.id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
