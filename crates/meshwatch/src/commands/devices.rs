//! Connected device listing.

use meshwatch_core::{Device, DeviceCategory, DeviceOs, NetworkId, SignalQuality};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{DevicesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{Session, util};

#[derive(Serialize)]
struct NetworkDevice {
    network_id: NetworkId,
    network_name: String,
    #[serde(flatten)]
    device: Device,
    os: DeviceOs,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal_percent: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal_quality: Option<SignalQuality>,
}

impl NetworkDevice {
    fn new(network_id: NetworkId, network_name: String, device: Device) -> Self {
        Self {
            network_id,
            network_name,
            os: device.os(),
            signal_percent: device.signal_percent(),
            signal_quality: device.signal_quality(),
            device,
        }
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Link")]
    medium: String,
    #[tabled(rename = "Band")]
    band: String,
    #[tabled(rename = "Signal")]
    signal: String,
    #[tabled(rename = "OS")]
    os: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Manufacturer")]
    manufacturer: String,
    #[tabled(rename = "Network")]
    network: String,
}

impl From<&NetworkDevice> for DeviceRow {
    fn from(d: &NetworkDevice) -> Self {
        Self {
            name: d.device.display_name().to_owned(),
            mac: d.device.mac.to_string(),
            ip: d.device.ip.clone().unwrap_or_default(),
            medium: d.device.medium.to_string(),
            band: d.device.band.as_ref().map_or_else(|| "-".into(), ToString::to_string),
            signal: signal_cell(d.signal_percent, d.signal_quality),
            os: d.os.to_string(),
            category: meshwatch_core::speech::category_label(d.device.category).into(),
            manufacturer: d.device.manufacturer.clone().unwrap_or_default(),
            network: d.network_name.clone(),
        }
    }
}

/// "72% (Very Good)", or "-" when the device reports no signal.
fn signal_cell(percent: Option<u8>, quality: Option<SignalQuality>) -> String {
    match (percent, quality) {
        (Some(p), Some(q)) => format!("{p}% ({q})"),
        _ => "-".into(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let category = args
        .category
        .as_deref()
        .map(|c| {
            c.parse::<DeviceCategory>().map_err(|_| CliError::Validation {
                field: "category".into(),
                reason: format!(
                    "unknown category '{c}'; expected phones, laptops, tablets, smart-home, \
                     gaming, streaming, or other"
                ),
            })
        })
        .transpose()?;

    let report = util::fetch(session.source.as_ref(), global).await?;
    let snapshots =
        util::filter_network(&session.resolved.monitor, report.snapshots, args.network.as_deref())?;

    let devices: Vec<NetworkDevice> = snapshots
        .into_iter()
        .flat_map(|s| {
            let (id, name) = (s.id, s.name);
            s.devices
                .into_iter()
                .map(move |device| NetworkDevice::new(id.clone(), name.clone(), device))
        })
        .filter(|d| category.is_none_or(|c| d.device.category == c))
        .collect();

    let out = output::render_list(
        &global.output,
        &devices,
        |d| DeviceRow::from(d),
        |d| d.device.mac.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
