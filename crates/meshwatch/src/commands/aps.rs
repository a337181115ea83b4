//! Access point listing with load-imbalance warnings.

use meshwatch_core::{AccessPoint, detect_load_imbalance_with, speech};
use tabled::Tabled;

use crate::cli::{ApsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{Session, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ApRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Devices")]
    devices: u32,
    #[tabled(rename = "Network")]
    network: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: ApsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let report = util::fetch(session.source.as_ref(), global).await?;
    let snapshots =
        util::filter_network(&session.resolved.monitor, report.snapshots, args.network.as_deref())?;

    let thresholds = session.resolved.monitor.thresholds;
    let color = output::should_color(&global.color);
    for snapshot in &snapshots {
        if let Some(report) = detect_load_imbalance_with(&snapshot.access_points, &thresholds) {
            output::note(
                &output::status_text(
                    &format!(
                        "warning: {} is unbalanced: {} has {} devices, {} has {}",
                        snapshot.name,
                        report.busiest_ap,
                        report.busiest_count,
                        report.lightest_ap,
                        report.lightest_count
                    ),
                    false,
                    color,
                ),
                global.quiet,
            );
        }
    }

    let network_name = |ap: &AccessPoint| {
        snapshots
            .iter()
            .find(|s| s.id == ap.network_id)
            .map(|s| s.name.clone())
            .unwrap_or_default()
    };
    let aps: Vec<AccessPoint> = snapshots
        .iter()
        .flat_map(|s| s.access_points.iter().cloned())
        .collect();

    let out = output::render_list(
        &global.output,
        &aps,
        |ap| ApRow {
            name: speech::ap_display_name(ap),
            model: ap.model.clone().unwrap_or_default(),
            location: ap.location.clone().unwrap_or_default(),
            devices: ap.device_count,
            network: network_name(ap),
        },
        |ap| ap.url.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
