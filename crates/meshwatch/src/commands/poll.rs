//! One poll cycle against the persisted baseline.

use std::sync::Arc;

use meshwatch_core::{Event, EventStore, Monitor, PollOutcome};
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::config::retention;
use crate::error::CliError;
use crate::output;

use super::{Session, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct EventRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Details")]
    details: String,
}

impl From<&Event> for EventRow {
    fn from(e: &Event) -> Self {
        Self {
            time: util::format_time(e.timestamp()),
            kind: e.kind().to_string(),
            network: e.network_name().to_owned(),
            details: e.to_string(),
        }
    }
}

fn summary_line(outcome: &PollOutcome) -> String {
    let s = &outcome.summary;
    let mut line = format!(
        "{} event{} across {} network{}",
        s.total_events,
        if s.total_events == 1 { "" } else { "s" },
        outcome.snapshots.len(),
        if outcome.snapshots.len() == 1 { "" } else { "s" },
    );
    if s.new_devices > 0 {
        line.push_str(&format!(", {} new device(s)", s.new_devices));
    }
    if !outcome.failures.is_empty() {
        line.push_str(&format!(", {} unreachable", outcome.failures.len()));
    }
    line
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: Session, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = meshwatch_config::load_config_or_default();
    let store: Arc<dyn EventStore> = Arc::new(session.state.open_store(retention(&cfg))?);
    let monitor = Monitor::new(
        session.resolved.monitor.clone(),
        Arc::clone(&session.source),
        store,
    );

    if let Some(baseline) = session.state.load_baseline()? {
        monitor.set_baseline(baseline).await;
    }

    let outcome = monitor.poll_once().await;
    if outcome.snapshots.is_empty() && !outcome.failures.is_empty() {
        return Err(CliError::AllNetworksFailed {
            details: outcome
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.network_name, f.error))
                .collect::<Vec<_>>()
                .join("\n"),
        });
    }

    if let Some(next) = monitor.baseline().await {
        session.state.save_baseline(&next)?;
    }

    if outcome.first_poll {
        output::note(
            "Baseline saved. Run `meshwatch poll` again to detect changes.",
            global.quiet,
        );
    }
    for failure in &outcome.failures {
        output::note(&util::failure_warning(failure), global.quiet);
    }

    let out = output::render_list(
        &global.output,
        &outcome.events,
        |e| EventRow::from(e),
        |e| e.kind().to_string(),
    );
    output::print_output(&out, global.quiet);
    output::note(&summary_line(&outcome), global.quiet);
    Ok(())
}
